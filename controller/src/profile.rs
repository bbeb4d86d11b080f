//! Parameter profiles: named, immutable bundles of movement and jump policy.
//!
//! A controller always has exactly one *active* profile: the explicit override when one
//! is set, the default otherwise. Profiles are shared behind `Arc` and never mutated in
//! place; callers that want a variant clone one and edit the copy.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::collision::Vec3;
use crate::constants::{DEFAULT_GRAVITY_Y, DEFAULT_MAX_VELOCITY};
use crate::error::ControllerError;

/// Which axes player steering may drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementControl {
    Horizontal,
    Vertical,
    Both,
    None,
}

/// In which footing states steering is allowed at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementBehaviour {
    CanMoveAnywhere,
    CantMoveOnSlide,
    CanMoveOnGround,
    CantMove,
}

/// In which footing states a jump is allowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpBehaviour {
    CanJumpAnywhere,
    CanJumpOnGround,
    CantJump,
}

/// Movement and jump policy for a controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterProfile {
    pub name: String,
    pub movement_control: MovementControl,
    pub movement_behaviour: MovementBehaviour,
    pub jump_behaviour: JumpBehaviour,
    /// Target steering speed (m/s).
    pub max_speed: f32,
    /// Steering acceleration while grounded (m/s^2). `f32::MAX` means instant.
    pub acceleration_on_ground: f32,
    /// Steering acceleration while airborne (m/s^2). Zero disables air control.
    pub acceleration_on_air: f32,
    /// Minimum time between two jumps (seconds).
    pub jump_cooldown: f32,
    /// Height a jump reaches under this profile's gravity (meters).
    pub jump_peak_height: f32,
    /// Mass used to turn impulses into velocity changes (kg).
    pub base_mass: f32,
    /// Gravity acceleration (m/s^2).
    pub gravity: Vec3,
    /// Per-axis cap on the realized displacement, expressed as a speed (m/s).
    pub max_velocity: Vec3,
    /// Keep motion in the XY plane.
    pub z_clamp: bool,
}

impl Default for ParameterProfile {
    fn default() -> Self {
        Self {
            name: "default".into(),
            movement_control: MovementControl::Horizontal,
            movement_behaviour: MovementBehaviour::CanMoveAnywhere,
            jump_behaviour: JumpBehaviour::CanJumpOnGround,
            max_speed: 8.0,
            acceleration_on_ground: 60.0,
            acceleration_on_air: 20.0,
            jump_cooldown: 0.25,
            jump_peak_height: 2.0,
            base_mass: 1.0,
            gravity: Vec3::new(0.0, DEFAULT_GRAVITY_Y, 0.0),
            max_velocity: Vec3::repeat(DEFAULT_MAX_VELOCITY),
            z_clamp: true,
        }
    }
}

impl ParameterProfile {
    /// Copy this profile under a new name, ready to be edited.
    pub fn cloned_as(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ControllerError> {
        let fail = |reason| ControllerError::InvalidProfile {
            profile: self.name.clone(),
            reason,
        };

        if !(self.base_mass.is_finite() && self.base_mass > 0.0) {
            return Err(fail("base mass must be positive"));
        }
        if !(self.jump_peak_height.is_finite() && self.jump_peak_height >= 0.0) {
            return Err(fail("jump peak height must be non-negative"));
        }
        if self.jump_cooldown.is_nan() || self.max_speed.is_nan() {
            return Err(fail("jump cooldown and max speed must be numbers"));
        }
        if self.acceleration_on_ground.is_nan()
            || self.acceleration_on_air.is_nan()
            || self.acceleration_on_ground < 0.0
            || self.acceleration_on_air < 0.0
        {
            return Err(fail("accelerations must be non-negative"));
        }
        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(fail("gravity must be finite"));
        }
        if self.max_velocity.iter().any(|v| v.is_nan() || *v < 0.0) {
            return Err(fail("max velocity must be non-negative on every axis"));
        }
        Ok(())
    }
}

/// Canonical profiles swapped in for special actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Frozen in place while the entity changes size.
    Growing,
    /// Rooted while shooting; ground acceleration is unbounded so steering stops instantly.
    Shooting,
    /// Launched through the air with no air control.
    Flying,
    /// Full directional control and no jumping.
    Floating,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Growing,
        Preset::Shooting,
        Preset::Flying,
        Preset::Floating,
    ];

    /// Build this preset on top of `base`, which supplies everything the preset
    /// does not pin down.
    pub fn apply(self, base: &ParameterProfile) -> ParameterProfile {
        match self {
            Preset::Growing => ParameterProfile {
                movement_behaviour: MovementBehaviour::CantMove,
                jump_behaviour: JumpBehaviour::CantJump,
                ..base.cloned_as("growing")
            },
            Preset::Shooting => ParameterProfile {
                movement_behaviour: MovementBehaviour::CantMove,
                jump_behaviour: JumpBehaviour::CantJump,
                acceleration_on_ground: f32::MAX,
                ..base.cloned_as("shooting")
            },
            Preset::Flying => ParameterProfile {
                movement_behaviour: MovementBehaviour::CantMove,
                jump_behaviour: JumpBehaviour::CantJump,
                acceleration_on_air: 0.0,
                ..base.cloned_as("flying")
            },
            Preset::Floating => ParameterProfile {
                movement_control: MovementControl::Both,
                movement_behaviour: MovementBehaviour::CanMoveAnywhere,
                jump_behaviour: JumpBehaviour::CantJump,
                ..base.cloned_as("floating")
            },
        }
    }

    /// The preset built on the default profile.
    pub fn profile(self) -> ParameterProfile {
        self.apply(&ParameterProfile::default())
    }
}

/// Holds the default profile and an optional override.
///
/// `active()` is pure: the override if present, the default otherwise. Clearing the
/// override restores the exact default `Arc`, never a field-wise merge.
#[derive(Clone, Debug)]
pub struct ProfileSlot {
    default: Arc<ParameterProfile>,
    override_profile: Option<Arc<ParameterProfile>>,
}

impl ProfileSlot {
    pub fn new(default: Arc<ParameterProfile>) -> Self {
        Self {
            default,
            override_profile: None,
        }
    }

    #[inline]
    pub fn active(&self) -> &Arc<ParameterProfile> {
        self.override_profile.as_ref().unwrap_or(&self.default)
    }

    #[inline]
    pub fn default_profile(&self) -> &Arc<ParameterProfile> {
        &self.default
    }

    #[inline]
    pub fn override_profile(&self) -> Option<&Arc<ParameterProfile>> {
        self.override_profile.as_ref()
    }

    /// Replace the override, returning the previous one.
    pub fn set_override(
        &mut self,
        profile: Option<Arc<ParameterProfile>>,
    ) -> Option<Arc<ParameterProfile>> {
        std::mem::replace(&mut self.override_profile, profile)
    }
}
