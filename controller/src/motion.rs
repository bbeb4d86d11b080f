//! Velocity integration: external forces, gravity, jumping and steering policy.
//!
//! Nothing here clamps velocity; the per-axis cap is applied to the displacement at
//! the end of collision resolution, and the velocity then follows from what actually
//! happened.

use log::{debug, warn};

use crate::collision::Vec3;
use crate::profile::{JumpBehaviour, MovementBehaviour, MovementControl, ParameterProfile};
use crate::state::ControllerState;

/// Owns the controller's velocity and jump cooldown for its whole lifetime.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MotionIntegrator {
    velocity: Vec3,
    jump_cooldown: f32,
}

impl MotionIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Seconds left before another jump is allowed. Zero or negative means ready.
    #[inline]
    pub fn jump_cooldown(&self) -> f32 {
        self.jump_cooldown
    }

    pub fn add_force(&mut self, force: Vec3) {
        if finite(&force, "add_force") {
            self.velocity += force;
        }
    }

    pub fn set_force(&mut self, force: Vec3) {
        if finite(&force, "set_force") {
            self.velocity = force;
        }
    }

    pub fn set_horizontal_force(&mut self, x: f32) {
        if x.is_finite() {
            self.velocity.x = x;
        } else {
            warn!("set_horizontal_force ignored non-finite value {x}");
        }
    }

    pub fn set_vertical_force(&mut self, y: f32) {
        if y.is_finite() {
            self.velocity.y = y;
        } else {
            warn!("set_vertical_force ignored non-finite value {y}");
        }
    }

    /// Apply an impulse scaled by the profile's mass.
    pub fn add_impulse(&mut self, impulse: Vec3, profile: &ParameterProfile) {
        if finite(&impulse, "add_impulse") {
            self.velocity += impulse / profile.base_mass;
        }
    }

    /// Advance one fixed step: count the jump cooldown down and apply gravity.
    pub fn integrate(&mut self, profile: &ParameterProfile, dt: f32) {
        self.jump_cooldown -= dt;
        self.velocity += profile.gravity * dt;
    }

    /// Launch speed that peaks at `jump_peak_height` under the profile's gravity.
    #[inline]
    pub fn jump_speed(profile: &ParameterProfile) -> f32 {
        (2.0 * profile.gravity.y.abs() * profile.jump_peak_height).sqrt()
    }

    /// Whether `jump` would do anything right now. Pure.
    pub fn can_jump(&self, profile: &ParameterProfile, state: &ControllerState) -> bool {
        let ready = self.jump_cooldown <= 0.0;
        match profile.jump_behaviour {
            JumpBehaviour::CanJumpAnywhere => ready,
            JumpBehaviour::CanJumpOnGround => ready && state.is_grounded,
            JumpBehaviour::CantJump => false,
        }
    }

    /// Set the vertical velocity to the jump speed and restart the cooldown.
    ///
    /// A no-op returning `false` when `can_jump` does not hold.
    pub fn jump(&mut self, profile: &ParameterProfile, state: &ControllerState) -> bool {
        if !self.can_jump(profile, state) {
            return false;
        }

        self.velocity.y = Self::jump_speed(profile);
        self.jump_cooldown = profile.jump_cooldown;
        debug!("jump: vy = {:.3}", self.velocity.y);
        true
    }

    /// Whether steering is allowed in the current footing.
    pub fn can_move(&self, profile: &ParameterProfile, state: &ControllerState) -> bool {
        match profile.movement_behaviour {
            MovementBehaviour::CanMoveAnywhere => true,
            MovementBehaviour::CantMoveOnSlide => !state.is_sliding,
            MovementBehaviour::CanMoveOnGround => state.is_grounded,
            MovementBehaviour::CantMove => false,
        }
    }

    /// Accelerate toward `direction * max_speed` on the axes the profile lets the
    /// player drive. `direction` longer than one is capped to unit length.
    pub fn steer(
        &mut self,
        direction: Vec3,
        profile: &ParameterProfile,
        state: &ControllerState,
        dt: f32,
    ) {
        if !finite(&direction, "steer") || dt <= 0.0 || !self.can_move(profile, state) {
            return;
        }

        let acceleration = if state.is_grounded {
            profile.acceleration_on_ground
        } else {
            profile.acceleration_on_air
        };
        let max_step = acceleration * dt;
        let target = direction.cap_magnitude(1.0) * profile.max_speed;

        for axis in steerable_axes(profile) {
            self.velocity[axis] = move_towards(self.velocity[axis], target[axis], max_step);
        }
    }

    /// Zero the out-of-plane component for profiles that keep motion in XY.
    pub(crate) fn clamp_to_plane(&mut self) {
        self.velocity.z = 0.0;
    }

    /// Replace the velocity with what the last tick actually achieved.
    pub(crate) fn set_realized(&mut self, displacement: Vec3, dt: f32) {
        debug_assert!(dt > 0.0);
        self.velocity = displacement / dt;
    }
}

fn steerable_axes(profile: &ParameterProfile) -> impl Iterator<Item = usize> {
    let (x, y, z) = match profile.movement_control {
        MovementControl::Horizontal => (true, false, !profile.z_clamp),
        MovementControl::Vertical => (false, true, false),
        MovementControl::Both => (true, true, !profile.z_clamp),
        MovementControl::None => (false, false, false),
    };
    [x, y, z]
        .into_iter()
        .enumerate()
        .filter_map(|(axis, on)| on.then_some(axis))
}

#[inline]
fn move_towards(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_step {
        target
    } else {
        current + delta.signum() * max_step
    }
}

fn finite(v: &Vec3, op: &str) -> bool {
    let ok = v.iter().all(|c| c.is_finite());
    if !ok {
        warn!("{op} ignored non-finite vector {v:?}");
    }
    ok
}
