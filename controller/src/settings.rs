//! Per-entity collision configuration, resolved once at setup.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_RADIUS, DEFAULT_RAY_COUNT, DEFAULT_SKIN_WIDTH, DEFAULT_SLOPE_LIMIT_DEG,
};
use crate::error::ControllerError;
use crate::layers::LayerMask;

/// Collision configuration for one controller.
///
/// Loaded from configuration (every field defaults) and frozen when the controller is
/// built; the tick never re-reads it by name.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Radius of the entity's circular cross-section (meters).
    pub radius: f32,
    /// Number of rays cast around the cross-section.
    pub ray_count: u32,
    /// Inward offset of every ray origin (meters).
    pub skin_width: f32,
    /// Max angle between a contact normal and "up" that still counts as ground (degrees).
    pub slope_limit: f32,
    /// Layers the rays collide with.
    pub layers: LayerMask,
    /// When false the resolver is skipped and only the velocity clamp applies.
    pub collisions_enabled: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            ray_count: DEFAULT_RAY_COUNT,
            skin_width: DEFAULT_SKIN_WIDTH,
            slope_limit: DEFAULT_SLOPE_LIMIT_DEG,
            layers: LayerMask::all(),
            collisions_enabled: true,
        }
    }
}

impl ControllerSettings {
    pub fn validate(&self) -> Result<(), ControllerError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ControllerError::InvalidRadius(self.radius));
        }
        if self.ray_count == 0 {
            return Err(ControllerError::NoRays);
        }
        if !self.skin_width.is_finite() || self.skin_width < 0.0 || self.skin_width >= self.radius
        {
            return Err(ControllerError::InvalidSkinWidth {
                skin: self.skin_width,
                radius: self.radius,
            });
        }
        if !self.slope_limit.is_finite() || self.slope_limit <= 0.0 || self.slope_limit >= 180.0 {
            return Err(ControllerError::InvalidSlopeLimit(self.slope_limit));
        }
        Ok(())
    }
}
