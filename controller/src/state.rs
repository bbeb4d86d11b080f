use crate::collision::{ColliderId, Vec3};

/// Snapshot of the controller's footing, rebuilt from scratch every tick.
///
/// The flags are independent bits, not a single state: a tick whose rays hit both a
/// floor and a steep wall ends both grounded and sliding.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControllerState {
    /// At least one ray hit something this tick.
    pub has_collisions: bool,
    /// At least one contact was within the slope limit.
    pub is_grounded: bool,
    /// Airborne and moving along gravity.
    pub is_falling: bool,
    /// Airborne, not sliding, and moving against gravity.
    pub is_flying: bool,
    /// Collider the entity stands on. Weak: only an id, never the collider itself.
    pub grounded_object: Option<ColliderId>,
    /// Velocity of the grounded collider as reported by the world.
    pub platform_velocity: Vec3,
    /// Grounded on a surface that is not flat.
    pub is_on_slope: bool,
    /// At least one contact exceeded the slope limit.
    pub is_sliding: bool,
    /// Angle between the last contact normal and "up" (degrees).
    pub slope_angle: f32,
    /// Steepest contact within the slope limit this tick (degrees).
    pub ground_angle: f32,
}

impl ControllerState {
    /// Reset every field to its zero value.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Neither grounded nor sliding.
    #[inline]
    pub fn is_airborne(&self) -> bool {
        !self.is_grounded && !self.is_sliding
    }
}
