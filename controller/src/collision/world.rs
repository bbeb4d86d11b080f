use super::types::{ColliderId, RayHit, Vec3};
use crate::layers::LayerMask;

/// Read-only spatial index the controller casts rays against.
///
/// The controller never mutates the world and treats it as opaque. Implementations
/// must be deterministic for identical inputs; the tick relies on that to be
/// reproducible.
pub trait CollisionWorld {
    /// Cast a ray from `origin` along the unit vector `direction`, up to `max_distance`.
    ///
    /// Only colliders on at least one layer of `layers` may be reported. Returns the
    /// closest hit, if any.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit>;

    /// Linear velocity of a collider, used as the platform velocity when the entity
    /// stands on it. Static worlds report zero.
    fn collider_velocity(&self, _collider: ColliderId) -> Vec3 {
        Vec3::zeros()
    }
}

impl<W: CollisionWorld + ?Sized> CollisionWorld for &W {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit> {
        (**self).cast_ray(origin, direction, max_distance, layers)
    }

    fn collider_velocity(&self, collider: ColliderId) -> Vec3 {
        (**self).collider_velocity(collider)
    }
}
