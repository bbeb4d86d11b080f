/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms. It defines the data exchanged
between the collision world (ray queries), the resolver, the event dispatcher and
the controller facade.
*/

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// Opaque identifier of a collider in the collision world.
///
/// This is a weak reference: holding an id never keeps the collider alive, and the
/// world may have removed it by the time anyone looks it up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(pub u64);

/// A single ray hit reported by a [`CollisionWorld`](super::CollisionWorld).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Collider that was hit.
    pub collider: ColliderId,
    /// World-space impact point.
    pub point: Vec3,
    /// World-space unit surface normal at the impact point.
    pub normal: Vec3,
    /// Distance from the ray origin to `point` (meters).
    pub distance: f32,
}

/// One ray of the radial fan cast around the entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayOrigin {
    /// Position in the fan, `0..ray_count`.
    pub index: u32,
    /// World-space origin, already pulled inward by the skin width.
    pub origin: Vec3,
}
