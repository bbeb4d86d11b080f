//! Analytic collision world for unit tests: a handful of infinite one-sided planes.

use std::cell::Cell;

use crate::collision::{ColliderId, CollisionWorld, RayHit, Vec3};
use crate::layers::LayerMask;

#[derive(Clone, Debug)]
struct Plane {
    id: ColliderId,
    normal: Vec3,
    point: Vec3,
    layers: LayerMask,
    velocity: Vec3,
}

/// Planes only block rays arriving from the side their normal points to.
#[derive(Debug, Default)]
pub struct PlaneWorld {
    planes: Vec<Plane>,
    casts: Cell<usize>,
}

impl PlaneWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Horizontal ground at height `y`.
    pub fn flat_ground(id: ColliderId, y: f32) -> Self {
        Self::new().with_plane(id, Vec3::y(), Vec3::new(0.0, y, 0.0))
    }

    pub fn with_plane(mut self, id: ColliderId, normal: Vec3, point: Vec3) -> Self {
        self.planes.push(Plane {
            id,
            normal: normal.normalize(),
            point,
            layers: LayerMask::all(),
            velocity: Vec3::zeros(),
        });
        self
    }

    /// Put the most recently added plane on `layers` only.
    pub fn on_layers(mut self, layers: LayerMask) -> Self {
        if let Some(plane) = self.planes.last_mut() {
            plane.layers = layers;
        }
        self
    }

    /// Give the most recently added plane a velocity.
    pub fn moving(mut self, velocity: Vec3) -> Self {
        if let Some(plane) = self.planes.last_mut() {
            plane.velocity = velocity;
        }
        self
    }

    /// Remove every plane with this id.
    pub fn remove(&mut self, id: ColliderId) {
        self.planes.retain(|p| p.id != id);
    }

    /// Number of rays cast so far.
    pub fn casts(&self) -> usize {
        self.casts.get()
    }
}

impl CollisionWorld for PlaneWorld {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit> {
        self.casts.set(self.casts.get() + 1);

        self.planes
            .iter()
            .filter(|p| p.layers.intersects(layers))
            .filter_map(|p| {
                let facing = p.normal.dot(&direction);
                let height = p.normal.dot(&(origin - p.point));
                if facing >= 0.0 || height < 0.0 {
                    return None;
                }
                let distance = height / -facing;
                (distance <= max_distance).then(|| RayHit {
                    collider: p.id,
                    point: origin + direction * distance,
                    normal: p.normal,
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn collider_velocity(&self, collider: ColliderId) -> Vec3 {
        self.planes
            .iter()
            .find(|p| p.id == collider)
            .map(|p| p.velocity)
            .unwrap_or_else(Vec3::zeros)
    }
}
