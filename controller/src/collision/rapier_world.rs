//! Rapier-backed collision world for static and kinematic level geometry.
//!
//! Callers map their level data to [`WorldStaticDef`] values and build a
//! [`RapierQueryWorld`] once; controllers then cast rays against it every tick.
//!
//! Design goals
//! - Deterministic: given the same inputs (sorted by `id`), build identical in-memory sets.
//! - Query-focused: only scene queries are needed, no dynamics step.
//! - Layered: every collider carries its layer bits in `user_data`, and ray casts filter
//!   on them with a predicate, so layer masks never need a name lookup.

use log::{debug, warn};
use rapier3d::na::{Translation3, UnitQuaternion};
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use super::types::{ColliderId, RayHit, Vec3};
use super::world::CollisionWorld;
use crate::layers::{LayerBits, LayerMask};

/// Canonical, schema-agnostic definition of a level collider.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    /// World-space translation.
    pub translation: Vector<f32>,
    /// World-space rotation (unit quaternion).
    pub rotation: UnitQuaternion<f32>,
    /// Collider shape parameters.
    pub shape: ColliderShapeDef,
    /// Layers this collider belongs to.
    pub layers: LayerMask,
    /// Linear velocity for moving platforms. Zero means a fixed body.
    pub linear_velocity: Vector<f32>,
}

impl WorldStaticDef {
    /// A fixed collider on every layer.
    pub fn fixed(id: u32, translation: Vector<f32>, shape: ColliderShapeDef) -> Self {
        Self {
            id,
            translation,
            rotation: UnitQuaternion::identity(),
            shape,
            layers: LayerMask::all(),
            linear_velocity: Vector::zeros(),
        }
    }
}

/// Supported collider shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space).
    ///
    /// The plane normal is derived from the pose as `rotation * +Y`, and the plane sits
    /// `offset_along_normal` meters from the pose translation.
    Plane { offset_along_normal: f32 },

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vector<f32> },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },
}

/// In-memory Rapier structures needed for ray casts against level geometry.
///
/// For immutable statics, this is built once at startup and reused for every tick.
pub struct RapierQueryWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
}

impl RapierQueryWorld {
    /// Build a query world from a list of collider definitions.
    ///
    /// Determinism
    /// - The input is sorted by `id` before insertion.
    /// - Any NaN/invalid values should be filtered/validated by the caller.
    pub fn build(mut defs: Vec<WorldStaticDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in defs.into_iter() {
            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);

            let rb = if def.linear_velocity.norm_squared() > 0.0 {
                RigidBodyBuilder::kinematic_velocity_based()
                    .pose(iso)
                    .linvel(def.linear_velocity)
                    .build()
            } else {
                RigidBodyBuilder::fixed().pose(iso).build()
            };
            let rb_handle = bodies.insert(rb);

            let collider = collider_from_def(&def);
            colliders.insert_with_parent(collider, rb_handle, &mut bodies);
        }

        // Run collision detection only (no dynamics) so the broad-phase BVH is
        // populated and queries can run.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();

        let hooks = ();
        let events = ();

        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &hooks,
            &events,
        );

        debug!("built rapier query world with {} colliders", colliders.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        }
    }

    /// Create a borrowed `QueryPipeline` view for scene queries.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    /// Map a controller-facing id back to the rapier handle.
    pub fn handle_of(id: ColliderId) -> ColliderHandle {
        ColliderHandle::from_raw_parts(id.0 as u32, (id.0 >> 32) as u32)
    }

    /// Map a rapier handle to the opaque id handed to controllers.
    pub fn id_of(handle: ColliderHandle) -> ColliderId {
        let (index, generation) = handle.into_raw_parts();
        ColliderId((index as u64) | ((generation as u64) << 32))
    }
}

impl CollisionWorld for RapierQueryWorld {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit> {
        let wanted = layers.bits;
        let on_layer = |_handle: ColliderHandle, collider: &Collider| {
            (collider.user_data as LayerBits) & wanted != 0
        };
        let pipeline = self.query_pipeline(QueryFilter::default().predicate(&on_layer));

        let ray = Ray::new(Point::from(origin), direction);
        let (handle, hit) = pipeline.cast_ray_and_get_normal(&ray, max_distance.max(0.0), true)?;

        // A ray starting inside a solid reports a zero normal; face it back at the caster.
        let normal = if hit.normal.norm_squared() > 1.0e-12 {
            hit.normal.normalize()
        } else {
            warn!("ray started inside collider {:?}", handle);
            -direction
        };

        Some(RayHit {
            collider: Self::id_of(handle),
            point: ray.point_at(hit.time_of_impact).coords,
            normal,
            distance: hit.time_of_impact,
        })
    }

    fn collider_velocity(&self, collider: ColliderId) -> Vec3 {
        self.colliders
            .get(Self::handle_of(collider))
            .and_then(|c| c.parent())
            .and_then(|parent| self.bodies.get(parent))
            .map(|rb| *rb.linvel())
            .unwrap_or_else(Vec3::zeros)
    }
}

/// Build a Rapier collider from a `WorldStaticDef`.
///
/// The pose lives on the parent rigid-body, so the collider is created with an identity
/// local transform (planes excepted, see below).
fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let builder = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // The half-space normal is local +Y, which the parent pose rotates into place.
            // Shift the plane along that normal in local space.
            let halfspace = HalfSpace::new(Vector::y_axis());
            ColliderBuilder::new(SharedShape::new(halfspace))
                .translation(Vector::y() * *offset_along_normal)
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),
    };

    builder.user_data(def.layers.bits as u128).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn floor(id: u32, layers: LayerMask) -> WorldStaticDef {
        WorldStaticDef {
            layers,
            ..WorldStaticDef::fixed(
                id,
                Vector::new(0.0, -0.5, 0.0),
                ColliderShapeDef::Cuboid {
                    half_extents: Vector::new(10.0, 0.5, 10.0),
                },
            )
        }
    }

    #[test]
    fn downward_ray_hits_cuboid_floor() {
        let world = RapierQueryWorld::build(vec![floor(1, LayerMask::all())]);

        let hit = world
            .cast_ray(
                Vec3::new(0.0, 2.0, 0.0),
                Vec3::new(0.0, -1.0, 0.0),
                5.0,
                LayerMask::all(),
            )
            .expect("floor should be hit");

        assert_relative_eq!(hit.distance, 2.0, epsilon = 1.0e-4);
        assert_relative_eq!(hit.point.y, 0.0, epsilon = 1.0e-4);
        assert_relative_eq!(hit.normal.y, 1.0, epsilon = 1.0e-4);
    }

    #[test]
    fn ray_ignores_colliders_outside_the_mask() {
        let world = RapierQueryWorld::build(vec![floor(1, LayerMask::new(0b10))]);

        let miss = world.cast_ray(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            5.0,
            LayerMask::new(0b01),
        );
        assert!(miss.is_none());
    }

    #[test]
    fn ray_shorter_than_the_gap_misses() {
        let world = RapierQueryWorld::build(vec![floor(1, LayerMask::all())]);

        let miss = world.cast_ray(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            1.5,
            LayerMask::all(),
        );
        assert!(miss.is_none());
    }

    #[test]
    fn moving_platform_reports_its_velocity() {
        let platform = WorldStaticDef {
            linear_velocity: Vector::new(2.0, 0.0, 0.0),
            ..floor(7, LayerMask::all())
        };
        let world = RapierQueryWorld::build(vec![platform]);

        let hit = world
            .cast_ray(
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, -1.0, 0.0),
                5.0,
                LayerMask::all(),
            )
            .expect("platform should be hit");

        assert_eq!(world.collider_velocity(hit.collider), Vec3::new(2.0, 0.0, 0.0));
    }
}
