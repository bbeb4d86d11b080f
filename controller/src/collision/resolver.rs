use std::f32::consts::{FRAC_PI_2, TAU};

use log::trace;

use super::strategy::{ResolveStrategy, Sequential};
use super::types::{RayHit, RayOrigin, Vec3};
use super::world::CollisionWorld;
use crate::settings::ControllerSettings;
use crate::state::ControllerState;

/// Everything a strategy needs for one tick of ray casting.
pub struct ResolveContext<'a> {
    pub world: &'a dyn CollisionWorld,
    pub settings: &'a ControllerSettings,
    /// Ray origins in fan order, already pulled in by the skin width.
    pub fan: &'a [RayOrigin],
    /// Unit vector opposite gravity. Falls back to +Y when gravity is zero.
    pub up: Vec3,
}

impl ResolveContext<'_> {
    /// Angle between a surface normal and `up`, in degrees.
    #[inline]
    pub fn normal_angle(&self, normal: &Vec3) -> f32 {
        angle_deg(normal, &self.up)
    }

    /// Whether a displacement points within the slope limit of straight down.
    #[inline]
    pub fn moves_along_gravity(&self, displacement: &Vec3) -> bool {
        angle_deg(displacement, &-self.up) < self.settings.slope_limit
    }

    /// Record a hit in the snapshot and report whether it counts as ground.
    ///
    /// Flags only ever get set here, so classifications from earlier rays in the same
    /// tick survive later ones.
    pub fn classify(&self, hit: &RayHit, state: &mut ControllerState) -> bool {
        let normal_angle = self.normal_angle(&hit.normal);
        state.has_collisions = true;
        state.slope_angle = normal_angle;

        if normal_angle < self.settings.slope_limit {
            state.is_grounded = true;
            state.grounded_object = Some(hit.collider);
            state.ground_angle = state.ground_angle.max(normal_angle);
            true
        } else {
            state.is_sliding = true;
            false
        }
    }
}

/// Casts the ray fan and bends the requested displacement around what it hits.
#[derive(Debug)]
pub struct CollisionResolver {
    settings: ControllerSettings,
    strategy: Box<dyn ResolveStrategy>,
}

impl CollisionResolver {
    pub fn new(settings: ControllerSettings) -> Self {
        Self::with_strategy(settings, Box::new(Sequential))
    }

    pub fn with_strategy(settings: ControllerSettings, strategy: Box<dyn ResolveStrategy>) -> Self {
        Self { settings, strategy }
    }

    #[inline]
    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    #[inline]
    pub fn strategy(&self) -> &dyn ResolveStrategy {
        self.strategy.as_ref()
    }

    /// Resolve `displacement` for an entity centered at `center`.
    ///
    /// `state` must already be reset; it is populated from the hits. Returns every ray
    /// hit in fan order, duplicates included.
    pub fn resolve(
        &self,
        world: &dyn CollisionWorld,
        center: Vec3,
        gravity: Vec3,
        displacement: &mut Vec3,
        state: &mut ControllerState,
    ) -> Vec<RayHit> {
        let mut hits = Vec::new();
        if !self.settings.collisions_enabled {
            return hits;
        }

        let fan = ray_fan(
            center,
            self.settings.radius,
            self.settings.skin_width,
            self.settings.ray_count,
        );
        let up = gravity
            .try_normalize(f32::EPSILON)
            .map(|g| -g)
            .unwrap_or_else(Vec3::y);
        let ctx = ResolveContext {
            world,
            settings: &self.settings,
            fan: &fan,
            up,
        };

        self.strategy.resolve(&ctx, displacement, state, &mut hits);
        trace!(
            "resolved displacement {:?} with {} hits",
            displacement,
            hits.len()
        );
        hits
    }
}

/// Ray origins evenly spaced around the entity's cross-section in the XY plane.
///
/// Ray 0 sits at the bottom of the circle; the rest follow counter-clockwise. Each
/// origin is `skin` inside the true radius.
pub fn ray_fan(center: Vec3, radius: f32, skin: f32, count: u32) -> Vec<RayOrigin> {
    let inner = (radius - skin).max(0.0);
    (0..count)
        .map(|index| {
            let theta = -FRAC_PI_2 + TAU * index as f32 / count as f32;
            RayOrigin {
                index,
                origin: center + Vec3::new(theta.cos(), theta.sin(), 0.0) * inner,
            }
        })
        .collect()
}

/// Clamp each axis of `displacement` to `max_velocity * dt`.
///
/// A zero or negative `dt` clamps everything to zero.
pub fn clamp_displacement(displacement: Vec3, max_velocity: Vec3, dt: f32) -> Vec3 {
    let dt = dt.max(0.0);
    displacement.zip_map(&max_velocity, |d, max| {
        let limit = (max * dt).abs();
        d.clamp(-limit, limit)
    })
}

#[inline]
fn angle_deg(a: &Vec3, b: &Vec3) -> f32 {
    let denom = a.norm() * b.norm();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}
