//! How ray hits are turned into a corrected displacement.
//!
//! Both strategies classify every hit the same way; they differ only in how clamps and
//! slides combine when several rays hit in one tick.

use std::fmt;

use log::trace;

use super::resolver::ResolveContext;
use super::types::{RayHit, Vec3};
use crate::constants::{DEFAULT_RESOLVE_ITERATIONS, DIST_EPS, MIN_CAST_EPS};
use crate::state::ControllerState;

/// Turns the ray fan's hits into a corrected displacement.
///
/// Implementations push every hit they observe into `hits`, in the order the rays
/// were cast, and populate `state` through [`ResolveContext::classify`].
pub trait ResolveStrategy: fmt::Debug {
    fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
        displacement: &mut Vec3,
        state: &mut ControllerState,
        hits: &mut Vec<RayHit>,
    );
}

/// Rays processed in fan order, each one casting along the displacement as left by
/// the rays before it.
///
/// Results depend on ray order and ray count. This is the default.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequential;

impl ResolveStrategy for Sequential {
    fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
        displacement: &mut Vec3,
        state: &mut ControllerState,
        hits: &mut Vec<RayHit>,
    ) {
        let skin = ctx.settings.skin_width;

        for ray in ctx.fan {
            let len = displacement.norm();
            let cast_distance = len + skin;
            if cast_distance < skin + MIN_CAST_EPS {
                trace!("ray {}: displacement exhausted, stopping", ray.index);
                break;
            }

            let dir = *displacement / len;
            let Some(hit) = ctx
                .world
                .cast_ray(ray.origin, dir, cast_distance, ctx.settings.layers)
            else {
                continue;
            };
            trace!(
                "ray {} hit {:?} at {:.4}",
                ray.index, hit.collider, hit.distance
            );
            hits.push(hit);

            let grounded = ctx.classify(&hit, state);
            if grounded && ctx.moves_along_gravity(displacement) {
                let allowed = ((hit.point - ray.origin).dot(&dir) - skin).max(0.0);
                if allowed < len {
                    *displacement = dir * allowed;
                }
            } else {
                *displacement += hit.normal * (-*displacement).dot(&hit.normal);
            }
        }
    }
}

/// Every ray casts along the same requested displacement; the results are combined
/// afterwards, so the outcome does not depend on the order rays are processed in.
///
/// Ground contacts clamp to the nearest one. Slide contacts are resolved by
/// repeatedly removing the component of the displacement that points into each
/// surface, for at most `iterations` sweeps.
#[derive(Clone, Copy, Debug)]
pub struct Simultaneous {
    pub iterations: u32,
}

impl Default for Simultaneous {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_RESOLVE_ITERATIONS,
        }
    }
}

impl ResolveStrategy for Simultaneous {
    fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
        displacement: &mut Vec3,
        state: &mut ControllerState,
        hits: &mut Vec<RayHit>,
    ) {
        let skin = ctx.settings.skin_width;
        let requested = *displacement;
        let len = requested.norm();
        if len < MIN_CAST_EPS {
            return;
        }

        let dir = requested / len;
        let cast_distance = len + skin;
        let clamps = ctx.moves_along_gravity(&requested);

        let mut allowed = len;
        let mut slide_normals: Vec<Vec3> = Vec::new();

        for ray in ctx.fan {
            let Some(hit) = ctx
                .world
                .cast_ray(ray.origin, dir, cast_distance, ctx.settings.layers)
            else {
                continue;
            };
            hits.push(hit);

            if ctx.classify(&hit, state) && clamps {
                allowed = allowed.min(((hit.point - ray.origin).dot(&dir) - skin).max(0.0));
            } else {
                slide_normals.push(hit.normal);
            }
        }

        let mut resolved = dir * allowed;
        for _ in 0..self.iterations {
            let mut changed = false;
            for n in &slide_normals {
                let into = resolved.dot(n);
                if into < -DIST_EPS {
                    resolved -= n * into;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        *displacement = resolved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::resolver::{CollisionResolver, ray_fan};
    use crate::collision::{ColliderId, CollisionWorld};
    use crate::settings::ControllerSettings;
    use crate::test_support::PlaneWorld;
    use approx::assert_relative_eq;

    fn settings(ray_count: u32) -> ControllerSettings {
        ControllerSettings {
            radius: 0.5,
            skin_width: 0.02,
            slope_limit: 45.0,
            ray_count,
            ..ControllerSettings::default()
        }
    }

    fn run(
        strategy: &dyn ResolveStrategy,
        world: &dyn CollisionWorld,
        settings: &ControllerSettings,
        center: Vec3,
        requested: Vec3,
    ) -> (Vec3, ControllerState) {
        let fan = ray_fan(center, settings.radius, settings.skin_width, settings.ray_count);
        let ctx = ResolveContext {
            world,
            settings,
            fan: &fan,
            up: Vec3::y(),
        };
        let mut displacement = requested;
        let mut state = ControllerState::default();
        let mut hits = Vec::new();
        strategy.resolve(&ctx, &mut displacement, &mut state, &mut hits);
        (displacement, state)
    }

    #[test]
    fn simultaneous_clamps_to_the_nearest_ground_hit() {
        let world = PlaneWorld::flat_ground(ColliderId(1), 0.0);
        let settings = settings(8);

        let (displacement, state) = run(
            &Simultaneous::default(),
            &world,
            &settings,
            Vec3::new(0.0, 0.96, 0.0),
            Vec3::new(0.0, -2.0, 0.0),
        );

        assert_relative_eq!(displacement.y, -0.46, epsilon = 1.0e-5);
        assert!(state.is_grounded);
    }

    #[test]
    fn simultaneous_only_removes_motion_into_walls() {
        let world = PlaneWorld::new().with_plane(
            ColliderId(2),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.6, 0.0, 0.0),
        );
        let settings = settings(8);

        let (displacement, state) = run(
            &Simultaneous::default(),
            &world,
            &settings,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.5, 0.3, 0.0),
        );

        assert!(state.is_sliding);
        assert_relative_eq!(displacement, Vec3::new(0.0, 0.3, 0.0), epsilon = 1.0e-5);
    }

    #[test]
    fn simultaneous_ignores_ray_order() {
        let world = PlaneWorld::flat_ground(ColliderId(1), 0.0).with_plane(
            ColliderId(2),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.6, 0.0, 0.0),
        );
        let settings = settings(8);
        let center = Vec3::new(0.0, 1.0, 0.0);
        let requested = Vec3::new(0.3, -0.8, 0.0);

        let fan = ray_fan(center, settings.radius, settings.skin_width, settings.ray_count);
        let mut reversed = fan.clone();
        reversed.reverse();

        let resolve_with = |fan: &[crate::collision::RayOrigin]| {
            let ctx = ResolveContext {
                world: &world,
                settings: &settings,
                fan,
                up: Vec3::y(),
            };
            let mut displacement = requested;
            let mut state = ControllerState::default();
            Simultaneous::default().resolve(&ctx, &mut displacement, &mut state, &mut Vec::new());
            (displacement, state.is_grounded, state.is_sliding)
        };

        let (forward, fg, fs) = resolve_with(&fan);
        let (backward, bg, bs) = resolve_with(&reversed);
        assert_relative_eq!(forward, backward, epsilon = 1.0e-6);
        assert_eq!((fg, fs), (bg, bs));
    }

    #[test]
    fn resolver_uses_the_configured_strategy() {
        let world = PlaneWorld::flat_ground(ColliderId(1), 0.0);
        let resolver =
            CollisionResolver::with_strategy(settings(1), Box::new(Simultaneous { iterations: 2 }));
        let mut displacement = Vec3::new(0.0, -0.61, 0.0);
        let mut state = ControllerState::default();

        resolver.resolve(
            &world,
            Vec3::new(0.0, 0.96, 0.0),
            Vec3::new(0.0, -25.0, 0.0),
            &mut displacement,
            &mut state,
        );

        assert_relative_eq!(displacement.y, -0.46, epsilon = 1.0e-5);
        assert!(format!("{:?}", resolver.strategy()).contains("Simultaneous"));
    }
}
