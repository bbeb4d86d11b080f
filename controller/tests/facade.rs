use std::sync::Arc;

use approx::assert_relative_eq;
use controller::collision::{ColliderShapeDef, RapierQueryWorld, WorldStaticDef};
use controller::{
    ColliderId, CollisionWorld, Controller, ControllerSettings, LayerMask, ParameterProfile,
    Preset, RayHit, Sequential, Simultaneous, Vec3,
};

/// Horizontal floor at y = 0 that only answers downward rays.
struct Floor {
    id: ColliderId,
}

impl CollisionWorld for Floor {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        _layers: LayerMask,
    ) -> Option<RayHit> {
        if direction.y >= 0.0 || origin.y < 0.0 {
            return None;
        }
        let distance = origin.y / -direction.y;
        (distance <= max_distance).then(|| RayHit {
            collider: self.id,
            point: origin + direction * distance,
            normal: Vec3::y(),
            distance,
        })
    }
}

fn one_ray() -> ControllerSettings {
    ControllerSettings {
        radius: 0.5,
        skin_width: 0.02,
        slope_limit: 45.0,
        ray_count: 1,
        ..ControllerSettings::default()
    }
}

fn landed(profile: ParameterProfile, world: &dyn CollisionWorld) -> Controller {
    let mut controller = Controller::try_new(one_ray(), Arc::new(profile))
        .unwrap()
        .with_position(Vec3::new(0.0, 0.96, 0.0));
    controller.set_vertical_force(-30.0);
    controller.tick(world, 0.02);
    controller
}

#[test]
fn ground_hit_at_0_48_clamps_to_0_46() {
    let world = Floor { id: ColliderId(42) };

    let controller = landed(ParameterProfile::default(), &world);

    assert_relative_eq!(controller.last_displacement().y, -0.46, epsilon = 1.0e-5);
    let state = controller.state();
    assert!(state.is_grounded);
    assert!(!state.is_sliding);
    assert_eq!(state.grounded_object, Some(ColliderId(42)));
}

#[test]
fn jump_reaches_closed_form_speed() {
    let world = Floor { id: ColliderId(1) };
    let profile = ParameterProfile {
        gravity: Vec3::new(0.0, -20.0, 0.0),
        jump_peak_height: 2.0,
        ..ParameterProfile::default()
    };
    let mut controller = landed(profile, &world);

    assert!(controller.can_jump());
    assert!(controller.jump());

    assert_relative_eq!(controller.velocity().y, 80.0_f32.sqrt(), epsilon = 1.0e-4);
    assert!(!controller.can_jump());
}

#[test]
fn scoped_growing_preset_blocks_steering_until_dropped() {
    let world = Floor { id: ColliderId(1) };
    let mut controller = landed(ParameterProfile::default(), &world);
    let growing = Arc::new(Preset::Growing.apply(controller.default_parameters()));

    {
        let mut scope = controller.override_scope(growing).unwrap();
        assert!(!scope.can_move());
        scope.steer(Vec3::x(), 0.02);
        assert_eq!(scope.velocity().x, 0.0);
    }

    assert_eq!(controller.active_parameters().name, "default");
    controller.steer(Vec3::x(), 0.02);
    // Grounded acceleration 60 m/s^2 over one 20 ms step.
    assert_relative_eq!(controller.velocity().x, 1.2, epsilon = 1.0e-5);
}

#[test]
fn strategies_agree_on_a_single_floor_contact() {
    let world = RapierQueryWorld::build(vec![WorldStaticDef::fixed(
        1,
        Vec3::new(0.0, -0.5, 0.0),
        ColliderShapeDef::Cuboid {
            half_extents: Vec3::new(10.0, 0.5, 10.0),
        },
    )]);
    let settings = ControllerSettings {
        ray_count: 8,
        ..one_ray()
    };

    let run = |controller: Controller| {
        let mut controller = controller.with_position(Vec3::new(0.0, 0.96, 0.0));
        controller.set_vertical_force(-30.0);
        controller.tick(&world, 0.02);
        (controller.position(), controller.state().is_grounded)
    };
    let profile = Arc::new(ParameterProfile::default());
    let sequential = run(
        Controller::try_new(settings, profile.clone())
            .unwrap()
            .with_strategy(Box::new(Sequential)),
    );
    let simultaneous = run(
        Controller::try_new(settings, profile)
            .unwrap()
            .with_strategy(Box::new(Simultaneous::default())),
    );

    assert_relative_eq!(sequential.0, simultaneous.0, epsilon = 1.0e-4);
    assert_relative_eq!(sequential.0.y, 0.5, epsilon = 1.0e-4);
    assert!(sequential.1 && simultaneous.1);
}
