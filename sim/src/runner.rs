use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use controller::{Controller, ControllerState, Preset, RapierQueryWorld, Vec3};
use log::{info, trace, warn};

use crate::observer::EventLog;
use crate::scene::{Action, Scene};

/// Outcome of a finished run.
#[derive(Debug)]
pub struct Summary {
    pub ticks: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub state: ControllerState,
    pub jumps: u32,
    pub enters: u32,
    pub stays: u32,
    pub exits: u32,
    pub ray_hits: u32,
}

/// Build the scene and tick the controller `ticks` times at a fixed `dt`.
pub fn run(scene: &Scene, ticks: u32, dt: f32) -> Result<Summary> {
    let world = RapierQueryWorld::build(scene.world_defs()?);
    let settings = scene.controller.resolved_settings()?;
    let mut controller = Controller::try_new(settings, Arc::new(scene.profile.clone()))?
        .with_strategy(scene.controller.strategy())
        .with_position(Vec3::from(scene.spawn));

    let log = Rc::new(EventLog::default());
    controller.add_listener(log.clone());

    for tick in 0..ticks {
        for action in scene.actions_at(tick) {
            apply(&mut controller, action, dt)?;
        }
        controller.tick(&world, dt);
        trace!(
            "tick {tick}: pos {:?} vel {:?}",
            controller.position(),
            controller.velocity()
        );
    }

    let summary = Summary {
        ticks,
        position: controller.position(),
        velocity: controller.velocity(),
        state: *controller.state(),
        jumps: log.jumps.get(),
        enters: log.enters.get(),
        stays: log.stays.get(),
        exits: log.exits.get(),
        ray_hits: log.pre_collisions.get(),
    };
    info!(
        "finished {} ticks at {:?}, grounded = {}",
        summary.ticks, summary.position, summary.state.is_grounded
    );
    Ok(summary)
}

fn apply(controller: &mut Controller, action: &Action, dt: f32) -> Result<()> {
    match action {
        Action::Jump => {
            if !controller.jump() {
                warn!("jump refused");
            }
        }
        Action::Steer { direction } => controller.steer(Vec3::from(*direction), dt),
        Action::Impulse { impulse } => controller.add_impulse(Vec3::from(*impulse)),
        Action::SetForce { force } => controller.set_force(Vec3::from(*force)),
        Action::Preset { preset } => {
            let profile = preset.apply(controller.default_parameters());
            controller.set_parameter_override(Some(Arc::new(profile)))?;
            info!("override -> {:?}", preset);
        }
        Action::ClearOverride => controller.set_parameter_override(None)?,
    }
    Ok(())
}

/// Names of every preset, as `--list-presets` prints them.
pub fn preset_names() -> Vec<String> {
    Preset::ALL.iter().map(|p| format!("{p:?}").to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FLOOR: &str = r#"
        spawn = [0.0, 3.0, 0.0]

        [[statics]]
        id = 1
        translation = [0.0, -0.5, 0.0]
        shape = { type = "cuboid", half_extents = [50.0, 0.5, 50.0] }
        layers = ["ground"]
    "#;

    #[test]
    fn falls_and_lands_on_the_floor() {
        let scene = Scene::parse(FLOOR).unwrap();

        let summary = run(&scene, 120, 1.0 / 60.0).unwrap();

        assert!(summary.state.is_grounded);
        assert_relative_eq!(summary.position.y, 0.5, epsilon = 1.0e-3);
        assert_eq!(summary.enters, 1);
        assert_eq!(summary.exits, 0);
        assert!(summary.stays > 0);
        assert!(summary.ray_hits >= summary.stays);
    }

    #[test]
    fn scheduled_jump_leaves_and_returns_to_the_floor() {
        let toml = format!(
            "{FLOOR}\n[[actions]]\ntick = 90\naction = \"jump\"\n"
        );
        let scene = Scene::parse(&toml).unwrap();

        let summary = run(&scene, 240, 1.0 / 60.0).unwrap();

        assert_eq!(summary.jumps, 1);
        assert_eq!(summary.exits, 1);
        assert_eq!(summary.enters, 2);
        assert!(summary.state.is_grounded);
    }

    #[test]
    fn layers_outside_the_mask_are_ignored() {
        let toml = FLOOR.replace(
            "spawn = [0.0, 3.0, 0.0]",
            "spawn = [0.0, 3.0, 0.0]\n[controller]\ncollide_with = [\"platform\"]",
        );
        let scene = Scene::parse(&toml).unwrap();

        let summary = run(&scene, 60, 1.0 / 60.0).unwrap();

        assert!(!summary.state.is_grounded);
        assert!(summary.position.y < 0.0);
    }

    #[test]
    fn preset_names_are_lowercase() {
        assert_eq!(
            preset_names(),
            vec!["growing", "shooting", "flying", "floating"]
        );
    }
}
