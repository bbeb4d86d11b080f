use std::cell::Cell;

use controller::{CollisionEvent, Controller, ControllerListener, RayHit};
use log::{debug, info};

/// Logs controller callbacks and keeps running totals for the summary.
#[derive(Debug, Default)]
pub struct EventLog {
    pub jumps: Cell<u32>,
    pub enters: Cell<u32>,
    pub stays: Cell<u32>,
    pub exits: Cell<u32>,
    pub pre_collisions: Cell<u32>,
}

fn bump(counter: &Cell<u32>) {
    counter.set(counter.get() + 1);
}

impl ControllerListener for EventLog {
    fn on_jump(&self, controller: &Controller) {
        bump(&self.jumps);
        info!("jump from {:?}", controller.position());
    }

    fn on_pre_collision(&self, _controller: &Controller, _hit: &RayHit) {
        bump(&self.pre_collisions);
    }

    fn on_collision(&self, controller: &Controller, event: &CollisionEvent) {
        match event {
            CollisionEvent::Enter(hit) => {
                bump(&self.enters);
                info!(
                    "enter {:?} at {:?} (slope {:.1})",
                    hit.collider,
                    hit.point,
                    controller.state().slope_angle
                );
            }
            CollisionEvent::Stay(hit) => {
                bump(&self.stays);
                debug!("stay {:?}", hit.collider);
            }
            CollisionEvent::Exit(hit) => {
                bump(&self.exits);
                info!("exit {:?}", hit.collider);
            }
        }
    }
}
