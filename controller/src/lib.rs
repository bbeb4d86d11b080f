pub mod collision;
pub mod constants;
pub mod controller;
pub mod error;
pub mod events;
pub mod layers;
pub mod motion;
pub mod profile;
pub mod settings;
pub mod state;

#[cfg(test)]
mod test_support;

pub use collision::{
    ColliderId, ColliderShapeDef, CollisionResolver, CollisionWorld, RapierQueryWorld, RayHit,
    ResolveStrategy, Sequential, Simultaneous, Vec3, WorldStaticDef,
};
pub use constants::{
    DEFAULT_RADIUS, DEFAULT_RAY_COUNT, DEFAULT_SKIN_WIDTH, DEFAULT_SLOPE_LIMIT_DEG,
};
pub use controller::{Controller, OverrideScope};
pub use error::ControllerError;
pub use events::{CollisionEvent, CollisionEventDispatcher, ContactSet, ControllerListener};
pub use layers::{BitmaskFlags, FlagBitmask, LayerBits, LayerMask};
pub use motion::MotionIntegrator;
pub use profile::{
    JumpBehaviour, MovementBehaviour, MovementControl, ParameterProfile, Preset, ProfileSlot,
};
pub use settings::ControllerSettings;
pub use state::ControllerState;
