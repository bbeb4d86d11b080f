/*!
Collision root module.

Everything the controller needs to ask "what is in the way" and bend a requested
displacement around the answer:

- types:         shared data types (ColliderId, RayHit, RayOrigin, Vec3)
- world:         the `CollisionWorld` query seam
- rapier_world:  `CollisionWorld` backed by a rapier3d query pipeline
- resolver:      ray fan construction and the per-tick resolve entry point
- strategy:      how hits combine into the corrected displacement
*/

pub mod rapier_world;
pub mod resolver;
pub mod strategy;
pub mod types;
pub mod world;

// Re-export commonly used types and functions.
pub use rapier_world::{ColliderShapeDef, RapierQueryWorld, WorldStaticDef};
pub use resolver::{CollisionResolver, ResolveContext, clamp_displacement, ray_fan};
pub use strategy::{ResolveStrategy, Sequential, Simultaneous};
pub use types::{ColliderId, Quat, RayHit, RayOrigin, Vec3};
pub use world::CollisionWorld;
