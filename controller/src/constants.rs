/*!
Controller defaults and tolerances.

These constants centralize the parameters used by the ray fan, slope
classification and the fixed-step tick. Keeping them together makes tuning
easier and keeps every controller built from defaults identical.

Notes
- Distances are in meters, time in seconds, angles in degrees.
- Favor practical world-space tolerances over machine epsilon.
- Per-entity values live in `ControllerSettings`; these are only its defaults.
*/

/// Inward offset of every ray origin from the entity's true radius (meters).
/// Too large creates visible gaps; too small lets rays start inside the surface
/// the entity is resting on.
pub const DEFAULT_SKIN_WIDTH: f32 = 0.02;

/// Number of rays cast around the entity's cross-section each tick.
pub const DEFAULT_RAY_COUNT: u32 = 8;

/// Radius of the entity's circular cross-section (meters).
pub const DEFAULT_RADIUS: f32 = 0.5;

/// Maximum angle between a contact normal and "up" for the contact to count as ground.
pub const DEFAULT_SLOPE_LIMIT_DEG: f32 = 45.0;

/// Extra margin on top of the skin width below which a ray is too short to cast.
pub const MIN_CAST_EPS: f32 = 1.0e-4;

/// Slope angles at or below this are treated as flat ground (degrees).
pub const FLAT_SLOPE_EPS_DEG: f32 = 0.5;

/// Practical small distance for comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-6;

/// Default gravity acceleration (m/s^2), pointing down the Y axis.
pub const DEFAULT_GRAVITY_Y: f32 = -25.0;

/// Default per-axis velocity cap (m/s).
pub const DEFAULT_MAX_VELOCITY: f32 = 100.0;

/// Iteration cap for the simultaneous resolution strategy.
pub const DEFAULT_RESOLVE_ITERATIONS: u32 = 4;
