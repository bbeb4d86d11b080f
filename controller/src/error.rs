use thiserror::Error;

/// Reasons a controller refuses to start.
///
/// These are only produced while validating configuration. A running tick never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("ray count must be at least 1")]
    NoRays,

    #[error("skin width {skin} must be finite and within [0, radius {radius})")]
    InvalidSkinWidth { skin: f32, radius: f32 },

    #[error("slope limit must be within (0, 180) degrees, got {0}")]
    InvalidSlopeLimit(f32),

    #[error("parameter profile `{profile}`: {reason}")]
    InvalidProfile {
        profile: String,
        reason: &'static str,
    },
}
