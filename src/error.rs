//! Engine error types.

use thiserror::Error;

/// Errors returned when a spawn or configuration is rejected.
///
/// Stepping never fails; only the control surface validates its input.
#[derive(Debug, Error)]
pub enum SimError {
    /// Radius is zero, negative or not finite.
    #[error("invalid radius {0}: must be finite and greater than zero")]
    InvalidRadius(f64),

    /// The disk cannot fit inside the arena.
    #[error("radius {radius} does not fit a {width}x{height} arena")]
    DoesNotFit { radius: f64, width: f64, height: f64 },

    /// An environment value is out of range.
    #[error("invalid environment: {0}")]
    InvalidConfig(String),

    /// Malformed JSON input.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a config file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
