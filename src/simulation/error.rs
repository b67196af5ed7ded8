//! Error type for the intersection simulation core.
//!
//! The core performs no I/O, so every error is either malformed input
//! rejected at the boundary or a broken internal invariant.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A caller passed a value outside its domain (direction index, zone,
    /// pedestrian head index, time step).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Controller state that the phase sequence should make unreachable.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Non-positive or non-finite duration or distance at construction.
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type SimResult<T> = Result<T, SimError>;

/// Reject negative, NaN or infinite time steps.
pub(crate) fn check_delta(delta_secs: f32) -> SimResult<()> {
    if delta_secs.is_finite() && delta_secs >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidArgument(format!(
            "time step must be finite and non-negative, got {delta_secs}"
        )))
    }
}
