//! Errors raised by effect construction and host-side misuse.

use glam::Vec3;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    #[error("capacity must be greater than zero")]
    InvalidCapacity,

    #[error("{what} region is degenerate (min {min}, max {max})")]
    DegenerateRegion { what: &'static str, min: Vec3, max: Vec3 },

    #[error("respawn region lies entirely past the recycle threshold {threshold}")]
    EmptyRespawnRegion { threshold: f32 },

    #[error("probability per tick {0} is outside [0, 1]")]
    ProbabilityOutOfRange(f32),

    #[error("{what} range is malformed (min {min}, max {max})")]
    InvalidRange { what: &'static str, min: f32, max: f32 },

    #[error("invalid {what}: {value}")]
    InvalidParameter { what: &'static str, value: f32 },

    #[error("effect `{effect}` was used after dispose")]
    Disposed { effect: String },
}

impl EffectError {
    /// True for errors caused by bad constructor arguments. These can only be
    /// fixed by reconstructing the effect with a corrected configuration.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, EffectError::Disposed { .. })
    }
}

pub type Result<T> = std::result::Result<T, EffectError>;

/// Reject non-finite or out-of-range scalar parameters.
pub(crate) fn check_param(what: &'static str, value: f32, valid: bool) -> Result<()> {
    if value.is_finite() && valid {
        Ok(())
    } else {
        Err(EffectError::InvalidParameter { what, value })
    }
}
