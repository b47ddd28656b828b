#![forbid(unsafe_code)]

//! Configuration errors.
//!
//! Only configuration problems are errors in this crate. Touch cancels,
//! zero-sized layouts, and interrupted animations are recovered locally and
//! never surface here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// A panel configuration that violates its ordering invariant.
///
/// Reported once at mount time. There is no runtime recovery path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("open fraction must be in (0, 1], got {value}")]
    OpenFractionOutOfRange { value: f64 },

    #[error("max expansion fraction must be in (0, 1], got {value}")]
    MaxFractionOutOfRange { value: f64 },

    #[error("max expansion fraction {max} is below open fraction {open}")]
    MaxBelowOpen { open: f64, max: f64 },

    #[error("screen height must be finite and non-negative, got {value}")]
    InvalidScreenHeight { value: f64 },

    #[error("tunable `{name}` is invalid: {value}")]
    InvalidTunable { name: &'static str, value: f64 },
}

impl ConfigError {
    /// Name of the offending field, for structured logging.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::OpenFractionOutOfRange { .. } => "open_fraction",
            Self::MaxFractionOutOfRange { .. } | Self::MaxBelowOpen { .. } => {
                "max_expansion_fraction"
            }
            Self::InvalidScreenHeight { .. } => "screen_height",
            Self::InvalidTunable { name, .. } => name,
        }
    }
}
