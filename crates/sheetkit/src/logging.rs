#![forbid(unsafe_code)]

//! Structured JSON logging for hosts that want sheetkit's traces.
//!
//! Available with the `tracing-json` feature. Filtering follows `RUST_LOG`:
//!
//! - `RUST_LOG=sheetkit=debug` - phase transitions, claims, releases
//! - `RUST_LOG=sheetkit_core::arbiter=trace` - every touch move
//!
//! Without `RUST_LOG` the filter defaults to `warn`.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global JSON subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true),
        )
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails() {
        let first = init();
        assert!(init().is_err() || first.is_err());
    }
}
