#![forbid(unsafe_code)]

//! Error types for mounting and driving a panel.

use std::io;

use sheetkit_core::ConfigError;
use thiserror::Error;

/// Result alias for sheetkit operations.
pub type Result<T> = std::result::Result<T, PanelError>;

/// Errors surfaced by the host-facing layer.
#[derive(Debug, Error)]
pub enum PanelError {
    /// Mount-time configuration or layout rejected.
    #[error("invalid panel configuration: {0}")]
    Config(#[from] ConfigError),

    /// The animation thread could not be started.
    #[error("failed to spawn animation thread: {0}")]
    Spawn(#[from] io::Error),
}
