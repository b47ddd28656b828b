#![forbid(unsafe_code)]

//! Panel policy loaded from TOML or JSON.
//!
//! Available with the `policy-config` feature. A policy file carries the
//! per-mount [`PanelConfig`] and the [`Tunables`]; every key is optional and
//! falls back to its default.
//!
//! ```toml
//! [panel]
//! open_fraction = 0.6
//!
//! [tunables]
//! velocity_threshold = 250.0
//! rim_drag_enabled = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use sheetkit_core::{ConfigError, PanelConfig, Tunables};
use thiserror::Error;
use tracing::warn;

/// Errors from loading or validating a policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(#[from] ConfigError),
}

/// Everything needed to mount a panel, as data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetPolicy {
    pub panel: PanelConfig,
    pub tunables: Tunables,
}

impl SheetPolicy {
    /// Parse a TOML policy and validate it.
    ///
    /// # Errors
    ///
    /// Returns a parse error or the first invariant violation.
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyError> {
        let policy: Self = toml::from_str(s)?;
        policy.validated()
    }

    /// Load a TOML policy file.
    ///
    /// # Errors
    ///
    /// Returns an I/O, parse, or validation error.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse a JSON policy and validate it.
    ///
    /// # Errors
    ///
    /// Returns a parse error or the first invariant violation.
    pub fn from_json_str(s: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_str(s)?;
        policy.validated()
    }

    /// Load a JSON policy file.
    ///
    /// # Errors
    ///
    /// Returns an I/O, parse, or validation error.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check the panel fractions and every tunable.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.panel.validate()?;
        self.tunables.validate()
    }

    fn validated(self) -> Result<Self, PolicyError> {
        self.validate().inspect_err(|err| {
            warn!(field = err.field(), %err, "policy rejected");
        })?;
        Ok(self)
    }
}
