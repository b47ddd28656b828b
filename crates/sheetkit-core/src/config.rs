#![forbid(unsafe_code)]

//! Panel configuration, layout inputs, and tunable thresholds.
//!
//! # Invariants
//!
//! 1. `0 < open_fraction <= max_expansion_fraction <= 1` for any config that
//!    passed [`PanelConfig::validate`].
//! 2. Every [`Tunables`] default matches the hand-tuned values the gesture and
//!    snap logic were designed around: 200 px/s release velocity, 10 px
//!    minimal movement, 20 px capture distance.
//!
//! # Failure Modes
//!
//! - Out-of-range fractions or thresholds are rejected by `validate()`; the
//!   facade refuses to mount with them.
//! - A zero-sized [`Layout`] is not an error. Geometry resolution simply
//!   yields nothing until a real measurement arrives.

use web_time::Duration;

use crate::error::{ConfigError, Result};

// ---------------------------------------------------------------------------
// PanelConfig
// ---------------------------------------------------------------------------

/// Immutable per-mount panel configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PanelConfig {
    /// Fraction of the screen covered when opened to the default snap point.
    pub open_fraction: f64,
    /// Fraction of the screen covered at maximum expansion.
    pub max_expansion_fraction: f64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            open_fraction: 0.5,
            max_expansion_fraction: 1.0,
        }
    }
}

impl PanelConfig {
    /// Create a config with the given fractions.
    #[must_use]
    pub fn new(open_fraction: f64, max_expansion_fraction: f64) -> Self {
        Self {
            open_fraction,
            max_expansion_fraction,
        }
    }

    /// Check the ordering invariant `0 < open <= max <= 1`.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        let open = self.open_fraction;
        let max = self.max_expansion_fraction;
        if !(open.is_finite() && open > 0.0 && open <= 1.0) {
            return Err(ConfigError::OpenFractionOutOfRange { value: open });
        }
        if !(max.is_finite() && max > 0.0 && max <= 1.0) {
            return Err(ConfigError::MaxFractionOutOfRange { value: max });
        }
        if max < open {
            return Err(ConfigError::MaxBelowOpen { open, max });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Read-only device measurements, polled on every layout change.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Layout {
    pub screen_height: f64,
    pub safe_area_bottom: f64,
}

impl Layout {
    #[must_use]
    pub fn new(screen_height: f64, safe_area_bottom: f64) -> Self {
        Self {
            screen_height,
            safe_area_bottom,
        }
    }

    /// Whether this measurement can produce geometry.
    ///
    /// The first layout pass can report a zero height before paint; such a
    /// measurement is skipped rather than treated as an error.
    #[inline]
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.screen_height.is_finite() && self.screen_height > 0.0
    }

    /// Reject heights that can never become valid (negative or NaN).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidScreenHeight`].
    pub fn validate(&self) -> Result<()> {
        let h = self.screen_height;
        if h.is_nan() || h < 0.0 || h.is_infinite() {
            return Err(ConfigError::InvalidScreenHeight { value: h });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tunables
// ---------------------------------------------------------------------------

/// Release velocity (px/s) beyond which a flick snaps regardless of position.
pub const DEFAULT_VELOCITY_THRESHOLD: f64 = 200.0;

/// Translation (px) a drag must exceed to count as movement rather than a tap.
pub const DEFAULT_MINIMAL_MOVEMENT: f64 = 10.0;

/// Downward translation (px) before the panel steals a touch from content.
pub const DEFAULT_CAPTURE_THRESHOLD: f64 = 20.0;

/// Named, overridable thresholds and timings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Tunables {
    /// Release velocity threshold in px/s (default: 200).
    pub velocity_threshold: f64,
    /// Minimal movement guard in px (default: 10).
    pub minimal_movement: f64,
    /// Capture distance in px for content-bearing panels (default: 20).
    pub capture_threshold: f64,
    /// Backdrop opacity when the panel is at or above its open offset.
    pub max_backdrop_opacity: f64,
    /// Duration of the timed `expand()` transition, in milliseconds.
    pub open_duration_ms: u64,
    /// Duration of the timed `close()` transition, in milliseconds.
    pub close_duration_ms: u64,
    /// Spring stiffness for release snaps.
    pub spring_stiffness: f64,
    /// Spring damping for release snaps. Must be positive.
    pub spring_damping: f64,
    /// Trailing window of touch samples used to estimate release velocity.
    pub velocity_window_ms: u64,
    /// Allow a drag to begin while the panel rests closed at the screen rim.
    pub rim_drag_enabled: bool,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            minimal_movement: DEFAULT_MINIMAL_MOVEMENT,
            capture_threshold: DEFAULT_CAPTURE_THRESHOLD,
            max_backdrop_opacity: 0.5,
            open_duration_ms: 300,
            close_duration_ms: 250,
            spring_stiffness: 300.0,
            spring_damping: 34.0,
            velocity_window_ms: 100,
            rim_drag_enabled: false,
        }
    }
}

impl Tunables {
    #[must_use]
    pub fn open_duration(&self) -> Duration {
        Duration::from_millis(self.open_duration_ms)
    }

    #[must_use]
    pub fn close_duration(&self) -> Duration {
        Duration::from_millis(self.close_duration_ms)
    }

    #[must_use]
    pub fn velocity_window(&self) -> Duration {
        Duration::from_millis(self.velocity_window_ms)
    }

    /// Set the velocity threshold (builder pattern).
    #[must_use]
    pub fn with_velocity_threshold(mut self, px_per_sec: f64) -> Self {
        self.velocity_threshold = px_per_sec;
        self
    }

    /// Set the capture threshold (builder pattern).
    #[must_use]
    pub fn with_capture_threshold(mut self, px: f64) -> Self {
        self.capture_threshold = px;
        self
    }

    /// Set the minimal movement guard (builder pattern).
    #[must_use]
    pub fn with_minimal_movement(mut self, px: f64) -> Self {
        self.minimal_movement = px;
        self
    }

    /// Enable or disable drag-to-open from the closed rim.
    #[must_use]
    pub fn with_rim_drag(mut self, enabled: bool) -> Self {
        self.rim_drag_enabled = enabled;
        self
    }

    /// Zero both timed transition durations (instant expand/close).
    #[must_use]
    pub fn without_timed_motion(mut self) -> Self {
        self.open_duration_ms = 0;
        self.close_duration_ms = 0;
        self
    }

    /// Validate every threshold is finite and within range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTunable`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("velocity_threshold", self.velocity_threshold),
            ("minimal_movement", self.minimal_movement),
            ("capture_threshold", self.capture_threshold),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTunable { name, value });
            }
        }
        // An undamped spring never comes to rest.
        let positive = [
            ("spring_stiffness", self.spring_stiffness),
            ("spring_damping", self.spring_damping),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidTunable { name, value });
            }
        }
        let opacity = self.max_backdrop_opacity;
        if !(0.0..=1.0).contains(&opacity) {
            return Err(ConfigError::InvalidTunable {
                name: "max_backdrop_opacity",
                value: opacity,
            });
        }
        Ok(())
    }
}
