#![forbid(unsafe_code)]

//! Damped harmonic oscillator (spring) animation in pixel space.
//!
//!   F = -stiffness × (position - target) - damping × velocity
//!
//! # Parameters
//!
//! - **stiffness** (k): restoring force strength. Higher = faster response.
//! - **damping** (c): velocity drag. `c ≈ 2√k` converges fastest without
//!   overshoot; lower values bounce past the target.
//! - **rest thresholds**: the spring snaps exactly onto its target once both
//!   the remaining distance and the speed fall below them. Defaults are sized
//!   for pixels (half a pixel, a few px/s).
//!
//! # Invariants
//!
//! 1. A spring at rest reports `position() == target()` exactly.
//! 2. A spring at rest does not move again unless retargeted or kicked.
//! 3. Stiffness is always positive and damping non-negative.
//!
//! # Failure Modes
//!
//! - Large dt: subdivided into ≤4ms steps, so a dropped frame does not blow
//!   up the integration.
//! - Zero damping: oscillates forever; `is_complete()` may never be true.

use web_time::Duration;

use super::Animation;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

/// Position delta (px) below which the spring may come to rest.
const DEFAULT_REST_THRESHOLD: f64 = 0.5;

/// Speed (px/s) below which the spring may come to rest.
const DEFAULT_VELOCITY_THRESHOLD: f64 = 5.0;

/// Minimum stiffness to prevent degenerate springs.
const MIN_STIFFNESS: f64 = 0.1;

/// A damped spring moving a pixel offset toward a target.
///
/// # Example
///
/// ```
/// use web_time::Duration;
/// use sheetkit_core::animation::{Animation, Spring};
///
/// let mut spring = Spring::new(800.0, 240.0).with_velocity(-1500.0);
/// for _ in 0..240 {
///     spring.tick(Duration::from_millis(16));
/// }
/// assert!(spring.is_complete());
/// assert_eq!(spring.position(), 240.0);
/// ```
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    stiffness: f64,
    damping: f64,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Create a spring at `initial` heading to `target`.
    ///
    /// Default parameters: stiffness = 300.0, damping = 34.0 (just under
    /// critical, a barely visible settle).
    #[must_use]
    pub fn new(initial: f64, target: f64) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
            target,
            stiffness: 300.0,
            damping: 34.0,
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            at_rest: false,
        }
    }

    /// Set stiffness (builder pattern). Clamped to minimum 0.1.
    #[must_use]
    pub fn with_stiffness(mut self, k: f64) -> Self {
        self.stiffness = k.max(MIN_STIFFNESS);
        self
    }

    /// Set damping (builder pattern). Clamped to minimum 0.0.
    #[must_use]
    pub fn with_damping(mut self, c: f64) -> Self {
        self.damping = c.max(0.0);
        self
    }

    /// Start with an initial velocity in px/s (a release flick).
    #[must_use]
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = if velocity.is_finite() { velocity } else { 0.0 };
        self
    }

    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    #[must_use]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    #[inline]
    #[must_use]
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Compute the critical damping coefficient for the current stiffness.
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        2.0 * self.stiffness.sqrt()
    }

    /// Single semi-implicit Euler step of `dt` seconds.
    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let acceleration = -self.stiffness * displacement - self.damping * self.velocity;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    fn settle_if_resting(&mut self) {
        let pos_delta = (self.position - self.target).abs();
        if pos_delta < self.rest_threshold && self.velocity.abs() < self.velocity_threshold {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }
        let total_secs = dt.as_secs_f64();
        if total_secs <= 0.0 {
            return;
        }
        let mut remaining = total_secs;
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }
        self.settle_if_resting();
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn target(&self) -> f64 {
        self.target
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    fn retarget(&mut self, target: f64) {
        if (self.target - target).abs() > f64::EPSILON {
            self.target = target;
            self.at_rest = false;
        }
    }
}
