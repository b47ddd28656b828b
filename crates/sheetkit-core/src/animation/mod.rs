#![forbid(unsafe_code)]

//! Animation primitives driving the panel offset.
//!
//! Both primitives work in absolute pixel offsets rather than normalized
//! progress, so the motion state can retarget them in place when the screen
//! geometry changes mid-flight.
//!
//! - [`Tween`]: fixed-duration transition with an [`Easing`] curve. Used for
//!   host-issued `expand()` / `close()`.
//! - [`Spring`]: damped harmonic oscillator. Used for release snaps so the
//!   flick velocity carries into the settle.

pub mod spring;
pub mod tween;

use web_time::Duration;

pub use spring::Spring;
pub use tween::{Easing, Tween};

/// A time-driven offset animation.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Current raw position. Springs may overshoot the target.
    fn position(&self) -> f64;

    /// Final resting position.
    fn target(&self) -> f64;

    /// Whether the animation has settled exactly at its target.
    fn is_complete(&self) -> bool;

    /// Move the target without restarting the motion.
    fn retarget(&mut self, target: f64);
}
