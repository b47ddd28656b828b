#![forbid(unsafe_code)]

//! Timed transition between two offsets.
//!
//! # Invariants
//!
//! - Progress is always in [0.0, 1.0]; easing curves here never overshoot,
//!   so `position()` stays between `from` and `target`.
//! - Zero-duration tweens complete on the first tick.
//! - Retargeting keeps elapsed progress and bends the remaining path toward
//!   the new target.

use web_time::Duration;

use super::Animation;

/// Easing curve for timed transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Decelerating cubic. Default for both open and close.
    #[default]
    EaseOut,
    EaseIn,
    EaseInOut,
}

impl Easing {
    /// Apply the curve to `t`, clamped into [0.0, 1.0].
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseIn => t * t * t,
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
        }
    }
}

/// A fixed-duration offset transition.
#[derive(Debug, Clone)]
pub struct Tween {
    from: f64,
    target: f64,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl Tween {
    #[must_use]
    pub fn new(from: f64, target: f64, duration: Duration) -> Self {
        Self {
            from,
            target,
            duration,
            elapsed: Duration::ZERO,
            easing: Easing::default(),
        }
    }

    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Linear progress in [0.0, 1.0].
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    fn position(&self) -> f64 {
        let p = self.progress();
        if p >= 1.0 {
            return self.target;
        }
        self.from + (self.target - self.from) * self.easing.apply(p)
    }

    fn target(&self) -> f64 {
        self.target
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn retarget(&mut self, target: f64) {
        // Keep the eased fraction covered so far; rescale `from` so the
        // current position is continuous under the new target.
        let eased = self.easing.apply(self.progress());
        let current = self.position();
        self.target = target;
        if eased < 1.0 {
            self.from = (current - target * eased) / (1.0 - eased);
        } else {
            self.from = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_50: Duration = Duration::from_millis(50);

    #[test]
    fn linear_midpoint() {
        let mut t = Tween::new(800.0, 400.0, Duration::from_millis(100)).easing(Easing::Linear);
        t.tick(MS_50);
        assert!((t.position() - 600.0).abs() < 1e-9);
        assert!(!t.is_complete());
    }

    #[test]
    fn completes_exactly_at_target() {
        let mut t = Tween::new(800.0, 240.0, Duration::from_millis(300));
        for _ in 0..10 {
            t.tick(MS_50);
        }
        assert!(t.is_complete());
        assert_eq!(t.position(), 240.0);
    }

    #[test]
    fn zero_duration_is_instant() {
        let mut t = Tween::new(0.0, 100.0, Duration::ZERO);
        assert_eq!(t.position(), 100.0);
        t.tick(Duration::ZERO);
        assert!(t.is_complete());
    }

    #[test]
    fn positions_stay_between_endpoints() {
        for easing in [Easing::Linear, Easing::EaseOut, Easing::EaseIn, Easing::EaseInOut] {
            let mut t = Tween::new(800.0, 240.0, Duration::from_millis(300)).easing(easing);
            for _ in 0..20 {
                t.tick(Duration::from_millis(16));
                let p = t.position();
                assert!((240.0..=800.0).contains(&p), "{easing:?} produced {p}");
            }
        }
    }

    #[test]
    fn easing_is_monotonic() {
        for easing in [Easing::Linear, Easing::EaseOut, Easing::EaseIn, Easing::EaseInOut] {
            let mut prev = 0.0;
            for i in 0..=100 {
                let v = easing.apply(f64::from(i) / 100.0);
                assert!(v >= prev - 1e-12, "{easing:?} not monotonic at {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn retarget_is_continuous() {
        let mut t = Tween::new(800.0, 240.0, Duration::from_millis(200));
        t.tick(MS_50);
        let before = t.position();
        t.retarget(300.0);
        assert!((t.position() - before).abs() < 1e-6);
        t.tick(Duration::from_millis(150));
        assert_eq!(t.position(), 300.0);
    }
}
