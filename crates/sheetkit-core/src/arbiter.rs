#![forbid(unsafe_code)]

//! Gesture arbitration: does a touch drag move the panel or scroll the
//! content inside it?
//!
//! [`GestureArbiter`] owns one touch sequence at a time. Ownership is not
//! decided on touch-down; each move is checked against the content's scroll
//! position and the capture threshold until the panel claims the sequence.
//!
//! # State Machine
//!
//! ```text
//! idle ──down──▶ undecided ──claim──▶ panel ──up/cancel──▶ idle (Released)
//!                    │                   └──abort──▶ idle
//!                    └──up/cancel──▶ idle (content kept it)
//! ```
//!
//! # Invariants
//!
//! 1. At most one claimant. While undecided the content may scroll; once the
//!    panel claims, `set_gesture_enabled(false)` is issued before the panel
//!    moves, and the content stays disabled until the sequence ends.
//! 2. While the content reports a scroll offset above zero, an undecided
//!    sequence never moves the panel.
//! 3. Every sequence end re-enables content gestures, whoever owned it.
//! 4. `crossed_minimal_movement_threshold` is sticky: once the translation
//!    from touch-down exceeds the guard while the panel owns the sequence,
//!    it stays set.
//!
//! # Failure Modes
//!
//! - Touch-cancel mid-drag releases with zero velocity.
//! - Moves without a preceding touch-down are ignored.
//! - A second touch-down while a sequence is live cancels the old one first.

use std::collections::VecDeque;

use tracing::{debug, trace};
use web_time::{Duration, Instant};

use crate::adapter::{Arbitration, ScrollAdapter};
use crate::config::Tunables;
use crate::motion::{Interrupted, MotionEvent, PanelMotion, Phase};
use crate::snap::Release;

/// Upper bound on buffered velocity samples.
const MAX_SAMPLES: usize = 32;

/// Samples closer together than this do not produce a velocity.
const MIN_VELOCITY_SPAN_SECS: f64 = 0.001;

// ---------------------------------------------------------------------------
// Touch input
// ---------------------------------------------------------------------------

/// A raw vertical touch event in absolute screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    Down { y: f64, at: Instant },
    Move { y: f64, at: Instant },
    /// `velocity_y` is the platform's estimate in px/s, if it has one.
    Up {
        y: f64,
        at: Instant,
        velocity_y: Option<f64>,
    },
    Cancel { at: Instant },
}

/// Who owns the live sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Undecided,
    Panel,
}

// ---------------------------------------------------------------------------
// GestureSession
// ---------------------------------------------------------------------------

/// State of one touch sequence, from touch-down to touch-up or cancel.
#[derive(Debug, Clone)]
pub struct GestureSession {
    pub start_offset: f64,
    pub start_absolute_y: f64,
    /// Point the capture distance is measured from.
    pub anchor_y: f64,
    /// Finger travel since touch-down.
    pub cumulative_translation_y: f64,
    pub crossed_minimal_movement_threshold: bool,
    pub end_velocity_y: f64,
    pub owner: Owner,
    phase_before: Phase,
    /// Finger y and panel offset when the panel claimed.
    drag_origin: Option<(f64, f64)>,
    interrupted: Option<Interrupted>,
    samples: VecDeque<(f64, Instant)>,
}

impl GestureSession {
    fn new(y: f64, at: Instant, offset: f64, phase_before: Phase) -> Self {
        let mut samples = VecDeque::with_capacity(8);
        samples.push_back((y, at));
        Self {
            start_offset: offset,
            start_absolute_y: y,
            anchor_y: y,
            cumulative_translation_y: 0.0,
            crossed_minimal_movement_threshold: false,
            end_velocity_y: 0.0,
            owner: Owner::Undecided,
            phase_before,
            drag_origin: None,
            interrupted: None,
            samples,
        }
    }

    fn note_translation(&mut self, y: f64, minimal_movement: f64) {
        self.cumulative_translation_y = y - self.start_absolute_y;
        if self.cumulative_translation_y.abs() > minimal_movement {
            self.crossed_minimal_movement_threshold = true;
        }
    }

    fn record(&mut self, y: f64, at: Instant, window: Duration) {
        self.samples.push_back((y, at));
        while self.samples.len() > MAX_SAMPLES {
            self.samples.pop_front();
        }
        while let Some(&(_, t)) = self.samples.front() {
            if at.saturating_duration_since(t) > window && self.samples.len() > 2 {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Velocity in px/s over the buffered window.
    #[must_use]
    pub fn estimated_velocity(&self) -> f64 {
        let (Some(&(y0, t0)), Some(&(y1, t1))) = (self.samples.front(), self.samples.back())
        else {
            return 0.0;
        };
        let dt = t1.saturating_duration_since(t0).as_secs_f64();
        if dt < MIN_VELOCITY_SPAN_SECS {
            return 0.0;
        }
        (y1 - y0) / dt
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// A finished panel drag, ready for snap resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleasedDrag {
    pub release: Release,
    /// Animation the drag cancelled, if it started mid-flight.
    pub interrupted: Option<Interrupted>,
    /// Phase the panel was in at touch-down.
    pub phase_before: Phase,
}

/// Result of feeding one touch event to the arbiter.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureStep {
    /// Nothing changed for the panel.
    Idle,
    /// The panel claimed the sequence and entered `Dragging`.
    Claimed(Vec<MotionEvent>),
    /// The panel followed the finger to `offset`.
    Tracked { offset: f64 },
    /// The panel drag ended.
    Released(ReleasedDrag),
}

// ---------------------------------------------------------------------------
// GestureArbiter
// ---------------------------------------------------------------------------

/// Routes each touch sequence to the panel or to the content.
#[derive(Debug, Default)]
pub struct GestureArbiter {
    session: Option<GestureSession>,
}

impl GestureArbiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    /// Whether the panel owns the live sequence.
    #[must_use]
    pub fn panel_owns(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.owner == Owner::Panel)
    }

    /// Feed one touch event.
    pub fn handle<A: ScrollAdapter + ?Sized>(
        &mut self,
        event: TouchEvent,
        motion: &mut PanelMotion,
        adapter: &A,
        tunables: &Tunables,
    ) -> GestureStep {
        match event {
            TouchEvent::Down { y, at } => {
                let step = self.finish(Some(0.0), motion, adapter);
                self.on_down(y, at, motion, tunables);
                step
            }
            TouchEvent::Move { y, at } => self.on_move(y, at, motion, adapter, tunables),
            TouchEvent::Up { y, at, velocity_y } => {
                if let Some(session) = self.session.as_mut() {
                    session.record(y, at, tunables.velocity_window());
                }
                if self.panel_owns() {
                    // Apply the final position before measuring the release.
                    self.track(y, motion, tunables);
                }
                self.finish(velocity_y, motion, adapter)
            }
            TouchEvent::Cancel { .. } => self.finish(Some(0.0), motion, adapter),
        }
    }

    /// Drop the live sequence without a release (a host command preempted it).
    ///
    /// Returns whether the panel was dragging.
    pub fn abort<A: ScrollAdapter + ?Sized>(&mut self, motion: &mut PanelMotion, adapter: &A) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        adapter.set_gesture_enabled(true);
        if session.owner == Owner::Panel {
            motion.end_drag();
            debug!("panel drag aborted by command");
            true
        } else {
            false
        }
    }

    fn on_down(&mut self, y: f64, at: Instant, motion: &PanelMotion, tunables: &Tunables) {
        if motion.offsets().is_none() {
            trace!("touch-down before geometry; ignored");
            return;
        }
        let phase = motion.phase();
        if phase == Phase::Closed && !tunables.rim_drag_enabled {
            return;
        }
        trace!(y, offset = motion.offset(), ?phase, "touch-down");
        self.session = Some(GestureSession::new(y, at, motion.offset(), phase));
    }

    fn on_move<A: ScrollAdapter + ?Sized>(
        &mut self,
        y: f64,
        at: Instant,
        motion: &mut PanelMotion,
        adapter: &A,
        tunables: &Tunables,
    ) -> GestureStep {
        let Some(session) = self.session.as_mut() else {
            return GestureStep::Idle;
        };
        session.record(y, at, tunables.velocity_window());

        if session.owner == Owner::Panel {
            return self.track(y, motion, tunables);
        }

        let mode = adapter.arbitration();
        if mode != Arbitration::Direct && adapter.scroll_offset() > 0.0 {
            // Content is mid-scroll: it keeps the move, the panel stays put.
            if mode == Arbitration::Gated {
                session.anchor_y = y;
            }
            return GestureStep::Idle;
        }

        let translation = y - session.anchor_y;
        let from_rim = session.phase_before == Phase::Closed;
        let claims = match mode {
            Arbitration::Direct => translation != 0.0,
            Arbitration::Gated | Arbitration::Simultaneous => {
                let toward = if from_rim { -translation } else { translation };
                toward > tunables.capture_threshold
            }
        };
        if !claims {
            return GestureStep::Idle;
        }

        adapter.set_gesture_enabled(false);
        let (interrupted, events) = motion.begin_drag();
        session.owner = Owner::Panel;
        session.interrupted = interrupted;
        session.drag_origin = Some((y, motion.offset()));
        session.note_translation(y, tunables.minimal_movement);
        debug!(
            y,
            offset = motion.offset(),
            ?mode,
            interrupted = interrupted.is_some(),
            "panel claimed gesture"
        );
        GestureStep::Claimed(events)
    }

    fn track(&mut self, y: f64, motion: &mut PanelMotion, tunables: &Tunables) -> GestureStep {
        let Some(session) = self.session.as_mut() else {
            return GestureStep::Idle;
        };
        let Some((origin_y, origin_offset)) = session.drag_origin else {
            return GestureStep::Idle;
        };
        session.note_translation(y, tunables.minimal_movement);
        let translation = y - origin_y;
        motion.set_immediate(origin_offset + translation);
        trace!(translation, offset = motion.offset(), "drag");
        GestureStep::Tracked {
            offset: motion.offset(),
        }
    }

    fn finish<A: ScrollAdapter + ?Sized>(
        &mut self,
        velocity_y: Option<f64>,
        motion: &mut PanelMotion,
        adapter: &A,
    ) -> GestureStep {
        let Some(mut session) = self.session.take() else {
            return GestureStep::Idle;
        };
        adapter.set_gesture_enabled(true);
        if session.owner != Owner::Panel {
            return GestureStep::Idle;
        }

        let velocity = velocity_y.unwrap_or_else(|| session.estimated_velocity());
        session.end_velocity_y = if velocity.is_finite() { velocity } else { 0.0 };
        motion.end_drag();

        let release = Release {
            start_offset: session.start_offset,
            end_offset: motion.offset(),
            velocity_y: session.end_velocity_y,
            crossed_threshold: session.crossed_minimal_movement_threshold,
        };
        debug!(
            start = release.start_offset,
            end = release.end_offset,
            velocity = release.velocity_y,
            crossed = release.crossed_threshold,
            "panel released"
        );
        GestureStep::Released(ReleasedDrag {
            release,
            interrupted: session.interrupted,
            phase_before: session.phase_before,
        })
    }
}
