#![forbid(unsafe_code)]

//! Panel motion state: the offset, the phase machine, and the animation
//! driver that moves one toward the other.
//!
//! # State Machine
//!
//! ```text
//! Closed ──expand──▶ Opening ──settle──▶ Open
//! Open ──expand(max)──▶ Expanding ──settle──▶ Expanded
//! any ──close──▶ Closing ──settle──▶ Closed
//! Open | Expanded | Closed(rim) ──drag──▶ Dragging ──release──▶ Opening | Expanding | Closing
//! ```
//!
//! # Invariants
//!
//! 1. `offset()` is always inside `[max, closed]` once geometry is known.
//!    Springs may overshoot internally; the published value is clamped.
//! 2. At most one animation is in flight. Starting another cancels the
//!    previous one, whose completion callback receives
//!    [`SettleOutcome::Cancelled`].
//! 3. A settle publishes the final clamped offset before the terminal phase
//!    is stored or any event is returned.
//! 4. `set_immediate` is honored only while `Dragging`.
//!
//! # Failure Modes
//!
//! - `animate_to` before geometry is known cancels the request immediately
//!   (callers defer commands until the first measured layout).

use std::sync::Arc;

use tracing::{debug, trace};
use web_time::Duration;

use crate::animation::{Animation, Easing, Spring, Tween};
use crate::geometry::{ResolvedOffsets, SnapPoint};
use crate::shared::{SharedPanelState, UNMEASURED_OFFSET};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Discrete lifecycle state of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Closed,
    Opening,
    Open,
    Expanding,
    Expanded,
    Closing,
    Dragging,
}

impl Phase {
    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Self::Closed => 0,
            Self::Opening => 1,
            Self::Open => 2,
            Self::Expanding => 3,
            Self::Expanded => 4,
            Self::Closing => 5,
            Self::Dragging => 6,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Opening,
            2 => Self::Open,
            3 => Self::Expanding,
            4 => Self::Expanded,
            5 => Self::Closing,
            6 => Self::Dragging,
            _ => Self::Closed,
        }
    }

    /// Phase reached when an animation in this phase settles.
    #[must_use]
    pub fn settles_to(self) -> Option<Self> {
        match self {
            Self::Opening => Some(Self::Open),
            Self::Expanding => Some(Self::Expanded),
            Self::Closing => Some(Self::Closed),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_animating(self) -> bool {
        matches!(self, Self::Opening | Self::Expanding | Self::Closing)
    }

    /// Resting phases: nothing in flight, no drag.
    #[inline]
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Closed | Self::Open | Self::Expanded)
    }

    /// Settled somewhere other than closed.
    #[inline]
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open | Self::Expanded)
    }

    /// Whether the overlay needs to be mounted.
    #[inline]
    #[must_use]
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Snap point this phase rests at or moves toward.
    #[must_use]
    pub fn snap_point(self) -> Option<SnapPoint> {
        match self {
            Self::Closed | Self::Closing => Some(SnapPoint::Closed),
            Self::Open | Self::Opening => Some(SnapPoint::Open),
            Self::Expanded | Self::Expanding => Some(SnapPoint::Max),
            Self::Dragging => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Modes, outcomes, events
// ---------------------------------------------------------------------------

/// How an animation moves the offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionMode {
    Timed { duration: Duration, easing: Easing },
    Spring {
        stiffness: f64,
        damping: f64,
        initial_velocity: f64,
    },
}

/// Identifies one `animate_to` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(pub u64);

/// How an animation ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettleOutcome {
    /// Reached the target; `offset` is the final clamped value.
    Settled { offset: f64 },
    /// Replaced by a newer animation, a drag, or a geometry reset.
    Cancelled { offset: f64 },
}

/// Completion continuation attached to an `animate_to` call.
pub type SettleCallback = Box<dyn FnOnce(SettleOutcome) + Send>;

/// Observable effect of a motion operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionEvent {
    PhaseChanged { from: Phase, to: Phase },
    Settled {
        id: AnimationId,
        phase: Phase,
        offset: f64,
    },
    Cancelled { id: AnimationId, phase: Phase },
}

/// What a drag interrupted, so a no-op release can resume it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interrupted {
    pub target: f64,
    pub phase: Phase,
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Driver {
    Tween(Tween),
    Spring(Spring),
}

impl Driver {
    fn new(from: f64, target: f64, mode: MotionMode) -> Self {
        match mode {
            MotionMode::Timed { duration, easing } => {
                Self::Tween(Tween::new(from, target, duration).easing(easing))
            }
            MotionMode::Spring {
                stiffness,
                damping,
                initial_velocity,
            } => Self::Spring(
                Spring::new(from, target)
                    .with_stiffness(stiffness)
                    .with_damping(damping)
                    .with_velocity(initial_velocity),
            ),
        }
    }

    fn anim(&mut self) -> &mut dyn Animation {
        match self {
            Self::Tween(t) => t,
            Self::Spring(s) => s,
        }
    }

    fn position(&self) -> f64 {
        match self {
            Self::Tween(t) => t.position(),
            Self::Spring(s) => s.position(),
        }
    }

    fn target(&self) -> f64 {
        match self {
            Self::Tween(t) => t.target(),
            Self::Spring(s) => s.target(),
        }
    }
}

struct InFlight {
    id: AnimationId,
    driver: Driver,
    phase: Phase,
    on_settle: Vec<SettleCallback>,
}

impl std::fmt::Debug for InFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlight")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("target", &self.driver.target())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// PanelMotion
// ---------------------------------------------------------------------------

/// Owner of the panel offset and phase for one mounted panel.
#[derive(Debug)]
pub struct PanelMotion {
    shared: Arc<SharedPanelState>,
    offsets: Option<ResolvedOffsets>,
    current: f64,
    /// Unclamped below `closed` while dragging; equals `current` otherwise.
    visual: f64,
    phase: Phase,
    in_flight: Option<InFlight>,
    next_id: u64,
}

impl PanelMotion {
    #[must_use]
    pub fn new(shared: Arc<SharedPanelState>) -> Self {
        shared.store_phase(Phase::Closed);
        shared.store_dragging(false);
        Self {
            shared,
            offsets: None,
            current: UNMEASURED_OFFSET,
            visual: UNMEASURED_OFFSET,
            phase: Phase::Closed,
            in_flight: None,
            next_id: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Published (clamped) offset.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.current
    }

    /// Offset to draw at; may sit below `closed` during a drag.
    #[inline]
    #[must_use]
    pub fn visual_offset(&self) -> f64 {
        self.visual
    }

    #[inline]
    #[must_use]
    pub fn offsets(&self) -> Option<ResolvedOffsets> {
        self.offsets
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.phase == Phase::Dragging
    }

    /// Target of the in-flight animation, if any.
    #[must_use]
    pub fn animation_target(&self) -> Option<f64> {
        self.in_flight.as_ref().map(|f| f.driver.target())
    }

    /// Install new geometry, retargeting so the phase is preserved.
    ///
    /// Resting phases jump to the equivalent snap point of the new geometry;
    /// an in-flight animation keeps running toward its equivalent snap point;
    /// a drag is clamped into the new range.
    pub fn set_offsets(&mut self, offsets: ResolvedOffsets) {
        let previous = self.offsets.replace(offsets);

        let equivalent = |old_target: f64, phase: Phase| -> f64 {
            let point = previous
                .and_then(|p| p.snap_point_at(old_target))
                .or_else(|| phase.snap_point())
                .unwrap_or(SnapPoint::Closed);
            offsets.offset_of(point)
        };

        if let Some(flight) = self.in_flight.as_mut() {
            let new_target = equivalent(flight.driver.target(), flight.phase);
            flight.driver.anim().retarget(new_target);
            self.current = offsets.clamp(self.current);
            self.visual = self.current;
        } else if self.phase == Phase::Dragging {
            self.current = offsets.clamp(self.current);
            self.visual = self.visual.max(offsets.max);
        } else {
            let point = self.phase.snap_point().unwrap_or(SnapPoint::Closed);
            self.current = offsets.offset_of(point);
            self.visual = self.current;
        }
        debug!(
            closed = offsets.closed,
            open = offsets.open,
            max = offsets.max,
            phase = ?self.phase,
            offset = self.current,
            "geometry applied"
        );
        self.shared.store_offset(self.current);
    }

    /// Start an animation toward `target`, cancelling any in-flight one.
    ///
    /// `phase` must be one of the animating phases.
    pub fn animate_to(
        &mut self,
        target: f64,
        mode: MotionMode,
        phase: Phase,
        on_settle: Option<SettleCallback>,
    ) -> (AnimationId, Vec<MotionEvent>) {
        debug_assert!(phase.is_animating(), "animate_to with {phase:?}");
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        let mut events = Vec::with_capacity(3);

        let Some(offsets) = self.offsets else {
            if let Some(cb) = on_settle {
                cb(SettleOutcome::Cancelled {
                    offset: self.current,
                });
            }
            events.push(MotionEvent::Cancelled { id, phase });
            return (id, events);
        };

        self.cancel_in_flight(&mut events);
        let target = offsets.clamp(target);
        trace!(?id, target, from = self.visual, ?phase, "animate_to");
        self.in_flight = Some(InFlight {
            id,
            driver: Driver::new(self.visual, target, mode),
            phase,
            on_settle: on_settle.into_iter().collect(),
        });
        self.transition(phase, &mut events);
        (id, events)
    }

    /// Attach another completion callback to the in-flight animation.
    ///
    /// With nothing in flight the panel is at rest, so `cb` runs at once with
    /// [`SettleOutcome::Settled`].
    pub fn attach_on_settle(&mut self, cb: SettleCallback) {
        match self.in_flight.as_mut() {
            Some(flight) => flight.on_settle.push(cb),
            None => cb(SettleOutcome::Settled {
                offset: self.current,
            }),
        }
    }

    /// Enter `Dragging`, cancelling any in-flight animation.
    pub fn begin_drag(&mut self) -> (Option<Interrupted>, Vec<MotionEvent>) {
        let mut events = Vec::with_capacity(2);
        let interrupted = self.in_flight.as_ref().map(|f| Interrupted {
            target: f.driver.target(),
            phase: f.phase,
        });
        self.cancel_in_flight(&mut events);
        self.shared.store_dragging(true);
        self.transition(Phase::Dragging, &mut events);
        (interrupted, events)
    }

    /// 1:1 touch tracking. Ignored unless dragging.
    ///
    /// Upward motion stops at `max`; downward motion past `closed` is kept in
    /// the visual offset but the published offset is clamped.
    pub fn set_immediate(&mut self, offset: f64) {
        if self.phase != Phase::Dragging {
            return;
        }
        let Some(offsets) = self.offsets else {
            return;
        };
        self.visual = offset.max(offsets.max);
        self.current = offsets.clamp(offset);
        self.shared.store_offset(self.current);
    }

    /// Leave the drag. The caller follows up with `animate_to`.
    pub fn end_drag(&mut self) {
        self.shared.store_dragging(false);
    }

    /// Advance the in-flight animation.
    pub fn tick(&mut self, dt: Duration) -> Vec<MotionEvent> {
        let mut events = Vec::new();
        let Some(offsets) = self.offsets else {
            return events;
        };
        let Some(flight) = self.in_flight.as_mut() else {
            return events;
        };

        flight.driver.anim().tick(dt);
        let raw = flight.driver.position();
        let complete = flight.driver.anim().is_complete();
        self.current = offsets.clamp(raw);
        self.visual = self.current;

        if !complete {
            self.shared.store_offset(self.current);
            return events;
        }

        let Some(flight) = self.in_flight.take() else {
            return events;
        };
        self.current = offsets.clamp(flight.driver.target());
        self.visual = self.current;
        self.shared.store_offset(self.current);

        let settled = flight.phase.settles_to().unwrap_or(Phase::Closed);
        self.transition(settled, &mut events);
        debug!(id = ?flight.id, phase = ?settled, offset = self.current, "settled");
        events.push(MotionEvent::Settled {
            id: flight.id,
            phase: settled,
            offset: self.current,
        });
        for cb in flight.on_settle {
            cb(SettleOutcome::Settled {
                offset: self.current,
            });
        }
        events
    }

    fn cancel_in_flight(&mut self, events: &mut Vec<MotionEvent>) {
        if let Some(flight) = self.in_flight.take() {
            trace!(id = ?flight.id, offset = self.current, "animation cancelled");
            events.push(MotionEvent::Cancelled {
                id: flight.id,
                phase: flight.phase,
            });
            for cb in flight.on_settle {
                cb(SettleOutcome::Cancelled {
                    offset: self.current,
                });
            }
        }
    }

    fn transition(&mut self, to: Phase, events: &mut Vec<MotionEvent>) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        if from == Phase::Dragging {
            self.shared.store_dragging(false);
        }
        self.shared.store_phase(to);
        debug!(?from, ?to, "phase");
        events.push(MotionEvent::PhaseChanged { from, to });
    }
}
