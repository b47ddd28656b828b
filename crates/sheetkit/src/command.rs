#![forbid(unsafe_code)]

//! Messages crossing the UI / animation thread boundary.
//!
//! [`Command`] flows from the [`Panel`](crate::Panel) to the
//! [`PanelController`](crate::PanelController); [`PanelEvent`] flows back.
//! Both queues are plain `std::sync::mpsc` channels: enqueueing never
//! blocks.

use std::sync::mpsc;

use sheetkit_core::{Layout, MotionEvent, Phase, SettleOutcome, TouchEvent};

/// Snap point requested by `expand`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExpandTarget {
    /// The open snap point.
    #[default]
    Default,
    /// Maximum expansion.
    Max,
}

impl ExpandTarget {
    /// Animating phase that carries the panel to this target.
    #[must_use]
    pub fn animating_phase(self) -> Phase {
        match self {
            Self::Default => Phase::Opening,
            Self::Max => Phase::Expanding,
        }
    }

    /// Resting phase at this target.
    #[must_use]
    pub fn resting_phase(self) -> Phase {
        match self {
            Self::Default => Phase::Open,
            Self::Max => Phase::Expanded,
        }
    }
}

/// Work for the controller.
#[derive(Debug)]
pub enum Command {
    Expand(ExpandTarget),
    Close,
    /// Close, then report how the close ended on the sender.
    ///
    /// Joins a close already in flight instead of restarting it.
    CloseThen(mpsc::Sender<SettleOutcome>),
    Toggle,
    /// New layout measurement (first paint, rotation, safe-area change).
    Layout(Layout),
    Touch(TouchEvent),
    Shutdown,
}

/// Notification for the UI thread.
///
/// Every event is sent after the shared offset cell holds the value it
/// describes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    PhaseChanged { from: Phase, to: Phase },
    Settled { phase: Phase, offset: f64 },
    Cancelled { phase: Phase },
}

impl From<MotionEvent> for PanelEvent {
    fn from(event: MotionEvent) -> Self {
        match event {
            MotionEvent::PhaseChanged { from, to } => Self::PhaseChanged { from, to },
            MotionEvent::Settled { phase, offset, .. } => Self::Settled { phase, offset },
            MotionEvent::Cancelled { phase, .. } => Self::Cancelled { phase },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetkit_core::AnimationId;

    #[test]
    fn expand_target_phases() {
        assert_eq!(ExpandTarget::default(), ExpandTarget::Default);
        assert_eq!(ExpandTarget::Default.animating_phase(), Phase::Opening);
        assert_eq!(ExpandTarget::Max.resting_phase(), Phase::Expanded);
    }

    #[test]
    fn motion_events_drop_animation_ids() {
        let settled = MotionEvent::Settled {
            id: AnimationId(4),
            phase: Phase::Open,
            offset: 240.0,
        };
        assert_eq!(
            PanelEvent::from(settled),
            PanelEvent::Settled {
                phase: Phase::Open,
                offset: 240.0
            }
        );
        let cancelled = MotionEvent::Cancelled {
            id: AnimationId(1),
            phase: Phase::Closing,
        };
        assert_eq!(
            PanelEvent::from(cancelled),
            PanelEvent::Cancelled {
                phase: Phase::Closing
            }
        );
    }
}
