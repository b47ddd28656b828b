#![forbid(unsafe_code)]

//! Snap resolution: where a released drag comes to rest.
//!
//! Rules, first match wins:
//!
//! 1. Movement never crossed the minimal-movement guard → stay at the start.
//! 2. Upward flick faster than the velocity threshold → max expansion.
//! 3. Downward flick faster than the velocity threshold → closed.
//! 4. Slow release → by position:
//!    - closer to `max` than to the open/max midpoint → `max`
//!    - else closer to `open` than to the open/closed midpoint → `open`
//!    - else `closed`
//!
//! Velocity is in px/s with the screen's y axis: negative is upward (toward
//! a smaller offset, more open).
//!
//! The result is always inside `[max, closed]`.

use crate::arbiter::ReleasedDrag;
use crate::geometry::{ResolvedOffsets, SnapPoint};
use crate::motion::Phase;

/// Everything the resolver needs from a finished gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    pub start_offset: f64,
    pub end_offset: f64,
    pub velocity_y: f64,
    pub crossed_threshold: bool,
}

/// Resolve a release to a target offset.
#[must_use]
pub fn resolve(release: &Release, offsets: &ResolvedOffsets, velocity_threshold: f64) -> f64 {
    let target = if !release.crossed_threshold {
        release.start_offset
    } else if release.velocity_y < -velocity_threshold {
        offsets.max
    } else if release.velocity_y > velocity_threshold {
        offsets.closed
    } else {
        by_position(offsets.clamp(release.end_offset), offsets)
    };
    offsets.clamp(target)
}

fn by_position(end: f64, offsets: &ResolvedOffsets) -> f64 {
    let open_max_mid = (offsets.open + offsets.max) / 2.0;
    let open_closed_mid = (offsets.open + offsets.closed) / 2.0;

    if (end - offsets.max).abs() < (end - open_max_mid).abs() {
        offsets.max
    } else if (end - offsets.open).abs() < (end - open_closed_mid).abs() {
        offsets.open
    } else {
        offsets.closed
    }
}

/// The animating phase that carries the panel to `target`.
///
/// Targets that are not exactly a snap point use the nearest one.
#[must_use]
pub fn phase_toward(target: f64, offsets: &ResolvedOffsets) -> Phase {
    let point = offsets
        .snap_point_at(target)
        .unwrap_or_else(|| offsets.nearest_snap_point(target));
    match point {
        SnapPoint::Closed => Phase::Closing,
        SnapPoint::Open => Phase::Opening,
        SnapPoint::Max => Phase::Expanding,
    }
}

/// Target and animating phase for a finished drag.
///
/// A drag that never crossed the minimal-movement guard leaves the panel
/// where it was headed: an interrupted animation resumes toward its own
/// target, otherwise the panel returns to the resting phase it started in.
#[must_use]
pub fn settle_plan(
    drag: &ReleasedDrag,
    offsets: &ResolvedOffsets,
    velocity_threshold: f64,
) -> (f64, Phase) {
    if !drag.release.crossed_threshold {
        if let Some(interrupted) = drag.interrupted {
            return (offsets.clamp(interrupted.target), interrupted.phase);
        }
        let target = resolve(&drag.release, offsets, velocity_threshold);
        let phase = match drag.phase_before {
            Phase::Open => Phase::Opening,
            Phase::Expanded => Phase::Expanding,
            Phase::Closed => Phase::Closing,
            _ => phase_toward(target, offsets),
        };
        return (target, phase);
    }
    let target = resolve(&drag.release, offsets, velocity_threshold);
    (target, phase_toward(target, offsets))
}
