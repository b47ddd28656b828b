#![forbid(unsafe_code)]

//! Geometry resolver: screen height + fractions → three snap offsets.
//!
//! Offsets are measured from the top of the screen to the top edge of the
//! panel, so a smaller offset means a more open panel.
//!
//! # Invariants
//!
//! 1. `max <= open <= closed` for any config that passed validation.
//! 2. [`ResolvedOffsets::clamp`] maps any finite value into `[max, closed]`.
//! 3. Resolution is all-or-nothing: callers either receive a complete
//!    [`ResolvedOffsets`] or `None` (unmeasured layout).

use crate::config::{Layout, PanelConfig};

/// One of the three resolved targets a release or command can settle on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapPoint {
    Closed,
    Open,
    Max,
}

/// Absolute offsets derived from a [`PanelConfig`] and [`Layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedOffsets {
    pub closed: f64,
    pub open: f64,
    pub max: f64,
}

impl ResolvedOffsets {
    /// Clamp `offset` into `[max, closed]`. NaN collapses to `closed`.
    #[inline]
    #[must_use]
    pub fn clamp(&self, offset: f64) -> f64 {
        if offset.is_nan() {
            return self.closed;
        }
        offset.clamp(self.max, self.closed)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, offset: f64) -> bool {
        (self.max..=self.closed).contains(&offset)
    }

    /// Offset of a snap point.
    #[must_use]
    pub fn offset_of(&self, point: SnapPoint) -> f64 {
        match point {
            SnapPoint::Closed => self.closed,
            SnapPoint::Open => self.open,
            SnapPoint::Max => self.max,
        }
    }

    /// The snap point an offset is exactly equal to, if any.
    ///
    /// When `open == max` the point is reported as [`SnapPoint::Open`].
    #[must_use]
    pub fn snap_point_at(&self, offset: f64) -> Option<SnapPoint> {
        if offset == self.open {
            Some(SnapPoint::Open)
        } else if offset == self.max {
            Some(SnapPoint::Max)
        } else if offset == self.closed {
            Some(SnapPoint::Closed)
        } else {
            None
        }
    }

    /// The snap point nearest to `offset`. Ties prefer the more open point.
    #[must_use]
    pub fn nearest_snap_point(&self, offset: f64) -> SnapPoint {
        let candidates = [SnapPoint::Max, SnapPoint::Open, SnapPoint::Closed];
        let mut best = SnapPoint::Closed;
        let mut best_dist = f64::INFINITY;
        for point in candidates {
            let dist = (self.offset_of(point) - offset).abs();
            if dist < best_dist {
                best = point;
                best_dist = dist;
            }
        }
        // Collapse Max onto Open when they coincide.
        if best == SnapPoint::Max && self.max == self.open {
            SnapPoint::Open
        } else {
            best
        }
    }

    /// Height available to the content slot with the panel's top at
    /// `offset`, excluding the bottom safe-area inset.
    #[must_use]
    pub fn content_height(&self, offset: f64, safe_area_bottom: f64) -> f64 {
        (self.closed - self.clamp(offset) - safe_area_bottom.max(0.0)).max(0.0)
    }
}

/// Resolve a config against a layout measurement.
///
/// Returns `None` while the layout is unmeasured (zero height before first
/// paint). The config is assumed to have been validated at mount.
#[must_use]
pub fn resolve(config: &PanelConfig, layout: &Layout) -> Option<ResolvedOffsets> {
    if !layout.is_measured() {
        return None;
    }
    let h = layout.screen_height;
    let open = h * (1.0 - config.open_fraction);
    let max = h * (1.0 - config.max_expansion_fraction);
    Some(ResolvedOffsets {
        closed: h,
        open: open.clamp(0.0, h),
        max: max.clamp(0.0, open.clamp(0.0, h)),
    })
}
