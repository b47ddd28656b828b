#![forbid(unsafe_code)]

//! Backdrop opacity derived from the panel offset.
//!
//! Opacity ramps linearly from 0 at `closed` to `max_opacity` at `open` and
//! stays flat above `open`. A fully transparent backdrop does not take
//! touches, so taps reach whatever sits behind a closed panel.

use crate::geometry::ResolvedOffsets;

/// Derived dimmed-overlay state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backdrop {
    pub opacity: f64,
    pub hit_testable: bool,
}

impl Backdrop {
    /// Fully transparent, pass-through backdrop.
    pub const HIDDEN: Self = Self {
        opacity: 0.0,
        hit_testable: false,
    };

    /// Derive from an offset.
    #[must_use]
    pub fn at(offset: f64, offsets: &ResolvedOffsets, max_opacity: f64) -> Self {
        let opacity = opacity(offset, offsets, max_opacity);
        Self {
            opacity,
            hit_testable: opacity > 0.0,
        }
    }
}

/// Opacity in `[0, max_opacity]` for an offset.
#[must_use]
pub fn opacity(offset: f64, offsets: &ResolvedOffsets, max_opacity: f64) -> f64 {
    let span = offsets.closed - offsets.open;
    let max_opacity = max_opacity.clamp(0.0, 1.0);
    if span <= 0.0 {
        return if offset < offsets.closed { max_opacity } else { 0.0 };
    }
    let t = ((offsets.closed - offsets.clamp(offset)) / span).clamp(0.0, 1.0);
    t * max_opacity
}
