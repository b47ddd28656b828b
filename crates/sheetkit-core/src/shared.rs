#![forbid(unsafe_code)]

//! Values shared between the UI thread and the animation/gesture thread.
//!
//! Only the following cross the thread boundary:
//!
//! | Cell | Writer | Readers |
//! |------|--------|---------|
//! | `current_offset` | motion state (animation thread) | UI, backdrop, render |
//! | `is_dragging` | motion state | UI |
//! | `phase` | motion state | UI |
//! | `geometry` | controller on layout change | UI, render |
//! | `content_scroll_offset` | content adapter | arbiter |
//! | `content_gesture_enabled` | arbiter | content adapter |
//!
//! # Constraints
//!
//! - Every cell has exactly one writer, so plain atomic stores suffice.
//!   Release/Acquire ordering makes a phase store visible only after the
//!   offset store that preceded it.
//! - Reads never block. Scalars are lock-free atomics; the geometry is an
//!   `arc-swap` cell so a reader always sees a complete set of offsets.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

use arc_swap::ArcSwap;

use crate::geometry::ResolvedOffsets;
use crate::motion::Phase;

/// Offset published before the first measured layout: off-screen below.
pub const UNMEASURED_OFFSET: f64 = f64::INFINITY;

// ---------------------------------------------------------------------------
// AtomicF64
// ---------------------------------------------------------------------------

/// Single-writer `f64` cell stored as raw bits.
#[derive(Debug)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    #[inline]
    pub fn store(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Geometry snapshot
// ---------------------------------------------------------------------------

/// The geometry most recently published by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometrySnapshot {
    /// `None` until the first measured layout arrives.
    pub offsets: Option<ResolvedOffsets>,
    pub safe_area_bottom: f64,
}

// ---------------------------------------------------------------------------
// SharedPanelState
// ---------------------------------------------------------------------------

/// Panel values readable from any thread.
#[derive(Debug)]
pub struct SharedPanelState {
    current_offset: AtomicF64,
    is_dragging: AtomicBool,
    phase: AtomicU8,
    geometry: ArcSwap<GeometrySnapshot>,
}

impl Default for SharedPanelState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedPanelState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_offset: AtomicF64::new(UNMEASURED_OFFSET),
            is_dragging: AtomicBool::new(false),
            phase: AtomicU8::new(Phase::Closed.to_u8()),
            geometry: ArcSwap::from_pointee(GeometrySnapshot::default()),
        }
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.current_offset.load()
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.is_dragging.load(Ordering::Acquire)
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Current geometry snapshot (wait-free, no clone of the inner Arc).
    pub fn geometry(&self) -> GeometrySnapshot {
        **self.geometry.load()
    }

    pub(crate) fn store_offset(&self, offset: f64) {
        self.current_offset.store(offset);
    }

    pub(crate) fn store_dragging(&self, dragging: bool) {
        self.is_dragging.store(dragging, Ordering::Release);
    }

    pub(crate) fn store_phase(&self, phase: Phase) {
        self.phase.store(phase.to_u8(), Ordering::Release);
    }

    /// Publish a complete geometry snapshot in one swap.
    pub fn publish_geometry(&self, snapshot: GeometrySnapshot) {
        self.geometry.store(Arc::new(snapshot));
    }
}

// ---------------------------------------------------------------------------
// ScrollCoordination
// ---------------------------------------------------------------------------

/// Handshake between the arbiter and the inner scrollable content.
///
/// Invariant: while the panel owns a drag, `content_gesture_enabled` is
/// false.
#[derive(Debug)]
pub struct ScrollCoordination {
    content_scroll_offset: AtomicF64,
    content_gesture_enabled: AtomicBool,
}

impl Default for ScrollCoordination {
    fn default() -> Self {
        Self {
            content_scroll_offset: AtomicF64::new(0.0),
            content_gesture_enabled: AtomicBool::new(true),
        }
    }
}

impl ScrollCoordination {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn content_scroll_offset(&self) -> f64 {
        self.content_scroll_offset.load()
    }

    #[inline]
    pub fn set_content_scroll_offset(&self, offset: f64) {
        self.content_scroll_offset.store(offset);
    }

    #[inline]
    pub fn content_gesture_enabled(&self) -> bool {
        self.content_gesture_enabled.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set_content_gesture_enabled(&self, enabled: bool) {
        self.content_gesture_enabled.store(enabled, Ordering::Release);
    }
}
