// Forbid unsafe in production; deny in tests.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: motion, gesture arbitration, and snap resolution for a draggable
//! sheet panel.
//!
//! # Role in sheetkit
//! `sheetkit-core` holds everything that decides *where the panel is* and
//! *who owns a touch*. It has no threads and no host bindings; the
//! `sheetkit` crate wires it to a command queue, an animation thread, and a
//! UI-facing facade.
//!
//! # Primary responsibilities
//! - **Geometry**: screen height + fractions → closed / open / max offsets.
//! - **PanelMotion**: offset, phase machine, timed and spring animations.
//! - **GestureArbiter**: panel drag vs. inner content scroll.
//! - **Snap**: release velocity and position → target offset.
//! - **Backdrop**: offset → dimmed-overlay opacity and hit-testability.
//! - **Shared cells**: the few values read across the thread boundary.

pub mod adapter;
pub mod animation;
pub mod arbiter;
pub mod backdrop;
pub mod config;
pub mod error;
pub mod geometry;
pub mod motion;
pub mod shared;
pub mod snap;

pub use adapter::{Arbitration, ContentHandle, NoContent, ScrollAdapter, ScrollViewAdapter, VirtualListAdapter};
pub use arbiter::{GestureArbiter, GestureSession, GestureStep, ReleasedDrag, TouchEvent};
pub use backdrop::Backdrop;
pub use config::{Layout, PanelConfig, Tunables};
pub use error::{ConfigError, Result};
pub use geometry::{ResolvedOffsets, SnapPoint};
pub use motion::{AnimationId, Interrupted, MotionEvent, MotionMode, PanelMotion, Phase, SettleCallback, SettleOutcome};
pub use shared::{GeometrySnapshot, ScrollCoordination, SharedPanelState, UNMEASURED_OFFSET};
