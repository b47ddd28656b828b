#![forbid(unsafe_code)]

//! sheetkit
//!
//! Host-facing layer of a draggable bottom-sheet panel. It ties the pure
//! motion and gesture logic in [`sheetkit_core`] to two threads:
//!
//! - the **UI thread** holds a [`Panel`]: `expand`/`close`/`toggle`,
//!   `is_open`, phase callbacks, back-navigation interception;
//! - the **animation thread** runs a [`PanelController`], either inside an
//!   [`AnimationThread`] or from the host's display-link callback.
//!
//! The two sides talk through a [`Command`] queue, a [`PanelEvent`] queue,
//! and a handful of lock-free shared cells.
//!
//! # Example
//!
//! ```
//! use sheetkit::{ExpandTarget, Panel};
//! use sheetkit_core::{Layout, NoContent, PanelConfig, Tunables};
//! use web_time::Duration;
//!
//! let (mut panel, mut controller) = Panel::mount(
//!     PanelConfig::new(0.5, 1.0),
//!     Tunables::default(),
//!     NoContent,
//!     Some(Layout::new(800.0, 0.0)),
//! )?;
//!
//! panel.expand(ExpandTarget::Default);
//! for _ in 0..60 {
//!     let _ = controller.frame(Duration::from_millis(16));
//!     panel.pump();
//! }
//! assert!(panel.is_open());
//! assert_eq!(panel.offset(), 400.0);
//! # Ok::<(), sheetkit::PanelError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `policy-config`: load [`PanelConfig`](sheetkit_core::PanelConfig) and
//!   [`Tunables`](sheetkit_core::Tunables) from TOML/JSON policy files.
//! - `tracing-json`: [`logging::init`] installs a JSON `tracing` subscriber.

pub mod command;
pub mod controller;
pub mod driver;
pub mod error;
pub mod facade;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod observable;
#[cfg(feature = "policy-config")]
pub mod policy;

pub use command::{Command, ExpandTarget, PanelEvent};
pub use controller::PanelController;
pub use driver::{AnimationThread, DEFAULT_FRAME_INTERVAL};
pub use error::{PanelError, Result};
pub use facade::Panel;
pub use observable::{Observable, Subscription};
#[cfg(feature = "policy-config")]
pub use policy::{PolicyError, SheetPolicy};
