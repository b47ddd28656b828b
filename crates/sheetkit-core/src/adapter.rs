#![forbid(unsafe_code)]

//! Content-scroll adapters.
//!
//! The panel controller is generic over a [`ScrollAdapter`]: the small
//! capability it needs from whatever scrollable content sits inside the
//! panel. The content side keeps a [`ContentHandle`] to push scroll offsets
//! and to learn whether it may capture gestures.
//!
//! | Adapter | Content | Arbitration |
//! |---------|---------|-------------|
//! | [`ScrollViewAdapter`] | plain scroll container | [`Arbitration::Simultaneous`] |
//! | [`VirtualListAdapter`] | virtualized list | [`Arbitration::Gated`] |
//! | [`NoContent`] | static content | [`Arbitration::Direct`] |

use std::sync::Arc;

use crate::shared::ScrollCoordination;

/// How the arbiter decides between the panel drag and the content scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arbitration {
    /// Content owns every move while scrolled away from its top. Once at the
    /// top, the capture distance is measured afresh from that point.
    Gated,
    /// Panel pan and content scroll are recognized together. The pan keeps
    /// measuring from touch-down and intercepts as soon as the content
    /// reports it is at its top edge.
    Simultaneous,
    /// No inner scroll. The panel takes any vertical movement.
    Direct,
}

/// What the controller needs from the inner scrollable content.
pub trait ScrollAdapter: Send {
    /// Latest content scroll offset; `<= 0` means scrolled to the top.
    fn scroll_offset(&self) -> f64;

    /// Enable or disable the content's own gesture capture.
    fn set_gesture_enabled(&self, enabled: bool);

    /// Arbitration policy for this content type.
    fn arbitration(&self) -> Arbitration;
}

/// Content-side view of the coordination state.
#[derive(Debug, Clone)]
pub struct ContentHandle {
    inner: Arc<ScrollCoordination>,
}

impl ContentHandle {
    /// Report a scroll event.
    pub fn on_scroll(&self, offset: f64) {
        self.inner.set_content_scroll_offset(offset);
    }

    /// Whether the content may currently capture drags.
    #[must_use]
    pub fn gesture_enabled(&self) -> bool {
        self.inner.content_gesture_enabled()
    }
}

macro_rules! coordinated_adapter {
    ($(#[$meta:meta])* $name:ident, $mode:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            coordination: Arc<ScrollCoordination>,
        }

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Handle for the content implementation.
            #[must_use]
            pub fn content_handle(&self) -> ContentHandle {
                ContentHandle {
                    inner: Arc::clone(&self.coordination),
                }
            }

            /// Shared coordination cells.
            #[must_use]
            pub fn coordination(&self) -> &Arc<ScrollCoordination> {
                &self.coordination
            }
        }

        impl ScrollAdapter for $name {
            fn scroll_offset(&self) -> f64 {
                self.coordination.content_scroll_offset()
            }

            fn set_gesture_enabled(&self, enabled: bool) {
                self.coordination.set_content_gesture_enabled(enabled);
            }

            fn arbitration(&self) -> Arbitration {
                $mode
            }
        }
    };
}

coordinated_adapter!(
    /// Adapter for a plain scroll container.
    ScrollViewAdapter,
    Arbitration::Simultaneous
);

coordinated_adapter!(
    /// Adapter for virtualized list content (pan overlaid on scroll).
    VirtualListAdapter,
    Arbitration::Gated
);

/// Adapter for panels without inner scrollable content.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContent;

impl ScrollAdapter for NoContent {
    fn scroll_offset(&self) -> f64 {
        0.0
    }

    fn set_gesture_enabled(&self, _enabled: bool) {}

    fn arbitration(&self) -> Arbitration {
        Arbitration::Direct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_and_adapter_share_cells() {
        let adapter = VirtualListAdapter::new();
        let handle = adapter.content_handle();
        handle.on_scroll(120.0);
        assert_eq!(adapter.scroll_offset(), 120.0);
        adapter.set_gesture_enabled(false);
        assert!(!handle.gesture_enabled());
    }

    #[test]
    fn arbitration_per_adapter() {
        assert_eq!(ScrollViewAdapter::new().arbitration(), Arbitration::Simultaneous);
        assert_eq!(VirtualListAdapter::new().arbitration(), Arbitration::Gated);
        assert_eq!(NoContent.arbitration(), Arbitration::Direct);
    }

    #[test]
    fn no_content_is_always_at_top() {
        assert_eq!(NoContent.scroll_offset(), 0.0);
    }
}
