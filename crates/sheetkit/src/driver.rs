#![forbid(unsafe_code)]

//! Dedicated animation/gesture thread.
//!
//! [`AnimationThread`] moves a [`PanelController`] onto its own named thread
//! and calls [`PanelController::frame`] at a fixed refresh interval. Hosts
//! with a native display link can skip this and call `frame` from their own
//! vsync callback instead.
//!
//! # Shutdown
//!
//! The loop exits when the controller breaks (a [`Command::Shutdown`], or
//! the [`Panel`](crate::Panel) being dropped) or when this handle asks it to
//! stop. Dropping the handle stops and joins the thread.
//!
//! [`Command::Shutdown`]: crate::Command::Shutdown

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use sheetkit_core::ScrollAdapter;
use tracing::{debug, trace};
use web_time::{Duration, Instant};

use crate::controller::PanelController;

/// Frame interval for a 60 Hz display.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Longest step handed to the controller after a stall.
const MAX_FRAME_STEP: Duration = Duration::from_millis(64);

/// Handle to the running animation thread.
#[derive(Debug)]
pub struct AnimationThread {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl AnimationThread {
    /// Spawn the frame loop for `controller`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn start<A>(controller: PanelController<A>, interval: Duration) -> io::Result<Self>
    where
        A: ScrollAdapter + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("sheetkit-anim".into())
            .spawn(move || frame_loop(controller, interval, &stop_flag))?;
        debug!(?interval, "animation thread started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Whether the frame loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the loop and wait for the thread to exit.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AnimationThread {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn frame_loop<A: ScrollAdapter>(
    mut controller: PanelController<A>,
    interval: Duration,
    stop: &AtomicBool,
) {
    let mut last = Instant::now();
    let mut frames: u64 = 0;
    while !stop.load(Ordering::Acquire) {
        let now = Instant::now();
        let dt = now.saturating_duration_since(last).min(MAX_FRAME_STEP);
        last = now;
        frames += 1;

        if controller.frame(dt).is_break() {
            break;
        }

        let spent = now.elapsed();
        if let Some(rest) = interval.checked_sub(spent) {
            thread::sleep(rest);
        }
    }
    trace!(frames, "animation thread exiting");
}
