#![forbid(unsafe_code)]

//! The UI-thread face of a mounted panel.
//!
//! [`Panel`] is what a screen holds: imperative `expand`/`close`/`toggle`,
//! an observable `is_open`, phase callbacks, and back-navigation
//! interception. It never touches motion state directly. Requests go out on
//! the command queue, results come back as [`PanelEvent`]s that
//! [`Panel::pump`] delivers, and the offset is read from shared cells.
//!
//! # Invariants
//!
//! 1. `is_open` flips only when an animation settles, never when one starts.
//! 2. Phase callbacks run on the thread calling `pump`, once per delivered
//!    transition, after the offset cell already holds the settled value.
//! 3. While a back navigation is pending, further back presses are
//!    swallowed.
//!
//! # Failure Modes
//!
//! - Requests after the controller has shut down are logged and dropped.
//! - A pending back navigation whose close is cancelled (the user dragged the
//!   panel back open, or `expand` was called) is discarded, not replayed.

use std::sync::Arc;
use std::sync::mpsc;

use sheetkit_core::{
    Backdrop, Layout, PanelConfig, Phase, ScrollAdapter, SettleOutcome, SharedPanelState,
    TouchEvent, Tunables,
};
use tracing::{debug, trace, warn};

use crate::command::{Command, ExpandTarget, PanelEvent};
use crate::controller::PanelController;
use crate::error::Result;
use crate::observable::{Observable, Subscription};

/// A back navigation held until the panel finishes closing.
struct PendingNavigation {
    outcome: mpsc::Receiver<SettleOutcome>,
    navigate: Box<dyn FnOnce()>,
}

/// Host-facing handle for one mounted panel.
pub struct Panel {
    commands: mpsc::Sender<Command>,
    events: mpsc::Receiver<PanelEvent>,
    shared: Arc<SharedPanelState>,
    tunables: Tunables,
    is_open: Observable<bool>,
    phase: Observable<Phase>,
    pending_back: Option<PendingNavigation>,
}

impl std::fmt::Debug for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Panel")
            .field("is_open", &self.is_open.get())
            .field("phase", &self.phase.get())
            .field("offset", &self.shared.offset())
            .field("pending_back", &self.pending_back.is_some())
            .finish_non_exhaustive()
    }
}

impl Panel {
    /// Validate the configuration and create a panel with its controller.
    ///
    /// The controller belongs on the animation thread: hand it to
    /// [`AnimationThread::start`](crate::AnimationThread::start) or drive its
    /// `frame` from the host's own display-link callback. When `layout` is
    /// given it is applied before the controller is returned.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Config`](crate::PanelError::Config) when the
    /// config, tunables, or initial layout violate their invariants.
    pub fn mount<A: ScrollAdapter>(
        config: PanelConfig,
        tunables: Tunables,
        adapter: A,
        layout: Option<Layout>,
    ) -> Result<(Self, PanelController<A>)> {
        config.validate().inspect_err(|err| {
            warn!(field = err.field(), %err, "panel config rejected");
        })?;
        tunables.validate().inspect_err(|err| {
            warn!(field = err.field(), %err, "panel tunables rejected");
        })?;
        if let Some(layout) = &layout {
            layout.validate()?;
        }

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        let shared = Arc::new(SharedPanelState::new());
        let mut controller = PanelController::new(
            cmd_rx,
            evt_tx,
            Arc::clone(&shared),
            adapter,
            config,
            tunables.clone(),
        );
        if let Some(layout) = layout {
            controller.set_layout(layout);
        }
        debug!(
            open_fraction = config.open_fraction,
            max_expansion_fraction = config.max_expansion_fraction,
            "panel mounted"
        );

        let panel = Self {
            commands: cmd_tx,
            events: evt_rx,
            shared,
            tunables,
            is_open: Observable::new(false),
            phase: Observable::new(Phase::Closed),
            pending_back: None,
        };
        Ok((panel, controller))
    }

    /// Animate to the open (or max) snap point. No-op when already there or
    /// on the way.
    pub fn expand(&self, target: ExpandTarget) {
        self.send(Command::Expand(target));
    }

    /// Animate to the closed snap point. No-op when closed or closing.
    pub fn close(&self) {
        self.send(Command::Close);
    }

    /// Close when open or opening, expand otherwise.
    pub fn toggle(&self) {
        self.send(Command::Toggle);
    }

    /// Forward a layout measurement (first paint, rotation).
    pub fn set_layout(&self, layout: Layout) {
        self.send(Command::Layout(layout));
    }

    /// Forward a touch event for hosts that receive touches on the UI thread.
    pub fn touch(&self, event: TouchEvent) {
        self.send(Command::Touch(event));
    }

    /// Whether the panel last settled open or expanded.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open.get()
    }

    /// Observable behind [`Panel::is_open`].
    #[must_use]
    pub fn open_state(&self) -> &Observable<bool> {
        &self.is_open
    }

    /// Last phase delivered by [`Panel::pump`].
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// Run `callback` with each delivered phase.
    pub fn on_phase_change(&self, callback: impl Fn(&Phase) + 'static) -> Subscription {
        self.phase.subscribe(callback)
    }

    /// Whether the overlay should be in the view tree.
    ///
    /// Mounted from the first delivered non-closed phase until the close
    /// settles.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.phase.get().is_visible()
    }

    /// Latest clamped panel offset, readable every frame.
    ///
    /// [`UNMEASURED_OFFSET`](sheetkit_core::UNMEASURED_OFFSET) (off-screen)
    /// until the first measured layout.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.shared.offset()
    }

    /// Backdrop for the current offset; hidden until geometry is known.
    #[must_use]
    pub fn backdrop(&self) -> Backdrop {
        match self.shared.geometry().offsets {
            Some(offsets) => Backdrop::at(
                self.shared.offset(),
                &offsets,
                self.tunables.max_backdrop_opacity,
            ),
            None => Backdrop::HIDDEN,
        }
    }

    /// Height of the content slot at the current offset.
    #[must_use]
    pub fn content_height(&self) -> Option<f64> {
        let geometry = self.shared.geometry();
        geometry
            .offsets
            .map(|o| o.content_height(self.shared.offset(), geometry.safe_area_bottom))
    }

    /// Whether a back navigation is waiting on a close.
    #[must_use]
    pub fn has_pending_back(&self) -> bool {
        self.pending_back.is_some()
    }

    /// Route a platform back action through the panel.
    ///
    /// When the panel is visible the navigation is suppressed, the panel
    /// closes, and `navigate` runs from [`Panel::pump`] once the close
    /// settles. Otherwise `navigate` runs now. Returns whether the navigation
    /// was intercepted.
    pub fn intercept_back(&mut self, navigate: impl FnOnce() + 'static) -> bool {
        if self.pending_back.is_some() {
            trace!("back pressed while a navigation is pending; ignored");
            return true;
        }
        if !self.shared.phase().is_visible() {
            navigate();
            return false;
        }
        let (tx, rx) = mpsc::channel();
        if !self.send(Command::CloseThen(tx)) {
            navigate();
            return false;
        }
        debug!("back navigation deferred until close settles");
        self.pending_back = Some(PendingNavigation {
            outcome: rx,
            navigate: Box::new(navigate),
        });
        true
    }

    /// Deliver controller events on this thread.
    ///
    /// Updates the phase and `is_open` observables, runs their callbacks, then
    /// replays a pending back navigation whose close has settled. Returns the
    /// number of events delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.events.try_recv() {
            delivered += 1;
            match event {
                PanelEvent::PhaseChanged { to, .. } => self.phase.set(to),
                PanelEvent::Settled { phase, .. } => self.is_open.set(phase.is_open()),
                PanelEvent::Cancelled { phase } => trace!(?phase, "animation cancelled"),
            }
        }
        self.resolve_pending_back();
        delivered
    }

    fn resolve_pending_back(&mut self) {
        let Some(pending) = self.pending_back.take() else {
            return;
        };
        match pending.outcome.try_recv() {
            Ok(SettleOutcome::Settled { .. }) => {
                debug!("close settled; replaying back navigation");
                (pending.navigate)();
            }
            Ok(SettleOutcome::Cancelled { .. }) => {
                warn!("close cancelled; back navigation dropped");
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                warn!("controller gone; back navigation dropped");
            }
            Err(mpsc::TryRecvError::Empty) => self.pending_back = Some(pending),
        }
    }

    fn send(&self, cmd: Command) -> bool {
        match self.commands.send(cmd) {
            Ok(()) => true,
            Err(mpsc::SendError(cmd)) => {
                warn!(?cmd, "panel controller has shut down; request dropped");
                false
            }
        }
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}
