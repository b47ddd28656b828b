#![forbid(unsafe_code)]

//! The per-panel controller that runs on the animation/gesture thread.
//!
//! One [`PanelController`] backs one mounted panel. It is generic over the
//! [`ScrollAdapter`] of the panel's content, so plain scroll views, virtual
//! lists, and static content share every line of motion and snap logic.
//!
//! # Frame
//!
//! Each call to [`PanelController::frame`]:
//!
//! 1. drains every queued [`Command`] (expand/close/toggle, layout, touches),
//! 2. advances the in-flight animation by `dt`,
//! 3. forwards the resulting [`PanelEvent`]s to the UI thread.
//!
//! # Invariants
//!
//! 1. The arbiter and the animation driver never write the offset in the
//!    same frame step: a claim cancels the animation, and a command aborts
//!    the drag before it animates.
//! 2. `expand`/`close` are idempotent against the controller's phase: a
//!    request for the phase the panel is in, or already moving toward, does
//!    nothing and emits nothing.
//! 3. Commands that need geometry wait for the first measured layout.
//!
//! # Failure Modes
//!
//! - Invalid layouts (NaN, negative) are logged and ignored; the previous
//!   geometry stays in force.
//! - A disconnected command or event queue means the facade is gone. The
//!   controller winds down as if it had received [`Command::Shutdown`].

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::mpsc;

use sheetkit_core::animation::Easing;
use sheetkit_core::{
    GeometrySnapshot, GestureArbiter, GestureStep, Layout, MotionEvent, MotionMode, PanelConfig,
    PanelMotion, Phase, ScrollAdapter, SettleOutcome, SharedPanelState, TouchEvent, Tunables,
    geometry, snap,
};
use tracing::{debug, info_span, trace, warn};
use web_time::Duration;

use crate::command::{Command, ExpandTarget, PanelEvent};

/// Drives one panel: owns its motion state, gesture arbiter, and content
/// adapter.
pub struct PanelController<A: ScrollAdapter> {
    commands: mpsc::Receiver<Command>,
    events: mpsc::Sender<PanelEvent>,
    shared: Arc<SharedPanelState>,
    motion: PanelMotion,
    arbiter: GestureArbiter,
    adapter: A,
    config: PanelConfig,
    tunables: Tunables,
    layout: Option<Layout>,
    /// Expand requested before geometry was known.
    deferred: Option<ExpandTarget>,
    running: bool,
}

impl<A: ScrollAdapter> std::fmt::Debug for PanelController<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelController")
            .field("motion", &self.motion)
            .field("config", &self.config)
            .field("layout", &self.layout)
            .field("deferred", &self.deferred)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl<A: ScrollAdapter> PanelController<A> {
    pub(crate) fn new(
        commands: mpsc::Receiver<Command>,
        events: mpsc::Sender<PanelEvent>,
        shared: Arc<SharedPanelState>,
        adapter: A,
        config: PanelConfig,
        tunables: Tunables,
    ) -> Self {
        let motion = PanelMotion::new(Arc::clone(&shared));
        Self {
            commands,
            events,
            shared,
            motion,
            arbiter: GestureArbiter::new(),
            adapter,
            config,
            tunables,
            layout: None,
            deferred: None,
            running: true,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.motion.phase()
    }

    #[must_use]
    pub fn motion(&self) -> &PanelMotion {
        &self.motion
    }

    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    #[must_use]
    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    #[must_use]
    pub fn shared(&self) -> &Arc<SharedPanelState> {
        &self.shared
    }

    /// Whether the controller still accepts work.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one frame: drain commands, advance motion, emit events.
    ///
    /// Returns [`ControlFlow::Break`] once the controller has shut down.
    pub fn frame(&mut self, dt: Duration) -> ControlFlow<()> {
        if !self.running {
            return ControlFlow::Break(());
        }

        let mut batch = Vec::new();
        loop {
            match self.commands.try_recv() {
                Ok(cmd) => batch.push(cmd),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    debug!("command queue disconnected");
                    batch.push(Command::Shutdown);
                    break;
                }
            }
        }
        if !batch.is_empty() {
            let _span = info_span!("sheetkit.commands", count = batch.len()).entered();
            for cmd in batch {
                self.apply(cmd);
                if !self.running {
                    return ControlFlow::Break(());
                }
            }
        }

        let events = self.motion.tick(dt);
        self.emit(events);

        if self.running {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    }

    /// Apply one command immediately.
    pub fn apply(&mut self, cmd: Command) {
        trace!(?cmd, "command");
        match cmd {
            Command::Expand(target) => self.expand(target),
            Command::Close => self.close(None),
            Command::CloseThen(done) => self.close(Some(done)),
            Command::Toggle => self.toggle(),
            Command::Layout(layout) => self.set_layout(layout),
            Command::Touch(event) => self.touch(event),
            Command::Shutdown => self.shutdown(),
        }
    }

    /// Feed one touch event through the gesture arbiter.
    pub fn touch(&mut self, event: TouchEvent) {
        let step = self
            .arbiter
            .handle(event, &mut self.motion, &self.adapter, &self.tunables);
        match step {
            GestureStep::Idle | GestureStep::Tracked { .. } => {}
            GestureStep::Claimed(events) => self.emit(events),
            GestureStep::Released(drag) => {
                let Some(offsets) = self.motion.offsets() else {
                    return;
                };
                let (target, phase) =
                    snap::settle_plan(&drag, &offsets, self.tunables.velocity_threshold);
                debug!(target, ?phase, "release resolved");
                // A tap-sized drag returns without carrying the flick.
                let initial_velocity = if drag.release.crossed_threshold {
                    drag.release.velocity_y
                } else {
                    0.0
                };
                let mode = MotionMode::Spring {
                    stiffness: self.tunables.spring_stiffness,
                    damping: self.tunables.spring_damping,
                    initial_velocity,
                };
                let (_, events) = self.motion.animate_to(target, mode, phase, None);
                self.emit(events);
            }
        }
    }

    /// Install a new layout measurement.
    ///
    /// Zero-sized layouts are remembered but produce no geometry; the first
    /// measured layout resolves geometry and runs any deferred expand.
    pub fn set_layout(&mut self, layout: Layout) {
        if let Err(err) = layout.validate() {
            warn!(field = err.field(), %err, "layout rejected");
            return;
        }
        self.layout = Some(layout);
        let Some(offsets) = geometry::resolve(&self.config, &layout) else {
            trace!(height = layout.screen_height, "layout not measured; geometry deferred");
            return;
        };
        self.motion.set_offsets(offsets);
        self.shared.publish_geometry(GeometrySnapshot {
            offsets: Some(offsets),
            safe_area_bottom: layout.safe_area_bottom,
        });
        if let Some(target) = self.deferred.take() {
            debug!(?target, "running deferred expand");
            self.expand(target);
        }
    }

    fn expand(&mut self, target: ExpandTarget) {
        let Some(offsets) = self.motion.offsets() else {
            debug!(?target, "expand before geometry; deferred");
            self.deferred = Some(target);
            return;
        };
        let phase = self.motion.phase();
        if phase == target.resting_phase() || phase == target.animating_phase() {
            trace!(?phase, "expand is a no-op");
            return;
        }
        self.abort_drag();
        let to = match target {
            ExpandTarget::Default => offsets.open,
            ExpandTarget::Max => offsets.max,
        };
        let mode = MotionMode::Timed {
            duration: self.tunables.open_duration(),
            easing: Easing::EaseOut,
        };
        let (_, events) = self
            .motion
            .animate_to(to, mode, target.animating_phase(), None);
        self.emit(events);
    }

    fn close(&mut self, done: Option<mpsc::Sender<SettleOutcome>>) {
        self.deferred = None;
        let on_settle = done.map(|tx| {
            Box::new(move |outcome: SettleOutcome| {
                // The facade may have gone away; nothing left to notify.
                let _ = tx.send(outcome);
            }) as sheetkit_core::SettleCallback
        });

        match self.motion.phase() {
            Phase::Closed => {
                trace!("close is a no-op");
                if let Some(cb) = on_settle {
                    cb(SettleOutcome::Settled {
                        offset: self.motion.offset(),
                    });
                }
            }
            Phase::Closing => {
                trace!("close already in flight");
                if let Some(cb) = on_settle {
                    self.motion.attach_on_settle(cb);
                }
            }
            _ => {
                let Some(offsets) = self.motion.offsets() else {
                    return;
                };
                self.abort_drag();
                let mode = MotionMode::Timed {
                    duration: self.tunables.close_duration(),
                    easing: Easing::EaseOut,
                };
                let (_, events) =
                    self.motion
                        .animate_to(offsets.closed, mode, Phase::Closing, on_settle);
                self.emit(events);
            }
        }
    }

    fn toggle(&mut self) {
        let phase = self.motion.phase();
        let opening = matches!(
            phase,
            Phase::Open | Phase::Opening | Phase::Expanded | Phase::Expanding
        );
        if opening || self.deferred.is_some() {
            self.close(None);
        } else {
            self.expand(ExpandTarget::Default);
        }
    }

    fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.abort_drag();
        self.running = false;
        debug!(phase = ?self.motion.phase(), "controller shut down");
    }

    fn abort_drag(&mut self) {
        self.arbiter.abort(&mut self.motion, &self.adapter);
    }

    fn emit(&mut self, events: Vec<MotionEvent>) {
        for event in events {
            if self.events.send(event.into()).is_err() {
                debug!("event queue disconnected");
                self.running = false;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetkit_core::{NoContent, VirtualListAdapter};
    use web_time::Instant;

    const FRAME: Duration = Duration::from_millis(16);

    struct Harness<A: ScrollAdapter> {
        tx: mpsc::Sender<Command>,
        rx: mpsc::Receiver<PanelEvent>,
        ctl: PanelController<A>,
    }

    impl<A: ScrollAdapter> Harness<A> {
        fn new(adapter: A) -> Self {
            let (tx, commands) = mpsc::channel();
            let (events, rx) = mpsc::channel();
            let ctl = PanelController::new(
                commands,
                events,
                Arc::new(SharedPanelState::new()),
                adapter,
                PanelConfig::new(0.75, 1.0),
                Tunables::default(),
            );
            Self { tx, rx, ctl }
        }

        fn measured(adapter: A) -> Self {
            let mut h = Self::new(adapter);
            h.send(Command::Layout(Layout::new(800.0, 0.0)));
            h.frame();
            h
        }

        fn send(&self, cmd: Command) {
            self.tx.send(cmd).unwrap();
        }

        fn frame(&mut self) {
            let _ = self.ctl.frame(FRAME);
        }

        fn settle(&mut self) {
            for _ in 0..120 {
                self.frame();
            }
        }

        fn drain(&self) -> Vec<PanelEvent> {
            self.rx.try_iter().collect()
        }
    }

    #[test]
    fn expand_settles_open() {
        let mut h = Harness::measured(NoContent);
        h.send(Command::Expand(ExpandTarget::Default));
        h.settle();
        assert_eq!(h.ctl.phase(), Phase::Open);
        assert_eq!(h.ctl.shared().offset(), 200.0);
        let events = h.drain();
        assert!(events.contains(&PanelEvent::Settled {
            phase: Phase::Open,
            offset: 200.0
        }));
    }

    #[test]
    fn expand_twice_emits_once() {
        let mut h = Harness::measured(NoContent);
        h.send(Command::Expand(ExpandTarget::Default));
        h.frame();
        h.send(Command::Expand(ExpandTarget::Default));
        h.settle();
        h.send(Command::Expand(ExpandTarget::Default));
        h.settle();
        let opened = h
            .drain()
            .into_iter()
            .filter(|e| matches!(e, PanelEvent::PhaseChanged { to: Phase::Opening, .. }))
            .count();
        assert_eq!(opened, 1);
    }

    #[test]
    fn close_while_closed_does_nothing() {
        let mut h = Harness::measured(NoContent);
        h.send(Command::Close);
        h.settle();
        assert!(h.drain().is_empty());
        assert_eq!(h.ctl.phase(), Phase::Closed);
    }

    #[test]
    fn expand_before_layout_is_deferred() {
        let mut h = Harness::new(NoContent);
        h.send(Command::Expand(ExpandTarget::Max));
        h.frame();
        assert_eq!(h.ctl.phase(), Phase::Closed);
        h.send(Command::Layout(Layout::new(0.0, 0.0)));
        h.frame();
        assert_eq!(h.ctl.phase(), Phase::Closed);
        h.send(Command::Layout(Layout::new(800.0, 0.0)));
        h.frame();
        assert_eq!(h.ctl.phase(), Phase::Expanding);
        h.settle();
        assert_eq!(h.ctl.phase(), Phase::Expanded);
        assert_eq!(h.ctl.shared().offset(), 0.0);
    }

    #[test]
    fn toggle_flips_between_open_and_closed() {
        let mut h = Harness::measured(NoContent);
        h.send(Command::Toggle);
        h.settle();
        assert_eq!(h.ctl.phase(), Phase::Open);
        h.send(Command::Toggle);
        h.settle();
        assert_eq!(h.ctl.phase(), Phase::Closed);
        assert_eq!(h.ctl.shared().offset(), 800.0);
    }

    #[test]
    fn toggle_while_opening_closes() {
        let mut h = Harness::measured(NoContent);
        h.send(Command::Expand(ExpandTarget::Default));
        h.frame();
        h.send(Command::Toggle);
        h.frame();
        assert_eq!(h.ctl.phase(), Phase::Closing);
    }

    #[test]
    fn close_then_reports_settle() {
        let mut h = Harness::measured(NoContent);
        h.send(Command::Expand(ExpandTarget::Default));
        h.settle();
        let (tx, rx) = mpsc::channel();
        h.send(Command::CloseThen(tx));
        h.frame();
        assert!(rx.try_recv().is_err());
        h.settle();
        assert_eq!(rx.try_recv(), Ok(SettleOutcome::Settled { offset: 800.0 }));
    }

    #[test]
    fn close_then_reports_cancel_when_reopened() {
        let mut h = Harness::measured(NoContent);
        h.send(Command::Expand(ExpandTarget::Default));
        h.settle();
        let (tx, rx) = mpsc::channel();
        h.send(Command::CloseThen(tx));
        h.frame();
        h.send(Command::Expand(ExpandTarget::Default));
        h.frame();
        assert!(matches!(rx.try_recv(), Ok(SettleOutcome::Cancelled { .. })));
    }

    #[test]
    fn rotation_while_open_retargets_without_closing() {
        let mut h = Harness::measured(NoContent);
        h.send(Command::Expand(ExpandTarget::Default));
        h.settle();
        h.drain();
        h.send(Command::Layout(Layout::new(400.0, 0.0)));
        h.frame();
        assert_eq!(h.ctl.phase(), Phase::Open);
        assert_eq!(h.ctl.shared().offset(), 100.0);
        assert!(h.drain().is_empty());
    }

    #[test]
    fn invalid_layout_keeps_geometry() {
        let mut h = Harness::measured(NoContent);
        h.send(Command::Layout(Layout::new(f64::NAN, 0.0)));
        h.frame();
        let offsets = h.ctl.motion().offsets().unwrap();
        assert_eq!(offsets.closed, 800.0);
    }

    #[test]
    fn drag_release_snaps_with_spring() {
        let mut h = Harness::measured(NoContent);
        h.send(Command::Expand(ExpandTarget::Default));
        h.settle();
        let t0 = Instant::now();
        let at = |ms: u64| t0 + Duration::from_millis(ms);
        h.ctl.touch(TouchEvent::Down { y: 300.0, at: at(0) });
        h.ctl.touch(TouchEvent::Move { y: 301.0, at: at(16) });
        h.ctl.touch(TouchEvent::Move { y: 700.0, at: at(32) });
        assert_eq!(h.ctl.phase(), Phase::Dragging);
        h.ctl.touch(TouchEvent::Up {
            y: 700.0,
            at: at(48),
            velocity_y: Some(900.0),
        });
        assert_eq!(h.ctl.phase(), Phase::Closing);
        h.settle();
        assert_eq!(h.ctl.phase(), Phase::Closed);
        assert_eq!(h.ctl.shared().offset(), 800.0);
    }

    #[test]
    fn command_during_drag_aborts_it() {
        let adapter = VirtualListAdapter::new();
        let content = adapter.content_handle();
        let mut h = Harness::measured(adapter);
        h.send(Command::Expand(ExpandTarget::Default));
        h.settle();
        let t0 = Instant::now();
        h.ctl.touch(TouchEvent::Down { y: 300.0, at: t0 });
        h.ctl.touch(TouchEvent::Move {
            y: 340.0,
            at: t0 + FRAME,
        });
        assert_eq!(h.ctl.phase(), Phase::Dragging);
        assert!(!content.gesture_enabled());

        h.send(Command::Expand(ExpandTarget::Max));
        h.frame();
        assert_eq!(h.ctl.phase(), Phase::Expanding);
        assert!(content.gesture_enabled());
        assert!(!h.ctl.shared().is_dragging());

        // The rest of the aborted sequence is ignored.
        h.ctl.touch(TouchEvent::Move {
            y: 600.0,
            at: t0 + FRAME * 3,
        });
        assert_eq!(h.ctl.phase(), Phase::Expanding);
    }

    #[test]
    fn shutdown_breaks_the_frame_loop() {
        let mut h = Harness::measured(NoContent);
        h.send(Command::Shutdown);
        assert_eq!(h.ctl.frame(FRAME), ControlFlow::Break(()));
        assert!(!h.ctl.is_running());
    }

    #[test]
    fn dropped_sender_shuts_down() {
        let Harness { tx, rx: _rx, mut ctl } = Harness::new(NoContent);
        drop(tx);
        assert_eq!(ctl.frame(FRAME), ControlFlow::Break(()));
    }
}
