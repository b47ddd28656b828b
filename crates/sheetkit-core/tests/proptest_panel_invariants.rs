//! Property-based tests for the panel motion, arbitration, and snap rules.
//!
//! 1. **Offset range**: across any interleaving of touches, animations,
//!    ticks, and geometry changes, the published offset stays inside
//!    `[max, closed]`.
//! 2. **No-op drags**: a drag that never strays past the minimal movement
//!    guard from its touch-down point settles back into the phase it
//!    started from.
//! 3. **Flick rules**: a release faster than the velocity threshold goes to
//!    `max` (upward) or `closed` (downward) from any end position.
//! 4. **Content scroll wins**: while the content is scrolled away from its
//!    top, no drag moves the panel.
//! 5. **Geometry ordering**: resolved offsets are always ordered.

use std::sync::Arc;

use proptest::prelude::*;
use sheetkit_core::animation::Easing;
use sheetkit_core::snap::{self, Release};
use sheetkit_core::{
    GestureArbiter, GestureStep, Layout, MotionMode, NoContent, PanelConfig, PanelMotion, Phase,
    ResolvedOffsets, ScrollAdapter, ScrollViewAdapter, SharedPanelState, TouchEvent, Tunables,
    VirtualListAdapter, geometry,
};
use web_time::{Duration, Instant};

const FRAME: Duration = Duration::from_millis(16);

fn reference_offsets() -> ResolvedOffsets {
    geometry::resolve(&PanelConfig::new(0.7, 1.0), &Layout::new(800.0, 0.0)).unwrap()
}

fn settled_motion(offsets: ResolvedOffsets, phase: Phase) -> (PanelMotion, Arc<SharedPanelState>) {
    let shared = Arc::new(SharedPanelState::new());
    let mut motion = PanelMotion::new(Arc::clone(&shared));
    motion.set_offsets(offsets);
    if phase != Phase::Closed {
        let (target, animating) = match phase {
            Phase::Expanded => (offsets.max, Phase::Expanding),
            _ => (offsets.open, Phase::Opening),
        };
        let instant = MotionMode::Timed {
            duration: Duration::ZERO,
            easing: Easing::Linear,
        };
        motion.animate_to(target, instant, animating, None);
        motion.tick(FRAME);
    }
    assert_eq!(motion.phase(), phase);
    (motion, shared)
}

/// Apply a release the way the controller does.
fn release(motion: &mut PanelMotion, step: GestureStep, tunables: &Tunables) {
    if let GestureStep::Released(drag) = step {
        let offsets = motion.offsets().unwrap();
        let (target, phase) = snap::settle_plan(&drag, &offsets, tunables.velocity_threshold);
        let mode = MotionMode::Spring {
            stiffness: tunables.spring_stiffness,
            damping: tunables.spring_damping,
            initial_velocity: if drag.release.crossed_threshold {
                drag.release.velocity_y
            } else {
                0.0
            },
        };
        motion.animate_to(target, mode, phase, None);
    }
}

fn settle(motion: &mut PanelMotion) {
    for _ in 0..400 {
        motion.tick(FRAME);
        if !motion.phase().is_animating() {
            return;
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    Down(f64),
    Move(f64),
    Up(f64, Option<f64>),
    Cancel,
    Animate(f64, bool),
    Tick(u64),
    Rotate(f64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.0..1200.0f64).prop_map(Op::Down),
        (-600.0..1600.0f64).prop_map(Op::Move),
        (0.0..1200.0f64, proptest::option::of(-5000.0..5000.0f64))
            .prop_map(|(y, v)| Op::Up(y, v)),
        Just(Op::Cancel),
        (-200.0..1200.0f64, any::<bool>()).prop_map(|(t, s)| Op::Animate(t, s)),
        (1u64..80).prop_map(Op::Tick),
        (200.0..1400.0f64).prop_map(Op::Rotate),
    ]
}

proptest! {
    #[test]
    fn offset_stays_in_range(ops in proptest::collection::vec(op_strategy(), 1..80)) {
        let config = PanelConfig::new(0.6, 0.95);
        let tunables = Tunables::default().with_rim_drag(true);
        let mut offsets = geometry::resolve(&config, &Layout::new(800.0, 0.0)).unwrap();
        let (mut motion, shared) = settled_motion(offsets, Phase::Open);
        let mut arbiter = GestureArbiter::new();
        let t0 = Instant::now();
        let mut t = Duration::ZERO;

        for op in ops {
            t += FRAME;
            let at = t0 + t;
            match op {
                Op::Down(y) => {
                    let step = arbiter.handle(TouchEvent::Down { y, at }, &mut motion, &NoContent, &tunables);
                    release(&mut motion, step, &tunables);
                }
                Op::Move(y) => {
                    arbiter.handle(TouchEvent::Move { y, at }, &mut motion, &NoContent, &tunables);
                }
                Op::Up(y, velocity_y) => {
                    let step = arbiter.handle(TouchEvent::Up { y, at, velocity_y }, &mut motion, &NoContent, &tunables);
                    release(&mut motion, step, &tunables);
                }
                Op::Cancel => {
                    let step = arbiter.handle(TouchEvent::Cancel { at }, &mut motion, &NoContent, &tunables);
                    release(&mut motion, step, &tunables);
                }
                Op::Animate(target, spring) => {
                    if !arbiter.panel_owns() {
                        let mode = if spring {
                            MotionMode::Spring { stiffness: 300.0, damping: 8.0, initial_velocity: -3000.0 }
                        } else {
                            MotionMode::Timed { duration: Duration::from_millis(250), easing: Easing::EaseInOut }
                        };
                        let phase = snap::phase_toward(offsets.clamp(target), &offsets);
                        motion.animate_to(target, mode, phase, None);
                    }
                }
                Op::Tick(ms) => {
                    motion.tick(Duration::from_millis(ms));
                }
                Op::Rotate(height) => {
                    offsets = geometry::resolve(&config, &Layout::new(height, 0.0)).unwrap();
                    motion.set_offsets(offsets);
                }
            }
            let o = shared.offset();
            prop_assert!(
                o >= offsets.max && o <= offsets.closed,
                "offset {} outside [{}, {}]", o, offsets.max, offsets.closed
            );
            prop_assert_eq!(o, motion.offset());
        }
    }

    #[test]
    fn small_drags_are_no_ops(
        expanded in any::<bool>(),
        first in prop_oneof![-9.9..-0.5f64, 0.5..9.9f64],
        wiggle in proptest::collection::vec(-9.9..9.9f64, 0..12),
        velocity in -5000.0..5000.0f64,
    ) {
        let start = if expanded { Phase::Expanded } else { Phase::Open };
        let tunables = Tunables::default();
        let (mut motion, _) = settled_motion(reference_offsets(), start);
        let mut arbiter = GestureArbiter::new();
        let t0 = Instant::now();
        let mut t = Duration::ZERO;
        let mut at = || { t += FRAME; t0 + t };

        let y0 = 400.0;
        arbiter.handle(TouchEvent::Down { y: y0, at: at() }, &mut motion, &NoContent, &tunables);
        let claim_y = y0 + first;
        arbiter.handle(TouchEvent::Move { y: claim_y, at: at() }, &mut motion, &NoContent, &tunables);
        prop_assert_eq!(motion.phase(), Phase::Dragging);
        let mut last = claim_y;
        for d in wiggle {
            last = y0 + d;
            arbiter.handle(TouchEvent::Move { y: last, at: at() }, &mut motion, &NoContent, &tunables);
        }
        let step = arbiter.handle(
            TouchEvent::Up { y: last, at: at(), velocity_y: Some(velocity) },
            &mut motion,
            &NoContent,
            &tunables,
        );
        release(&mut motion, step, &tunables);
        settle(&mut motion);
        prop_assert_eq!(motion.phase(), start);
    }

    #[test]
    fn fast_upward_release_expands(end in 0.0..=800.0f64, speed in 250.0..20_000.0f64) {
        let o = reference_offsets();
        let r = Release { start_offset: o.open, end_offset: end, velocity_y: -speed, crossed_threshold: true };
        prop_assert_eq!(snap::resolve(&r, &o, 200.0), o.max);
    }

    #[test]
    fn fast_downward_release_closes(end in 0.0..=800.0f64, speed in 250.0..20_000.0f64) {
        let o = reference_offsets();
        let r = Release { start_offset: o.open, end_offset: end, velocity_y: speed, crossed_threshold: true };
        prop_assert_eq!(snap::resolve(&r, &o, 200.0), o.closed);
    }

    #[test]
    fn resolved_target_is_a_reachable_offset(
        start in 0.0..=800.0f64,
        end in -400.0..1400.0f64,
        velocity in -3000.0..3000.0f64,
        crossed in any::<bool>(),
    ) {
        let o = reference_offsets();
        let r = Release { start_offset: start, end_offset: end, velocity_y: velocity, crossed_threshold: crossed };
        let target = snap::resolve(&r, &o, 200.0);
        prop_assert!(o.contains(target));
        if crossed {
            prop_assert!(target == o.max || target == o.open || target == o.closed);
        }
    }

    #[test]
    fn scrolled_content_keeps_panel_still(
        gated in any::<bool>(),
        scroll in 0.5..2000.0f64,
        moves in proptest::collection::vec(-800.0..800.0f64, 1..20),
    ) {
        let virtual_list = VirtualListAdapter::new();
        let scroll_view = ScrollViewAdapter::new();
        let adapter: &dyn ScrollAdapter = if gated { &virtual_list } else { &scroll_view };
        virtual_list.content_handle().on_scroll(scroll);
        scroll_view.content_handle().on_scroll(scroll);

        let tunables = Tunables::default();
        let (mut motion, shared) = settled_motion(reference_offsets(), Phase::Open);
        let before = shared.offset();
        let mut arbiter = GestureArbiter::new();
        let t0 = Instant::now();
        arbiter.handle(TouchEvent::Down { y: 400.0, at: t0 }, &mut motion, adapter, &tunables);
        for (i, dy) in moves.iter().enumerate() {
            let at = t0 + FRAME * (i as u32 + 1);
            let step = arbiter.handle(TouchEvent::Move { y: 400.0 + dy, at }, &mut motion, adapter, &tunables);
            prop_assert_eq!(step, GestureStep::Idle);
            prop_assert_eq!(shared.offset(), before);
        }
        prop_assert_eq!(motion.phase(), Phase::Open);
    }

    #[test]
    fn geometry_is_ordered(
        height in 1.0..4000.0f64,
        open in 0.01..=1.0f64,
        extra in 0.0..=1.0f64,
    ) {
        let max = (open + (1.0 - open) * extra).min(1.0);
        let config = PanelConfig::new(open, max);
        prop_assert!(config.validate().is_ok());
        let o = geometry::resolve(&config, &Layout::new(height, 0.0)).unwrap();
        prop_assert!(o.max <= o.open && o.open <= o.closed);
        prop_assert_eq!(o.closed, height);
    }
}

#[test]
fn reference_geometry_and_slow_release() {
    let o = reference_offsets();
    assert_eq!(o.closed, 800.0);
    assert_eq!(o.max, 0.0);
    assert!((o.open - 240.0).abs() < 1e-9);
    let r = Release {
        start_offset: o.open,
        end_offset: 200.0,
        velocity_y: 0.0,
        crossed_threshold: true,
    };
    assert_eq!(snap::resolve(&r, &o, 200.0), o.open);
}
