//! The arbiter and motion state report claims, releases, and settles as
//! `tracing` events.

use std::sync::{Arc, Mutex};

use sheetkit_core::animation::Easing;
use sheetkit_core::{
    GestureArbiter, MotionMode, NoContent, PanelMotion, Phase, ResolvedOffsets, SharedPanelState,
    TouchEvent, Tunables,
};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use web_time::{Duration, Instant};

#[derive(Clone, Default)]
struct Messages(Arc<Mutex<Vec<String>>>);

impl Messages {
    fn contains(&self, needle: &str) -> bool {
        self.0.lock().unwrap().iter().any(|m| m == needle)
    }
}

struct MessageVisitor(Option<String>);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for Messages {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.0.lock().unwrap().push(message);
        }
    }
}

#[test]
fn drag_lifecycle_is_traced() {
    let messages = Messages::default();
    let subscriber = tracing_subscriber::registry().with(messages.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mut motion = PanelMotion::new(Arc::new(SharedPanelState::new()));
        motion.set_offsets(ResolvedOffsets {
            closed: 800.0,
            open: 240.0,
            max: 0.0,
        });
        let mode = MotionMode::Timed {
            duration: Duration::from_millis(100),
            easing: Easing::EaseOut,
        };
        motion.animate_to(240.0, mode, Phase::Opening, None);
        for _ in 0..10 {
            motion.tick(Duration::from_millis(16));
        }

        let tunables = Tunables::default();
        let mut arbiter = GestureArbiter::new();
        let t0 = Instant::now();
        let ms = |n: u64| t0 + Duration::from_millis(n);
        arbiter.handle(TouchEvent::Down { y: 300.0, at: ms(0) }, &mut motion, &NoContent, &tunables);
        arbiter.handle(TouchEvent::Move { y: 320.0, at: ms(16) }, &mut motion, &NoContent, &tunables);
        arbiter.handle(TouchEvent::Move { y: 380.0, at: ms(32) }, &mut motion, &NoContent, &tunables);
        arbiter.handle(
            TouchEvent::Up {
                y: 380.0,
                at: ms(48),
                velocity_y: None,
            },
            &mut motion,
            &NoContent,
            &tunables,
        );
    });

    assert!(messages.contains("geometry applied"));
    assert!(messages.contains("settled"));
    assert!(messages.contains("panel claimed gesture"));
    assert!(messages.contains("panel released"));
}
