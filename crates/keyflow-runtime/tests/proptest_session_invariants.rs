#![forbid(unsafe_code)]

//! Property-based invariant tests for [`KeyboardSession`].
//!
//! Arbitrary pointer streams and ticks are driven through a session wired
//! to recording collaborators. Verified:
//!
//! 1. Pulses equal activations: exactly one per activation, none otherwise
//! 2. Slides and holds never commit text and never pulse
//! 3. Each sink commit comes from an activation
//! 4. Caps-lock implies shift after every step
//! 5. The view sees balanced pressed / released notifications

use keyflow_runtime::recording::{RecordingHaptics, RecordingSink, RecordingView, ViewEvent};
use keyflow_runtime::{
    Dispatch, KeyIdentity, KeyboardMode, KeyboardSession, Point, PointerEvent,
};
use proptest::prelude::*;
use web_time::{Duration, Instant};

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Down(u8),
    Move(f32),
    Up,
    Cancel,
    Tick,
}

fn op_strategy() -> impl Strategy<Value = (Op, u64)> {
    let op = prop_oneof![
        2 => (0u8..8).prop_map(Op::Down),
        2 => (-30.0f32..30.0).prop_map(Op::Move),
        2 => Just(Op::Up),
        1 => Just(Op::Cancel),
        1 => Just(Op::Tick),
    ];
    (op, 0u64..700)
}

fn key_for(idx: u8) -> KeyIdentity {
    match idx {
        0 | 1 => KeyIdentity::Space,
        2 => KeyIdentity::char("e"),
        3 => KeyIdentity::char("."),
        4 => KeyIdentity::Shift,
        5 => KeyIdentity::Backspace,
        6 => KeyIdentity::ModeSwitch(KeyboardMode::Symbols),
        _ => KeyIdentity::emoji("🙂"),
    }
}

struct Run {
    dispatches: Vec<Dispatch>,
    sink: RecordingSink,
    haptics: RecordingHaptics,
    view: RecordingView,
    caps_without_shift: bool,
}

fn run(ops: &[(Op, u64)]) -> Run {
    let sink = RecordingSink::new();
    let haptics = RecordingHaptics::new();
    let view = RecordingView::new();
    let mut session = KeyboardSession::new(Box::new(haptics.clone()), Box::new(view.clone()));
    session.attach_sink(Box::new(sink.clone()));

    let mut now = Instant::now();
    let mut pos = Point::new(0.0, 0.0);
    let mut dispatches = Vec::new();
    let mut caps_without_shift = false;

    for (op, gap_ms) in ops {
        now += Duration::from_millis(*gap_ms);
        match op {
            Op::Down(k) => {
                pos = Point::new(100.0, 20.0);
                dispatches.extend(session.handle_pointer(&PointerEvent::Down {
                    key: key_for(*k),
                    pos,
                    time: now,
                }));
            }
            Op::Move(dx) => {
                pos = Point::new(pos.x + dx, pos.y);
                dispatches.extend(session.handle_pointer(&PointerEvent::Move { pos, time: now }));
            }
            Op::Up => dispatches.extend(session.handle_pointer(&PointerEvent::Up { pos, time: now })),
            Op::Cancel => {
                dispatches.extend(session.handle_pointer(&PointerEvent::Cancel { time: now }));
            }
            Op::Tick => dispatches.extend(session.tick(now)),
        }
        let shift = session.shift_state();
        caps_without_shift |= shift.is_caps_lock_mode() && !shift.is_shift_on();
    }

    Run {
        dispatches,
        sink,
        haptics,
        view,
        caps_without_shift,
    }
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn one_pulse_per_activation(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let r = run(&ops);
        let activations = r.dispatches.iter().filter(|d| d.activation.is_some()).count();
        prop_assert_eq!(r.haptics.pulses(), activations);
        for d in &r.dispatches {
            prop_assert_eq!(d.feedback_fired, d.activation.is_some());
        }
    }

    #[test]
    fn slides_and_holds_never_activate(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let r = run(&ops);
        for d in &r.dispatches {
            if d.gesture.is_slide() || d.gesture.is_hold() {
                prop_assert!(d.activation.is_none(), "{:?}", d.gesture);
                prop_assert!(!d.feedback_fired);
            }
        }
    }

    #[test]
    fn commits_never_exceed_activations(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let r = run(&ops);
        let activations = r.dispatches.iter().filter(|d| d.activation.is_some()).count();
        prop_assert!(r.sink.commit_count() <= activations);
    }

    #[test]
    fn caps_lock_implies_shift(ops in prop::collection::vec(op_strategy(), 0..60)) {
        prop_assert!(!run(&ops).caps_without_shift);
    }

    #[test]
    fn pressed_visuals_balance(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let r = run(&ops);
        let mut live = 0i32;
        for event in r.view.events() {
            if let ViewEvent::Pressed(_, pressed) = event {
                live += if pressed { 1 } else { -1 };
                prop_assert!((0..=1).contains(&live));
            }
        }
    }
}
