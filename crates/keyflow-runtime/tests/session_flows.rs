#![forbid(unsafe_code)]

//! End-to-end typing flows through [`KeyboardSession`].
//!
//! Each test drives raw pointer events and timer ticks through a session
//! wired to recording collaborators, then checks the resulting text, haptic
//! pulses, and view notifications.
//!
//! Run:
//!   cargo test -p keyflow-runtime --test session_flows

use keyflow_runtime::recording::{
    RecordingHaptics, RecordingSink, RecordingView, SinkOp, ViewEvent,
};
use keyflow_runtime::{
    Activation, Dispatch, EditSettings, Gesture, KeyIdentity, KeyboardMode, KeyboardSession,
    Point, PointerEvent, ShiftState, TextSink,
};
use web_time::{Duration, Instant};

// ============================================================================
// Harness
// ============================================================================

const TAP_HOLD: Duration = Duration::from_millis(30);

struct Harness {
    session: KeyboardSession,
    sink: RecordingSink,
    haptics: RecordingHaptics,
    view: RecordingView,
    base: Instant,
    pos: Point,
}

impl Harness {
    fn new() -> Self {
        let sink = RecordingSink::new();
        let haptics = RecordingHaptics::new();
        let view = RecordingView::new();
        let mut session = KeyboardSession::new(Box::new(haptics.clone()), Box::new(view.clone()));
        session.attach_sink(Box::new(sink.clone()));
        Self {
            session,
            sink,
            haptics,
            view,
            base: Instant::now(),
            pos: Point::new(40.0, 20.0),
        }
    }

    fn at(&self, ms: u64) -> Instant {
        self.base + Duration::from_millis(ms)
    }

    fn down(&mut self, key: KeyIdentity, ms: u64) -> Vec<Dispatch> {
        self.pos = Point::new(40.0, 20.0);
        let time = self.at(ms);
        self.session.handle_pointer(&PointerEvent::Down {
            key,
            pos: self.pos,
            time,
        })
    }

    fn move_by(&mut self, dx: f32, ms: u64) -> Vec<Dispatch> {
        self.pos = Point::new(self.pos.x + dx, self.pos.y);
        let time = self.at(ms);
        self.session
            .handle_pointer(&PointerEvent::Move { pos: self.pos, time })
    }

    fn up(&mut self, ms: u64) -> Vec<Dispatch> {
        let time = self.at(ms);
        self.session
            .handle_pointer(&PointerEvent::Up { pos: self.pos, time })
    }

    fn cancel(&mut self, ms: u64) -> Vec<Dispatch> {
        let time = self.at(ms);
        self.session.handle_pointer(&PointerEvent::Cancel { time })
    }

    fn tick(&mut self, ms: u64) -> Option<Dispatch> {
        let now = self.at(ms);
        self.session.tick(now)
    }

    /// Press at `ms`, release 30ms later.
    fn tap(&mut self, key: KeyIdentity, ms: u64) -> Vec<Dispatch> {
        let mut out = self.down(key, ms);
        out.extend(self.up(ms + TAP_HOLD.as_millis() as u64));
        out
    }

    fn type_str(&mut self, text: &str, start_ms: u64) -> u64 {
        let mut ms = start_ms;
        for ch in text.chars() {
            let key = if ch == ' ' {
                KeyIdentity::Space
            } else {
                KeyIdentity::char(ch.to_string())
            };
            self.tap(key, ms);
            ms += 1_000;
        }
        ms
    }
}

fn activations(dispatches: &[Dispatch]) -> Vec<Activation> {
    dispatches.iter().filter_map(|d| d.activation).collect()
}

// ============================================================================
// Double-tap space
// ============================================================================

#[test]
fn double_space_becomes_period() {
    let mut h = Harness::new();
    h.type_str("hi", 0);

    h.tap(KeyIdentity::Space, 5_000);
    h.tap(KeyIdentity::Space, 5_100);

    assert_eq!(h.sink.text(), "hi. ");
    assert_eq!(h.session.shift_state(), ShiftState::ONE_SHOT);
    assert_eq!(h.haptics.pulses(), 4);
}

#[test]
fn third_rapid_space_starts_a_new_pair() {
    let mut h = Harness::new();
    h.tap(KeyIdentity::char("a"), 0);

    h.tap(KeyIdentity::Space, 1_000);
    h.tap(KeyIdentity::Space, 1_100);
    h.tap(KeyIdentity::Space, 1_200);

    assert_eq!(h.sink.text(), "a.  ");
}

#[test]
fn spaces_at_the_window_edge_stay_single() {
    let mut h = Harness::new();
    h.tap(KeyIdentity::Space, 0);
    h.tap(KeyIdentity::Space, 300);
    assert_eq!(h.sink.text(), "  ");
}

#[test]
fn intervening_letter_breaks_the_pair() {
    let mut h = Harness::new();
    h.tap(KeyIdentity::Space, 0);
    h.tap(KeyIdentity::char("a"), 100);
    h.tap(KeyIdentity::Space, 200);

    assert_eq!(h.sink.text(), " a ");
}

#[test]
fn double_space_period_can_be_turned_off() {
    let mut h = Harness::new();
    h.session.set_settings(EditSettings {
        double_space_period: false,
        ..EditSettings::default()
    });
    h.tap(KeyIdentity::Space, 0);
    h.tap(KeyIdentity::Space, 100);
    assert_eq!(h.sink.text(), "  ");
}

// ============================================================================
// Shift
// ============================================================================

#[test]
fn one_shot_shift_capitalizes_one_letter() {
    let mut h = Harness::new();
    h.tap(KeyIdentity::Shift, 0);
    h.type_str("ab", 1_000);

    assert_eq!(h.sink.text(), "Ab");
    assert_eq!(h.session.shift_state(), ShiftState::OFF);
}

#[test]
fn caps_lock_persists_until_toggled_off() {
    let mut h = Harness::new();
    h.tap(KeyIdentity::Shift, 0);
    h.tap(KeyIdentity::Shift, 100);
    assert_eq!(h.session.shift_state(), ShiftState::CAPS_LOCK);

    let next = h.type_str("ok", 1_000);
    assert_eq!(h.sink.text(), "OK");
    assert!(h.session.shift_state().is_caps_lock_mode());

    h.tap(KeyIdentity::Shift, next);
    assert_eq!(h.session.shift_state(), ShiftState::OFF);
    assert_eq!(
        h.view
            .events()
            .iter()
            .filter(|e| matches!(e, ViewEvent::ShiftChanged(_)))
            .count(),
        3
    );
}

#[test]
fn slow_second_shift_tap_turns_shift_off() {
    let mut h = Harness::new();
    h.tap(KeyIdentity::Shift, 0);
    h.tap(KeyIdentity::Shift, 2_000);
    assert_eq!(h.session.shift_state(), ShiftState::OFF);

    // Outside the 250ms shift window, though inside the spacebar's.
    h.tap(KeyIdentity::Shift, 3_000);
    h.tap(KeyIdentity::Shift, 3_280);
    assert_eq!(h.session.shift_state(), ShiftState::OFF);

    h.tap(KeyIdentity::char("a"), 4_000);
    assert_eq!(h.sink.text(), "a");
}

#[test]
fn quick_second_shift_tap_locks_caps() {
    let mut h = Harness::new();
    h.tap(KeyIdentity::Shift, 0);
    h.tap(KeyIdentity::Shift, 200);
    assert_eq!(h.session.shift_state(), ShiftState::CAPS_LOCK);

    // A quick third tap leaves caps-lock rather than pairing again.
    h.tap(KeyIdentity::Shift, 300);
    assert_eq!(h.session.shift_state(), ShiftState::OFF);
}

#[test]
fn shift_is_spent_by_punctuation_digits_and_emoji() {
    let mut h = Harness::new();
    h.tap(KeyIdentity::Shift, 0);
    h.type_str(",a", 1_000);
    assert_eq!(h.sink.text(), ",a");

    h.tap(KeyIdentity::Shift, 5_000);
    h.type_str("7a", 6_000);
    assert_eq!(h.sink.text(), ",a7a");

    h.tap(KeyIdentity::Shift, 10_000);
    h.tap(KeyIdentity::emoji("🙂"), 11_000);
    h.tap(KeyIdentity::char("a"), 12_000);
    assert_eq!(h.sink.text(), ",a7a🙂a");
    assert_eq!(h.session.shift_state(), ShiftState::OFF);
}

#[test]
fn unused_shift_resets_on_tick() {
    let mut h = Harness::new();
    h.tap(KeyIdentity::Shift, 0);
    let deadline = h.session.next_deadline();
    assert_eq!(deadline, Some(h.at(30) + Duration::from_secs(5)));

    assert!(h.tick(5_030).is_none());
    assert_eq!(h.session.shift_state(), ShiftState::OFF);
    assert_eq!(h.view.events().last(), Some(&ViewEvent::ShiftChanged(ShiftState::OFF)));

    h.tap(KeyIdentity::char("a"), 6_000);
    assert_eq!(h.sink.text(), "a");
}

#[test]
fn late_tick_does_not_leak_shift_into_next_letter() {
    let mut h = Harness::new();
    h.tap(KeyIdentity::Shift, 0);
    // No tick was delivered at the deadline.
    h.tap(KeyIdentity::char("a"), 9_000);
    assert_eq!(h.sink.text(), "a");
}

#[test]
fn sentence_end_engages_shift() {
    let mut h = Harness::new();
    h.type_str("ok.", 0);
    h.tap(KeyIdentity::Space, 5_000);
    h.tap(KeyIdentity::char("n"), 6_000);
    assert_eq!(h.sink.text(), "ok. N");
}

#[test]
fn auto_capitalize_can_be_turned_off() {
    let mut h = Harness::new();
    h.session.set_settings(EditSettings {
        auto_capitalize: false,
        ..EditSettings::default()
    });
    h.type_str("!x", 0);
    assert_eq!(h.sink.text(), "!x");
}

#[test]
fn start_input_with_cap_sentences() {
    let mut h = Harness::new();
    h.session.start_input(true, h.at(0));
    h.tap(KeyIdentity::char("w"), 100);
    assert_eq!(h.sink.text(), "W");
}

// ============================================================================
// Mode switching
// ============================================================================

#[test]
fn mode_keys_switch_layouts_with_one_pulse_each() {
    let mut h = Harness::new();
    let out = h.tap(KeyIdentity::ModeSwitch(KeyboardMode::Symbols), 0);

    assert_eq!(activations(&out), vec![Activation::ModeSwitch]);
    assert_eq!(h.session.mode(), KeyboardMode::Symbols);
    assert_eq!(h.session.previous_mode(), KeyboardMode::Normal);
    assert_eq!(h.haptics.pulses(), 1);
    assert!(
        h.view
            .events()
            .contains(&ViewEvent::RowsInvalidated(KeyboardMode::Symbols))
    );

    h.tap(KeyIdentity::ModeSwitch(KeyboardMode::Normal), 1_000);
    assert_eq!(h.session.mode(), KeyboardMode::Normal);
    assert_eq!(h.haptics.pulses(), 2);
    assert_eq!(h.sink.text(), "");
}

#[test]
fn mode_switch_round_trip_restores_layout() {
    let mut h = Harness::new();
    h.tap(KeyIdentity::ModeSwitch(KeyboardMode::Emoji), 0);
    let generation = h.session.generation();
    h.session.switch_back();

    assert_eq!(h.session.mode(), KeyboardMode::Normal);
    assert_eq!(h.session.generation(), generation + 1);
}

// ============================================================================
// Slides and long presses
// ============================================================================

#[test]
fn slide_never_commits_or_pulses() {
    let mut h = Harness::new();
    let mut out = h.down(KeyIdentity::Space, 0);
    out.extend(h.move_by(20.0, 50));
    out.extend(h.move_by(10.0, 100));
    out.extend(h.up(150));

    assert!(out.iter().all(|d| d.activation.is_none()));
    assert_eq!(h.sink.text(), "");
    assert_eq!(h.haptics.pulses(), 0);
    assert_eq!(h.view.cursor_total(), 2);
    assert!(h.view.events().contains(&ViewEvent::CursorDrag(true)));
    assert!(h.view.events().contains(&ViewEvent::CursorDrag(false)));

    // The slide did not register with the cadence tracker.
    h.tap(KeyIdentity::Space, 200);
    assert_eq!(h.sink.text(), " ");
}

#[test]
fn cursor_drag_between_spaces_breaks_the_pair() {
    let mut h = Harness::new();
    h.tap(KeyIdentity::Space, 0);

    h.down(KeyIdentity::Space, 60);
    h.move_by(30.0, 80);
    h.up(100);
    assert_eq!(h.view.cursor_total(), 2);

    // Within 300ms of the first space, but the caret has moved.
    h.tap(KeyIdentity::Space, 150);
    assert_eq!(h.sink.text(), "  ");
    assert!(
        !h.sink
            .ops()
            .iter()
            .any(|op| matches!(op, SinkOp::DeleteBackward(_)))
    );
}

#[test]
fn slide_off_a_letter_abandons_it() {
    let mut h = Harness::new();
    let mut out = h.down(KeyIdentity::char("q"), 0);
    out.extend(h.move_by(30.0, 50));
    out.extend(h.up(100));

    assert!(matches!(out.last().map(|d| &d.gesture), Some(Gesture::SlideEnd { .. })));
    assert_eq!(h.sink.text(), "");
    assert_eq!(h.haptics.pulses(), 0);
    assert_eq!(h.view.cursor_total(), 0);
}

#[test]
fn long_press_space_drags_the_cursor() {
    let mut h = Harness::new();
    h.down(KeyIdentity::Space, 0);
    assert!(h.tick(499).is_none());

    let long_press = h.tick(500).expect("long press due");
    assert!(matches!(long_press.gesture, Gesture::LongPress { .. }));
    assert!(long_press.activation.is_none());

    h.move_by(-25.0, 600);
    let out = h.up(700);

    assert!(matches!(out[0].gesture, Gesture::HoldRelease { .. }));
    assert_eq!(h.view.cursor_total(), -2);
    assert_eq!(h.sink.text(), "");
    assert_eq!(h.haptics.pulses(), 0);
}

#[test]
fn late_long_press_fires_before_release() {
    let mut h = Harness::new();
    h.down(KeyIdentity::Space, 0);
    let out = h.up(800);

    assert_eq!(out.len(), 2);
    assert!(matches!(out[0].gesture, Gesture::LongPress { .. }));
    assert!(matches!(out[1].gesture, Gesture::HoldRelease { .. }));
    assert_eq!(h.sink.text(), "");
}

#[test]
fn held_letter_is_still_a_tap() {
    let mut h = Harness::new();
    h.down(KeyIdentity::char("a"), 0);
    assert!(h.tick(2_000).is_none());
    let out = h.up(2_000);

    assert_eq!(activations(&out), vec![Activation::Commit]);
    assert_eq!(h.sink.text(), "a");
}

#[test]
fn cancel_releases_without_activation() {
    let mut h = Harness::new();
    h.down(KeyIdentity::char("a"), 0);
    let out = h.cancel(40);

    assert!(matches!(out[0].gesture, Gesture::Cancel { .. }));
    assert_eq!(h.sink.text(), "");
    assert_eq!(h.haptics.pulses(), 0);
    assert_eq!(
        h.view.events().last(),
        Some(&ViewEvent::Pressed(KeyIdentity::char("a"), false))
    );
}

#[test]
fn second_finger_supersedes_the_first() {
    let mut h = Harness::new();
    h.down(KeyIdentity::char("a"), 0);
    let out = h.down(KeyIdentity::char("b"), 50);
    assert!(matches!(out[0].gesture, Gesture::Cancel { .. }));
    h.up(80);

    assert_eq!(h.sink.text(), "b");
    assert_eq!(
        h.view.events(),
        vec![
            ViewEvent::Pressed(KeyIdentity::char("a"), true),
            ViewEvent::Pressed(KeyIdentity::char("a"), false),
            ViewEvent::Pressed(KeyIdentity::char("b"), true),
            ViewEvent::Pressed(KeyIdentity::char("b"), false),
        ]
    );
}

// ============================================================================
// Special keys
// ============================================================================

#[test]
fn backspace_enter_and_emoji() {
    let mut h = Harness::new();
    h.type_str("ab", 0);
    h.tap(KeyIdentity::Backspace, 5_000);
    h.tap(KeyIdentity::Enter, 6_000);
    h.tap(KeyIdentity::emoji("🔥"), 7_000);

    assert_eq!(h.sink.text(), "a\n🔥");
    assert_eq!(h.haptics.pulses(), 5);
}

// ============================================================================
// Collaborator failures
// ============================================================================

#[test]
fn missing_sink_still_updates_state_and_pulses() {
    let mut h = Harness::new();
    assert!(h.session.detach_sink().is_some());
    assert!(!h.session.has_sink());

    h.tap(KeyIdentity::Shift, 0);
    let out = h.tap(KeyIdentity::char("a"), 1_000);

    assert_eq!(activations(&out), vec![Activation::Commit]);
    assert!(out[0].feedback_fired);
    assert_eq!(h.session.shift_state(), ShiftState::OFF);
    assert_eq!(h.haptics.pulses(), 2);
    assert_eq!(h.sink.text(), "");
}

struct PanickingSink;

impl TextSink for PanickingSink {
    fn commit(&mut self, _text: &str) {
        panic!("input connection died");
    }

    fn delete_backward(&mut self, _count: usize) {
        panic!("input connection died");
    }
}

#[test]
fn panicking_sink_abandons_the_cycle() {
    let mut h = Harness::new();
    h.tap(KeyIdentity::Shift, 0);
    h.session.attach_sink(Box::new(PanickingSink));

    let out = h.tap(KeyIdentity::char("a"), 1_000);
    assert_eq!(out.len(), 1);
    assert!(out[0].abandoned);
    assert!(out[0].activation.is_none());
    assert!(!out[0].feedback_fired);
    assert_eq!(h.haptics.pulses(), 1);
    // Ops run before state transitions, so the shift was not spent.
    assert_eq!(h.session.shift_state(), ShiftState::ONE_SHOT);

    h.session.attach_sink(Box::new(h.sink.clone()));
    h.tap(KeyIdentity::char("b"), 2_000);
    assert_eq!(h.sink.text(), "B");
    assert_eq!(h.haptics.pulses(), 2);
}

#[test]
fn haptics_off_spends_feedback_silently() {
    let mut h = Harness::new();
    h.session.set_settings(EditSettings {
        haptic_feedback: false,
        ..EditSettings::default()
    });
    let out = h.tap(KeyIdentity::char("a"), 0);

    assert!(out[0].feedback_fired);
    assert_eq!(h.haptics.pulses(), 0);
    assert_eq!(h.session.pulses(), 0);
    assert_eq!(h.sink.text(), "a");
}

#[test]
fn stray_events_are_ignored() {
    let mut h = Harness::new();
    assert!(h.move_by(50.0, 0).is_empty());
    assert!(h.up(10).is_empty());
    assert!(h.cancel(20).is_empty());
    assert_eq!(h.haptics.pulses(), 0);
    assert!(h.view.events().is_empty());
}
