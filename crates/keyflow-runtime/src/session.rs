#![forbid(unsafe_code)]

//! The keyboard session: one pointer stream in, edits and feedback out.
//!
//! [`KeyboardSession`] owns every piece of interaction state and drives the
//! external collaborators. The host delivers pointer events through
//! [`handle_pointer`](KeyboardSession::handle_pointer) and calls
//! [`tick`](KeyboardSession::tick) when
//! [`next_deadline`](KeyboardSession::next_deadline) passes.
//!
//! # Cycle
//!
//! Each gesture is dispatched as one feedback cycle:
//!
//! ```text
//! gesture → [cadence] → plan → sink ops → shift → cadence reset
//!         → mode switch → cursor → feedback completion
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Outcome |
//! |---|---|
//! | No sink attached | Text I/O skipped, state transitions and feedback still apply |
//! | Event without a live pointer | Logged and ignored |
//! | Panic while deciding or applying | Cycle abandoned: no further ops, no feedback |
//!
//! Nothing here returns an error to the host; the boundary logs and swallows.

use std::panic::{AssertUnwindSafe, catch_unwind};

use keyflow_core::cursor::CursorTracker;
use keyflow_core::timer::earliest;
use keyflow_core::{
    Gesture, GestureClassifier, GesturePhase, KeyIdentity, KeyboardMode, PointerEvent,
    TapCadenceTracker,
};
use web_time::Instant;

use crate::collab::{HapticDevice, TextSink, ViewObserver};
use crate::config::KeyboardConfig;
use crate::editing::{self, CursorSignal, EditContext, EditOp, EditPlan, EditSettings};
use crate::error::{KeyflowError, Result};
use crate::feedback::{Activation, FeedbackCoordinator, FeedbackTicket};
use crate::mode::{KeyboardModeController, ModeTransition};
use crate::shift::{ShiftController, ShiftState};

/// Outcome of dispatching one gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub gesture: Gesture,
    /// What the cycle did, if anything.
    pub activation: Option<Activation>,
    /// Whether the cycle pulsed (or would have, with haptics off).
    pub feedback_fired: bool,
    /// The cycle failed part-way and was dropped.
    pub abandoned: bool,
}

/// Interaction state plus collaborators for one keyboard instance.
pub struct KeyboardSession {
    classifier: GestureClassifier,
    cadence: TapCadenceTracker,
    shift_cadence: TapCadenceTracker,
    shift: ShiftController,
    modes: KeyboardModeController,
    feedback: FeedbackCoordinator,
    cursor: CursorTracker,
    settings: EditSettings,
    sink: Option<Box<dyn TextSink>>,
    view: Box<dyn ViewObserver>,
}

impl std::fmt::Debug for KeyboardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardSession")
            .field("phase", &self.classifier.phase())
            .field("mode", &self.modes.current())
            .field("shift", &self.shift.state())
            .field("settings", &self.settings)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl KeyboardSession {
    /// A session with default configuration and no sink attached.
    #[must_use]
    pub fn new(haptics: Box<dyn HapticDevice>, view: Box<dyn ViewObserver>) -> Self {
        Self::build(&KeyboardConfig::default(), haptics, view)
    }

    /// A session configured from `config`.
    ///
    /// # Errors
    ///
    /// [`KeyflowError::Invalid`] if the config fails validation.
    pub fn with_config(
        config: &KeyboardConfig,
        haptics: Box<dyn HapticDevice>,
        view: Box<dyn ViewObserver>,
    ) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(KeyflowError::Invalid(errors));
        }
        Ok(Self::build(config, haptics, view))
    }

    fn build(
        config: &KeyboardConfig,
        haptics: Box<dyn HapticDevice>,
        view: Box<dyn ViewObserver>,
    ) -> Self {
        Self {
            classifier: GestureClassifier::new(config.to_gesture_config()),
            cadence: TapCadenceTracker::new(config.to_double_tap_timeout()),
            shift_cadence: TapCadenceTracker::new(config.to_shift_double_tap_timeout()),
            shift: ShiftController::new(config.to_shift_auto_reset()),
            modes: KeyboardModeController::new(),
            feedback: FeedbackCoordinator::new(haptics, config.settings.haptic_feedback),
            cursor: config.to_cursor_tracker(),
            settings: config.settings,
            sink: None,
            view,
        }
    }

    // -----------------------------------------------------------------------
    // Host lifecycle
    // -----------------------------------------------------------------------

    /// Attach the host input connection, returning the previous one.
    pub fn attach_sink(&mut self, sink: Box<dyn TextSink>) -> Option<Box<dyn TextSink>> {
        tracing::debug!("input connection attached");
        self.sink.replace(sink)
    }

    /// Detach the host input connection.
    pub fn detach_sink(&mut self) -> Option<Box<dyn TextSink>> {
        tracing::debug!("input connection detached");
        self.sink.take()
    }

    /// A new text field gained focus.
    ///
    /// Drops any live gesture and cadence history, returns to the normal
    /// layout, and engages shift if the field capitalizes sentences.
    pub fn start_input(&mut self, cap_sentences: bool, now: Instant) {
        if let Some(state) = self.classifier.state() {
            self.view.pressed_visual(&state.start_key, false);
        }
        self.classifier.reset();
        self.cadence.clear();
        self.shift_cadence.clear();
        self.cursor.reset();
        if self.modes.reset() {
            self.view.rows_invalidated(KeyboardMode::Normal);
        }
        let next = if cap_sentences {
            ShiftState::ONE_SHOT
        } else {
            ShiftState::OFF
        };
        if self.shift.set(next, now) {
            self.view.shift_changed(next);
        }
        tracing::debug!(cap_sentences, "input started");
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    /// Feed one pointer event.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Vec<Dispatch> {
        let now = event.time();
        self.poll_shift(now);

        if !matches!(event, PointerEvent::Down { .. }) && self.classifier.state().is_none() {
            let err = KeyflowError::MalformedGesture(event.kind_name());
            tracing::debug!(error = %err, "pointer event ignored");
            return Vec::new();
        }

        let gestures = self.classifier.process(event);
        let mut out = Vec::with_capacity(gestures.len());
        for gesture in gestures {
            let ends_cycle = gesture.ends_cycle();
            let dispatch = self.dispatch(gesture, now);
            if ends_cycle {
                self.view.pressed_visual(dispatch.gesture.key(), false);
            }
            out.push(dispatch);
        }

        if let PointerEvent::Down { key, .. } = event {
            self.view.pressed_visual(key, true);
        }
        out
    }

    /// Fire due timers: the long press and the shift auto-reset.
    pub fn tick(&mut self, now: Instant) -> Option<Dispatch> {
        self.poll_shift(now);
        let gesture = self.classifier.check_long_press(now)?;
        Some(self.dispatch(gesture, now))
    }

    /// The earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(self.classifier.next_deadline(), self.shift.next_deadline())
    }

    fn poll_shift(&mut self, now: Instant) {
        if self.shift.poll(now) {
            self.view.shift_changed(self.shift.state());
        }
    }

    // -----------------------------------------------------------------------
    // Host-initiated mode switches
    // -----------------------------------------------------------------------

    /// Switch layout outside any key cycle. Fires its own feedback.
    pub fn switch_mode(&mut self, target: KeyboardMode) -> ModeTransition {
        let modes = &mut self.modes;
        let transition = self.feedback.with_feedback(|fc, ticket| {
            (
                modes.switch_mode(target, true, fc, ticket),
                Some(Activation::ModeSwitch),
            )
        });
        self.view.rows_invalidated(transition.to);
        transition
    }

    /// Return to the previous layout. Fires its own feedback.
    pub fn switch_back(&mut self) -> ModeTransition {
        let modes = &mut self.modes;
        let transition = self.feedback.with_feedback(|fc, ticket| {
            (
                modes.switch_back(true, fc, ticket),
                Some(Activation::ModeSwitch),
            )
        });
        self.view.rows_invalidated(transition.to);
        transition
    }

    // -----------------------------------------------------------------------
    // Settings and accessors
    // -----------------------------------------------------------------------

    /// Replace the user settings.
    pub fn set_settings(&mut self, settings: EditSettings) {
        self.feedback.set_enabled(settings.haptic_feedback);
        if !settings.double_space_period {
            self.cadence.clear();
        }
        self.settings = settings;
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> EditSettings {
        self.settings
    }

    #[inline]
    #[must_use]
    pub fn shift_state(&self) -> ShiftState {
        self.shift.state()
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> KeyboardMode {
        self.modes.current()
    }

    #[inline]
    #[must_use]
    pub fn previous_mode(&self) -> KeyboardMode {
        self.modes.previous()
    }

    /// Row-set generation; changes whenever the layout is cleared.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.modes.generation()
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.classifier.phase()
    }

    #[inline]
    #[must_use]
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Pulses delivered to the haptic device.
    #[inline]
    #[must_use]
    pub fn pulses(&self) -> u64 {
        self.feedback.pulses()
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

impl KeyboardSession {
    fn dispatch(&mut self, gesture: Gesture, now: Instant) -> Dispatch {
        let span = tracing::debug_span!(
            "keyflow.dispatch",
            key = %gesture.key(),
            kind = ?gesture.classification()
        );
        let _guard = span.enter();

        let mut ticket = self.feedback.begin_cycle();
        let outcome = catch_unwind(AssertUnwindSafe(|| self.run_cycle(&gesture, now, &mut ticket)))
            .unwrap_or_else(|payload| Err(KeyflowError::from_panic(payload.as_ref())));

        match outcome {
            Ok(activation) => {
                let feedback_fired = self.feedback.complete(ticket, activation);
                tracing::trace!(?activation, feedback_fired, "cycle complete");
                Dispatch {
                    gesture,
                    activation,
                    feedback_fired,
                    abandoned: false,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "cycle abandoned");
                let feedback_fired = self.feedback.complete(ticket, None);
                self.cursor.reset();
                Dispatch {
                    gesture,
                    activation: None,
                    feedback_fired,
                    abandoned: true,
                }
            }
        }
    }

    fn run_cycle(
        &mut self,
        gesture: &Gesture,
        now: Instant,
        ticket: &mut FeedbackTicket,
    ) -> Result<Option<Activation>> {
        let key = gesture.key();
        let cadence = editing::wants_cadence(gesture, &self.settings)
            .then(|| self.cadence_for(key).register_tap(key, now));
        let ctx = EditContext {
            shift: self.shift.state(),
            cadence,
            settings: self.settings,
        };
        let plan = editing::plan(gesture, &ctx);
        self.apply(gesture, plan, now, ticket)
    }

    fn cadence_for(&mut self, key: &KeyIdentity) -> &mut TapCadenceTracker {
        if *key == KeyIdentity::Shift {
            &mut self.shift_cadence
        } else {
            &mut self.cadence
        }
    }

    fn apply(
        &mut self,
        gesture: &Gesture,
        plan: EditPlan,
        now: Instant,
        ticket: &mut FeedbackTicket,
    ) -> Result<Option<Activation>> {
        for op in &plan.ops {
            match self.write(op) {
                Ok(()) => {}
                Err(KeyflowError::SinkUnavailable) => {
                    tracing::debug!(?op, "no input connection, text I/O skipped");
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        if self.shift.apply(plan.shift, now) {
            self.view.shift_changed(self.shift.state());
        }

        // Any other key's activation breaks a double tap in progress.
        if plan.activation.is_some() {
            let key = gesture.key();
            if *key != KeyIdentity::Space {
                self.cadence.clear();
            }
            if *key != KeyIdentity::Shift {
                self.shift_cadence.clear();
            }
        }

        if let Some(target) = plan.mode_switch {
            let transition = self.modes.switch_mode(target, false, &mut self.feedback, ticket);
            self.view.rows_invalidated(transition.to);
        }

        match plan.cursor {
            Some(CursorSignal::Drag(active)) => {
                self.cursor.reset();
                self.view.cursor_drag(active);
            }
            Some(CursorSignal::Delta(dx)) => {
                let steps = self.cursor.advance(dx);
                if steps != 0 {
                    // The caret moved: a following tap no longer pairs with
                    // the one before the drag.
                    self.cadence.forget(gesture.key());
                    self.view.move_cursor(steps);
                }
            }
            None => {}
        }

        Ok(plan.activation)
    }

    fn write(&mut self, op: &EditOp) -> Result<()> {
        let sink = self.sink.as_deref_mut().ok_or(KeyflowError::SinkUnavailable)?;
        match op {
            EditOp::Commit(text) => sink.commit(text),
            EditOp::DeleteBackward(count) => sink.delete_backward(*count),
            EditOp::EditorAction => sink.editor_action(),
        }
        Ok(())
    }
}
