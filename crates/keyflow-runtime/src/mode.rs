#![forbid(unsafe_code)]

//! Keyboard mode transitions.
//!
//! The mode graph is flat: any mode may switch to any other, including
//! itself. One level of history is kept for "back" navigation. Each switch
//! clears the rendered rows, which is modelled as a bump of
//! [`KeyboardModeController::generation`] that the view layer rebuilds
//! against.

use keyflow_core::KeyboardMode;

use crate::feedback::{FeedbackCoordinator, FeedbackTicket};

/// Record of one switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: KeyboardMode,
    pub to: KeyboardMode,
    /// Row-set generation after the switch.
    pub generation: u64,
    /// Whether this switch fired the cycle's feedback itself.
    pub fired_feedback: bool,
}

/// Owns the current and previous mode.
#[derive(Debug, Clone, Default)]
pub struct KeyboardModeController {
    current: KeyboardMode,
    previous: KeyboardMode,
    generation: u64,
}

impl KeyboardModeController {
    /// Start in [`KeyboardMode::Normal`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> KeyboardMode {
        self.current
    }

    #[inline]
    #[must_use]
    pub fn previous(&self) -> KeyboardMode {
        self.previous
    }

    /// Row-set generation; changes on every switch.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Switch to `target`.
    ///
    /// Callers that delegate from a key handler pass
    /// `perform_feedback = false`; the cycle's completion point then fires
    /// the single pulse. Direct callers pass `true`.
    pub fn switch_mode(
        &mut self,
        target: KeyboardMode,
        perform_feedback: bool,
        feedback: &mut FeedbackCoordinator,
        ticket: &mut FeedbackTicket,
    ) -> ModeTransition {
        let from = self.current;
        self.previous = from;
        self.current = target;
        self.generation = self.generation.wrapping_add(1);

        let fired_feedback = perform_feedback && feedback.fire(ticket);
        tracing::debug!(from = %from, to = %target, generation = self.generation, "mode switched");

        ModeTransition {
            from,
            to: target,
            generation: self.generation,
            fired_feedback,
        }
    }

    /// Switch back to the previous mode (one step; no stack).
    pub fn switch_back(
        &mut self,
        perform_feedback: bool,
        feedback: &mut FeedbackCoordinator,
        ticket: &mut FeedbackTicket,
    ) -> ModeTransition {
        let target = self.previous;
        self.switch_mode(target, perform_feedback, feedback, ticket)
    }

    /// Return to a fresh session state. Returns `true` if the visible mode
    /// changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.current != KeyboardMode::Normal;
        self.current = KeyboardMode::Normal;
        self.previous = KeyboardMode::Normal;
        if changed {
            self.generation = self.generation.wrapping_add(1);
        }
        changed
    }
}
