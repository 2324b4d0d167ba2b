#![forbid(unsafe_code)]

//! Editing decisions: gesture + key + shift + cadence → edit plan.
//!
//! [`plan`] is pure. It never touches the sink, the haptic device, or any
//! owned state; the session applies the returned [`EditPlan`]. Keeping the
//! decision separate from its application means a failure while deciding
//! can abandon the cycle before any text has been written.
//!
//! # Rules
//!
//! | Gesture | Key | Effect |
//! |---|---|---|
//! | tap | character | commit (uppercased single letter if shift is on); spends one-shot shift |
//! | tap | space, single | commit `" "` |
//! | tap | space, double | delete 1, commit `". "`, engage shift |
//! | tap | mode switch | switch mode (feedback left to the cycle) |
//! | tap | shift | off ↔ one-shot; quick second tap on one-shot locks caps; caps-lock → off |
//! | tap | emoji | commit glyph, spends one-shot shift |
//! | tap | backspace / enter | delete 1 / editor action |
//! | long press, hold, slide | slide key | cursor drag only, no commit |
//! | slide, cancel | other keys | nothing |

#[cfg(feature = "config-files")]
use serde::{Deserialize, Serialize};

use keyflow_core::key::is_single_letter;
use keyflow_core::{CadenceResult, Gesture, KeyCaps, KeyIdentity, KeyboardMode};

use crate::feedback::Activation;
use crate::shift::{ShiftState, ShiftUpdate};

/// Text committed by a spacebar double tap.
pub const PERIOD_SPACE: &str = ". ";

/// User-facing toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config-files", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-files", serde(default))]
pub struct EditSettings {
    /// Pulse the haptic device on activations.
    pub haptic_feedback: bool,
    /// Engage shift after `.`, `!`, `?`.
    pub auto_capitalize: bool,
    /// Double-tap space inserts `". "`.
    pub double_space_period: bool,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            haptic_feedback: true,
            auto_capitalize: true,
            double_space_period: true,
        }
    }
}

/// One text operation against the host sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Commit(String),
    DeleteBackward(usize),
    EditorAction,
}

/// Cursor-drag signals for the view layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorSignal {
    /// Enter or leave cursor-drag mode.
    Drag(bool),
    /// Horizontal movement (dp) to convert into cursor steps.
    Delta(f32),
}

/// Everything one gesture should do.
#[derive(Debug, Clone, PartialEq)]
pub struct EditPlan {
    pub ops: Vec<EditOp>,
    pub shift: ShiftUpdate,
    pub mode_switch: Option<KeyboardMode>,
    pub cursor: Option<CursorSignal>,
    pub activation: Option<Activation>,
}

impl EditPlan {
    /// A plan that does nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            ops: Vec::new(),
            shift: ShiftUpdate::Keep,
            mode_switch: None,
            cursor: None,
            activation: None,
        }
    }

    fn cursor(signal: CursorSignal) -> Self {
        Self {
            cursor: Some(signal),
            ..Self::none()
        }
    }

    fn commit(text: String, shift: ShiftUpdate) -> Self {
        Self {
            ops: vec![EditOp::Commit(text)],
            shift,
            activation: Some(Activation::Commit),
            ..Self::none()
        }
    }
}

/// Inputs to [`plan`] beyond the gesture itself.
#[derive(Debug, Clone, Copy)]
pub struct EditContext {
    pub shift: ShiftState,
    /// Present only for taps registered with the cadence tracker.
    pub cadence: Option<CadenceResult>,
    pub settings: EditSettings,
}

/// Whether a gesture's tap must be registered with the cadence tracker
/// before planning. Slides, holds, and cancels never register; space taps
/// register only while double-space-period is on.
#[must_use]
pub fn wants_cadence(gesture: &Gesture, settings: &EditSettings) -> bool {
    match gesture {
        Gesture::Tap { key, .. } if key.caps().contains(KeyCaps::DOUBLE_TAP) => {
            *key != KeyIdentity::Space || settings.double_space_period
        }
        _ => false,
    }
}

/// Decide what a gesture does.
#[must_use]
pub fn plan(gesture: &Gesture, ctx: &EditContext) -> EditPlan {
    let slide_key = gesture.key().caps().contains(KeyCaps::SLIDE);
    match gesture {
        Gesture::Tap { key, .. } => plan_tap(key, ctx),

        Gesture::LongPress { .. } | Gesture::SlideStart { .. } if slide_key => {
            EditPlan::cursor(CursorSignal::Drag(true))
        }
        Gesture::HoldMove { delta, .. } | Gesture::SlideMove { delta, .. } if slide_key => {
            EditPlan::cursor(CursorSignal::Delta(delta.0))
        }
        Gesture::HoldRelease { .. }
        | Gesture::HoldCancel { .. }
        | Gesture::SlideEnd { .. }
        | Gesture::SlideCancel { .. }
            if slide_key =>
        {
            EditPlan::cursor(CursorSignal::Drag(false))
        }

        _ => EditPlan::none(),
    }
}

fn plan_tap(key: &KeyIdentity, ctx: &EditContext) -> EditPlan {
    match key {
        KeyIdentity::Char(text) => {
            let letter = is_single_letter(text);
            let payload = if letter && ctx.shift.is_shift_on() {
                text.to_uppercase()
            } else {
                text.clone()
            };
            let shift = if ctx.settings.auto_capitalize && is_sentence_end(text) {
                ShiftUpdate::Engage
            } else {
                ShiftUpdate::ConsumeLetter
            };
            EditPlan::commit(payload, shift)
        }

        KeyIdentity::Space => {
            if ctx.cadence.is_some_and(|c| c.is_double_tap) {
                EditPlan {
                    ops: vec![
                        EditOp::DeleteBackward(1),
                        EditOp::Commit(PERIOD_SPACE.to_owned()),
                    ],
                    shift: ShiftUpdate::Engage,
                    activation: Some(Activation::Commit),
                    ..EditPlan::none()
                }
            } else {
                EditPlan::commit(" ".to_owned(), ShiftUpdate::Keep)
            }
        }

        KeyIdentity::Emoji(glyph) => EditPlan::commit(glyph.clone(), ShiftUpdate::ConsumeLetter),

        KeyIdentity::Backspace => EditPlan {
            ops: vec![EditOp::DeleteBackward(1)],
            activation: Some(Activation::Delete),
            ..EditPlan::none()
        },

        KeyIdentity::Enter => EditPlan {
            ops: vec![EditOp::EditorAction],
            activation: Some(Activation::EditorAction),
            ..EditPlan::none()
        },

        KeyIdentity::Shift => EditPlan {
            shift: ShiftUpdate::Tap {
                double: ctx.cadence.is_some_and(|c| c.is_double_tap),
            },
            activation: Some(Activation::ShiftChange),
            ..EditPlan::none()
        },

        KeyIdentity::ModeSwitch(target) => EditPlan {
            mode_switch: Some(*target),
            activation: Some(Activation::ModeSwitch),
            ..EditPlan::none()
        },
    }
}

fn is_sentence_end(text: &str) -> bool {
    matches!(text, "." | "!" | "?")
}
