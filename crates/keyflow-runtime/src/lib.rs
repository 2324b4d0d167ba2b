#![forbid(unsafe_code)]

//! Keyflow Runtime
//!
//! This crate turns classified gestures into edits, layout switches, shift
//! changes, and haptic feedback for the Keyflow on-screen keyboard.
//!
//! # Key Components
//!
//! - [`KeyboardSession`] - Owns all interaction state; the host's entry point
//! - [`FeedbackCoordinator`] - Exactly one haptic pulse per activation
//! - [`KeyboardModeController`] - Layout switching with one level of history
//! - [`ShiftController`] - Shift / caps-lock cycle with auto-reset
//! - [`editing`] - Pure gesture-to-edit planning
//! - [`KeyboardConfig`] - Every tunable, loadable from TOML/JSON
//!
//! # Role in Keyflow
//! `keyflow-runtime` is the interaction core. It consumes pointer events,
//! classifies them with `keyflow-core`, and drives the host collaborators:
//! a [`TextSink`] for text, a [`HapticDevice`] for pulses, and a
//! [`ViewObserver`] for visual state.
//!
//! # How it fits in the system
//! The host's view layer forwards raw pointer events and timer ticks to a
//! [`KeyboardSession`]. Everything runs on the single UI thread, so no
//! type here is `Send` and no state is locked.

pub mod collab;
pub mod config;
pub mod editing;
pub mod error;
pub mod feedback;
pub mod mode;
pub mod recording;
pub mod session;
pub mod shift;

pub use collab::{HapticDevice, NoHaptics, NullView, TextSink, ViewObserver};
pub use config::KeyboardConfig;
pub use editing::{EditOp, EditPlan, EditSettings};
pub use error::{KeyflowError, Result};
pub use feedback::{Activation, FeedbackCoordinator, FeedbackTicket};
pub use mode::{KeyboardModeController, ModeTransition};
pub use session::{Dispatch, KeyboardSession};
pub use shift::{DOUBLE_TAP_SHIFT_TIMEOUT, ShiftController, ShiftState, ShiftUpdate};

pub use keyflow_core::{
    Gesture, GestureConfig, KeyIdentity, KeyboardMode, Point, PointerEvent, TapCadenceTracker,
};
