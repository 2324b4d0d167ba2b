// Forbid unsafe in production; deny in tests.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: key identities, pointer events, and gesture classification.
//!
//! # Role in Keyflow
//! `keyflow-core` is the input layer of the on-screen keyboard. It turns the
//! raw pointer stream the view layer delivers for one key into classified
//! gestures, and tracks the timing state those gestures depend on.
//!
//! # Primary responsibilities
//! - **KeyIdentity**: what a key means, and the capabilities that implies.
//! - **GestureClassifier**: tap / long press / slide / cancel per cycle.
//! - **TapCadenceTracker**: pairwise double-tap detection per key.
//! - **TimerSlot**: cancellable single-deadline timers for the event loop.
//! - **CursorTracker**: drag distance to cursor steps.
//!
//! # How it fits in the system
//! The runtime (`keyflow-runtime`) feeds pointer events through the
//! classifier and turns the resulting gestures into edits, mode switches,
//! and haptic feedback. Nothing in this crate performs I/O or reads a
//! clock; every timestamp is supplied by the caller.

pub mod cadence;
pub mod cursor;
pub mod event;
pub mod gesture;
pub mod key;
pub mod logging;
pub mod timer;

pub use cadence::{CadenceResult, DOUBLE_TAP_TIMEOUT, TapCadenceTracker};
pub use event::{Point, PointerEvent};
pub use gesture::{Classification, Gesture, GestureClassifier, GestureConfig, GesturePhase};
pub use key::{KeyCaps, KeyIdentity, KeyboardMode};
pub use timer::TimerSlot;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
