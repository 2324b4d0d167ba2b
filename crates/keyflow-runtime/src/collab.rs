#![forbid(unsafe_code)]

//! External collaborators: the host text field, the haptic motor, and the
//! view layer.
//!
//! All three are driven from the single UI thread, so none of the traits
//! require `Send`.

use keyflow_core::{KeyIdentity, KeyboardMode};

use crate::shift::ShiftState;

/// The host text-editing connection.
pub trait TextSink {
    /// Insert `text` at the cursor.
    fn commit(&mut self, text: &str);

    /// Delete `count` characters before the cursor.
    fn delete_backward(&mut self, count: usize);

    /// Perform the field's editor action. Defaults to a newline.
    fn editor_action(&mut self) {
        self.commit("\n");
    }
}

/// Fire-and-forget haptic pulse.
pub trait HapticDevice {
    fn pulse(&mut self);
}

/// Notifications for the view layer. Every method defaults to a no-op.
///
/// The view never feeds decisions back into the core except through the
/// raw pointer stream.
pub trait ViewObserver {
    /// A key's pressed visual should turn on or off.
    fn pressed_visual(&mut self, _key: &KeyIdentity, _pressed: bool) {}

    /// The visible rows were cleared and must be rebuilt for `mode`.
    fn rows_invalidated(&mut self, _mode: KeyboardMode) {}

    /// Shift or caps-lock state changed; key caps need relabelling.
    fn shift_changed(&mut self, _state: ShiftState) {}

    /// Cursor-drag mode started or ended.
    fn cursor_drag(&mut self, _active: bool) {}

    /// Move the host cursor by whole characters (negative is left).
    fn move_cursor(&mut self, _steps: i32) {}
}

/// A haptic device that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl HapticDevice for NoHaptics {
    fn pulse(&mut self) {}
}

/// A view observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullView;

impl ViewObserver for NullView {}
