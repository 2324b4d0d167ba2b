#![forbid(unsafe_code)]

//! Recording collaborators for tests and embedders.
//!
//! Each recorder is a cheap handle over shared state: keep one clone, box
//! another into the session, and inspect the first afterwards.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use keyflow_core::{KeyIdentity, KeyboardMode};

use crate::collab::{HapticDevice, TextSink, ViewObserver};
use crate::shift::ShiftState;

/// One call received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOp {
    Commit(String),
    DeleteBackward(usize),
    EditorAction,
}

/// Text sink that applies edits to an in-memory buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Rc<RefCell<SinkLog>>,
}

#[derive(Debug, Default)]
struct SinkLog {
    text: String,
    ops: Vec<SinkOp>,
}

impl RecordingSink {
    /// An empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current buffer contents.
    #[must_use]
    pub fn text(&self) -> String {
        self.inner.borrow().text.clone()
    }

    /// Every call received, in order.
    #[must_use]
    pub fn ops(&self) -> Vec<SinkOp> {
        self.inner.borrow().ops.clone()
    }

    /// Number of commit calls received.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.inner
            .borrow()
            .ops
            .iter()
            .filter(|op| matches!(op, SinkOp::Commit(_)))
            .count()
    }
}

impl TextSink for RecordingSink {
    fn commit(&mut self, text: &str) {
        let mut log = self.inner.borrow_mut();
        log.text.push_str(text);
        log.ops.push(SinkOp::Commit(text.to_owned()));
    }

    fn delete_backward(&mut self, count: usize) {
        let mut log = self.inner.borrow_mut();
        for _ in 0..count {
            log.text.pop();
        }
        log.ops.push(SinkOp::DeleteBackward(count));
    }

    fn editor_action(&mut self) {
        let mut log = self.inner.borrow_mut();
        log.text.push('\n');
        log.ops.push(SinkOp::EditorAction);
    }
}

/// Haptic device that counts pulses.
#[derive(Debug, Clone, Default)]
pub struct RecordingHaptics {
    pulses: Rc<Cell<usize>>,
}

impl RecordingHaptics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulses fired so far.
    #[must_use]
    pub fn pulses(&self) -> usize {
        self.pulses.get()
    }
}

impl HapticDevice for RecordingHaptics {
    fn pulse(&mut self) {
        self.pulses.set(self.pulses.get() + 1);
    }
}

/// One notification received by a [`RecordingView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Pressed(KeyIdentity, bool),
    RowsInvalidated(KeyboardMode),
    ShiftChanged(ShiftState),
    CursorDrag(bool),
    MoveCursor(i32),
}

/// View observer that records every notification.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    events: Rc<RefCell<Vec<ViewEvent>>>,
}

impl RecordingView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification received, in order.
    #[must_use]
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.borrow().clone()
    }

    /// Sum of all cursor steps requested.
    #[must_use]
    pub fn cursor_total(&self) -> i32 {
        self.events
            .borrow()
            .iter()
            .map(|e| match e {
                ViewEvent::MoveCursor(steps) => *steps,
                _ => 0,
            })
            .sum()
    }
}

impl ViewObserver for RecordingView {
    fn pressed_visual(&mut self, key: &KeyIdentity, pressed: bool) {
        self.events
            .borrow_mut()
            .push(ViewEvent::Pressed(key.clone(), pressed));
    }

    fn rows_invalidated(&mut self, mode: KeyboardMode) {
        self.events.borrow_mut().push(ViewEvent::RowsInvalidated(mode));
    }

    fn shift_changed(&mut self, state: ShiftState) {
        self.events.borrow_mut().push(ViewEvent::ShiftChanged(state));
    }

    fn cursor_drag(&mut self, active: bool) {
        self.events.borrow_mut().push(ViewEvent::CursorDrag(active));
    }

    fn move_cursor(&mut self, steps: i32) {
        self.events.borrow_mut().push(ViewEvent::MoveCursor(steps));
    }
}
