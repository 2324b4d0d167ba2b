#![forbid(unsafe_code)]

//! Converts horizontal drag distance into whole-character cursor steps.
//!
//! Sub-step movement is carried over between calls, so a slow drag still
//! moves the cursor once the accumulated distance reaches one step.

/// Default horizontal distance (dp) per character of cursor movement.
pub const DEFAULT_CURSOR_STEP: f32 = 12.0;

/// Accumulates drag deltas into cursor steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorTracker {
    step: f32,
    residual: f32,
}

impl Default for CursorTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CURSOR_STEP)
    }
}

impl CursorTracker {
    /// Create a tracker moving one character per `step` dp.
    ///
    /// Non-positive or non-finite steps fall back to [`DEFAULT_CURSOR_STEP`].
    #[must_use]
    pub fn new(step: f32) -> Self {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            DEFAULT_CURSOR_STEP
        };
        Self {
            step,
            residual: 0.0,
        }
    }

    /// Feed a horizontal delta, returning the whole steps it completes.
    ///
    /// Negative steps move left.
    #[allow(clippy::cast_possible_truncation)]
    pub fn advance(&mut self, dx: f32) -> i32 {
        if !dx.is_finite() {
            return 0;
        }
        self.residual += dx;
        let steps = (self.residual / self.step).trunc();
        self.residual -= steps * self.step;
        steps as i32
    }

    /// Discard any partial step (start of a new drag).
    pub fn reset(&mut self) {
        self.residual = 0.0;
    }

    /// Distance per step.
    #[inline]
    #[must_use]
    pub fn step(&self) -> f32 {
        self.step
    }
}
