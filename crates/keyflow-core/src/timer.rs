#![forbid(unsafe_code)]

//! Single-slot deadline timers polled from the event loop.
//!
//! A [`TimerSlot`] is stored next to the state it protects. Any transition
//! that invalidates that state must call [`TimerSlot::cancel`]; a cancelled
//! slot can never fire, so a stale callback cannot act on newer state.
//!
//! Nothing here owns a clock or a thread. The owner calls
//! [`TimerSlot::take_due`] from its tick handler with the current time.

use web_time::{Duration, Instant};

/// At most one pending deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerSlot {
    deadline: Option<Instant>,
}

impl TimerSlot {
    /// An idle slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Schedule a deadline `after` from `now`, replacing any pending one.
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    /// Clear the pending deadline. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Whether a deadline is pending.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if any.
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire the slot if its deadline has passed.
    ///
    /// Returns `true` exactly once per armed deadline; the slot is idle
    /// afterwards.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Earliest of two optional deadlines.
#[must_use]
pub fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
