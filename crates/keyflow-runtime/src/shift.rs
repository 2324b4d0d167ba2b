#![forbid(unsafe_code)]

//! Shift and caps-lock state with auto-reset.
//!
//! # Invariants
//!
//! 1. Caps-lock implies shift: `is_caps_lock_mode() ⇒ is_shift_on()`.
//!    The fields are private and every constructor upholds it.
//! 2. The auto-reset timer is armed only while one-shot shift is on.
//!    Every transition to off or caps-lock cancels it, and so does every
//!    committed character.
//! 3. Caps-lock is entered only by a second shift tap inside the shift
//!    double-tap window while one-shot shift is on.

use keyflow_core::TimerSlot;
use web_time::{Duration, Instant};

/// Default delay before an unused one-shot shift turns itself off.
pub const DEFAULT_SHIFT_AUTO_RESET: Duration = Duration::from_secs(5);

/// Two shift taps closer than this lock caps.
pub const DOUBLE_TAP_SHIFT_TIMEOUT: Duration = Duration::from_millis(250);

/// Shift key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShiftState {
    is_shift_on: bool,
    is_caps_lock_mode: bool,
}

impl ShiftState {
    /// Lowercase.
    pub const OFF: Self = Self {
        is_shift_on: false,
        is_caps_lock_mode: false,
    };
    /// Uppercase for the next letter only.
    pub const ONE_SHOT: Self = Self {
        is_shift_on: true,
        is_caps_lock_mode: false,
    };
    /// Uppercase until turned off.
    pub const CAPS_LOCK: Self = Self {
        is_shift_on: true,
        is_caps_lock_mode: true,
    };

    #[inline]
    #[must_use]
    pub const fn is_shift_on(self) -> bool {
        self.is_shift_on
    }

    #[inline]
    #[must_use]
    pub const fn is_caps_lock_mode(self) -> bool {
        self.is_caps_lock_mode
    }

    /// State after a shift key tap. `double` is whether the tap followed
    /// the previous shift tap within [`DOUBLE_TAP_SHIFT_TIMEOUT`].
    ///
    /// Caps-lock always turns off. A quick second tap on one-shot shift
    /// locks caps; any other tap flips between off and one-shot.
    #[must_use]
    pub const fn tapped(self, double: bool) -> Self {
        match (self.is_shift_on, self.is_caps_lock_mode) {
            (_, true) => Self::OFF,
            (true, false) if double => Self::CAPS_LOCK,
            (true, false) => Self::OFF,
            (false, false) => Self::ONE_SHOT,
        }
    }

    /// One-shot shift, unless caps-lock already holds.
    #[must_use]
    pub const fn engaged(self) -> Self {
        if self.is_caps_lock_mode {
            self
        } else {
            Self::ONE_SHOT
        }
    }

    /// State after a character was typed: one-shot shift is spent.
    #[must_use]
    pub const fn after_commit(self) -> Self {
        if self.is_caps_lock_mode {
            self
        } else {
            Self::OFF
        }
    }
}

/// How an activation changes shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftUpdate {
    Keep,
    /// A character was committed.
    ConsumeLetter,
    /// Engage one-shot shift for the next letter.
    Engage,
    /// The shift key was tapped; `double` if it landed inside the shift
    /// double-tap window.
    Tap { double: bool },
}

/// Owns [`ShiftState`] and its auto-reset timer.
#[derive(Debug, Clone)]
pub struct ShiftController {
    state: ShiftState,
    auto_reset: TimerSlot,
    auto_reset_after: Option<Duration>,
}

impl Default for ShiftController {
    fn default() -> Self {
        Self::new(Some(DEFAULT_SHIFT_AUTO_RESET))
    }
}

impl ShiftController {
    /// Start with shift off. `None` disables auto-reset.
    #[must_use]
    pub fn new(auto_reset_after: Option<Duration>) -> Self {
        Self {
            state: ShiftState::OFF,
            auto_reset: TimerSlot::new(),
            auto_reset_after,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> ShiftState {
        self.state
    }

    /// Apply an update. Returns `true` if the state changed.
    pub fn apply(&mut self, update: ShiftUpdate, now: Instant) -> bool {
        let next = match update {
            ShiftUpdate::Keep => return false,
            ShiftUpdate::ConsumeLetter => {
                self.auto_reset.cancel();
                self.state.after_commit()
            }
            ShiftUpdate::Engage => self.state.engaged(),
            ShiftUpdate::Tap { double } => self.state.tapped(double),
        };
        self.set(next, now)
    }

    /// Replace the state, re-arming or cancelling the auto-reset timer.
    /// Returns `true` if the state changed.
    pub fn set(&mut self, next: ShiftState, now: Instant) -> bool {
        let changed = next != self.state;
        self.state = next;
        if next == ShiftState::ONE_SHOT {
            if let Some(after) = self.auto_reset_after {
                self.auto_reset.arm(now, after);
            }
        } else {
            self.auto_reset.cancel();
        }
        changed
    }

    /// Fire the auto-reset if due. Returns `true` if shift turned off.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.auto_reset.take_due(now) {
            return false;
        }
        if self.state.is_caps_lock_mode() {
            return false;
        }
        tracing::debug!("shift auto-reset fired");
        self.set(ShiftState::OFF, now)
    }

    /// When the auto-reset timer is due, if armed.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.auto_reset.deadline()
    }

    /// Change the auto-reset delay. Applies from the next engagement.
    pub fn set_auto_reset_after(&mut self, after: Option<Duration>) {
        self.auto_reset_after = after;
        if after.is_none() {
            self.auto_reset.cancel();
        }
    }
}
