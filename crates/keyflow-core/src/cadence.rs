#![forbid(unsafe_code)]

//! Double-tap detection over per-key tap timestamps.
//!
//! Each key identity owns one slot holding the time of its last qualifying
//! tap. A tap closer than the timeout to that time is a double tap, and the
//! slot is cleared on the match so the cadence is strictly pairwise: a
//! third rapid tap starts a new pair instead of chaining.
//!
//! ```text
//! t=0    tap  → single   slot = 0
//! t=100  tap  → double   slot = ∅
//! t=200  tap  → single   slot = 200
//! ```

use std::collections::HashMap;

use web_time::{Duration, Instant};

use crate::key::KeyIdentity;

/// Default double-tap window.
pub const DOUBLE_TAP_TIMEOUT: Duration = Duration::from_millis(300);

/// Result of registering one tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceResult {
    pub is_double_tap: bool,
}

/// Tracks the last tap per key identity.
#[derive(Debug, Clone)]
pub struct TapCadenceTracker {
    timeout: Duration,
    last_tap: HashMap<KeyIdentity, Instant>,
}

impl Default for TapCadenceTracker {
    fn default() -> Self {
        Self::new(DOUBLE_TAP_TIMEOUT)
    }
}

impl TapCadenceTracker {
    /// Create a tracker with the given double-tap window.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_tap: HashMap::new(),
        }
    }

    /// Register a tap on `key` at `now`.
    ///
    /// A match clears the slot; a miss stores `now` as the new last tap.
    pub fn register_tap(&mut self, key: &KeyIdentity, now: Instant) -> CadenceResult {
        let is_double_tap = self
            .last_tap
            .get(key)
            .is_some_and(|last| now.saturating_duration_since(*last) < self.timeout);

        if is_double_tap {
            self.last_tap.remove(key);
        } else {
            self.last_tap.insert(key.clone(), now);
        }
        CadenceResult { is_double_tap }
    }

    /// Forget the last tap on `key`.
    pub fn forget(&mut self, key: &KeyIdentity) {
        self.last_tap.remove(key);
    }

    /// Forget every key's last tap.
    pub fn clear(&mut self) {
        self.last_tap.clear();
    }

    /// Last recorded tap on `key`.
    #[must_use]
    pub fn last_tap(&self, key: &KeyIdentity) -> Option<Instant> {
        self.last_tap.get(key).copied()
    }

    /// The double-tap window.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Change the double-tap window. Stored taps are kept.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}
