#![forbid(unsafe_code)]

//! Single-fire haptic feedback per gesture cycle.
//!
//! Every cycle gets a [`FeedbackTicket`]. The first
//! [`fire`](FeedbackCoordinator::fire) on a ticket pulses the device and
//! spends the ticket; later fires on it are no-ops. When the cycle
//! completes with an activation and nothing fired yet, the completion point
//! fires. The result is exactly one pulse per activation no matter how many
//! layers asked for one, and none for cycles without an activation.

use crate::collab::HapticDevice;

/// A user-visible effect of a completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activation {
    Commit,
    Delete,
    EditorAction,
    ModeSwitch,
    ShiftChange,
}

/// Per-cycle permission to pulse once.
#[derive(Debug)]
#[must_use = "a ticket must be completed to guarantee feedback"]
pub struct FeedbackTicket {
    spent: bool,
}

impl FeedbackTicket {
    /// Whether this cycle already fired.
    #[inline]
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.spent
    }
}

/// Owns the haptic device and enforces the single-fire contract.
pub struct FeedbackCoordinator {
    device: Box<dyn HapticDevice>,
    enabled: bool,
    pulses: u64,
}

impl std::fmt::Debug for FeedbackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackCoordinator")
            .field("enabled", &self.enabled)
            .field("pulses", &self.pulses)
            .finish_non_exhaustive()
    }
}

impl FeedbackCoordinator {
    /// Wrap a device. `enabled = false` spends tickets without pulsing.
    #[must_use]
    pub fn new(device: Box<dyn HapticDevice>, enabled: bool) -> Self {
        Self {
            device,
            enabled,
            pulses: 0,
        }
    }

    /// Start a cycle.
    pub fn begin_cycle(&self) -> FeedbackTicket {
        FeedbackTicket { spent: false }
    }

    /// Pulse once per ticket. Returns `true` if this call spent the ticket.
    pub fn fire(&mut self, ticket: &mut FeedbackTicket) -> bool {
        if ticket.spent {
            tracing::trace!("feedback already fired this cycle");
            return false;
        }
        ticket.spent = true;
        if self.enabled {
            self.device.pulse();
            self.pulses += 1;
        }
        true
    }

    /// End a cycle. Fires if the cycle activated something and nothing
    /// fired yet. Returns whether the cycle fired at all.
    pub fn complete(&mut self, mut ticket: FeedbackTicket, activation: Option<Activation>) -> bool {
        match activation {
            Some(_) => {
                self.fire(&mut ticket);
            }
            None if ticket.spent => {
                tracing::warn!("feedback fired for a cycle without an activation");
            }
            None => {}
        }
        ticket.spent
    }

    /// Run `f` as one cycle. `f` returns its value and the activation it
    /// performed; the completion point fires if `f` did not.
    pub fn with_feedback<T>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut FeedbackTicket) -> (T, Option<Activation>),
    ) -> T {
        let mut ticket = self.begin_cycle();
        let (value, activation) = f(self, &mut ticket);
        self.complete(ticket, activation);
        value
    }

    /// Whether pulses reach the device.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn pulses on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Pulses delivered to the device so far.
    #[inline]
    #[must_use]
    pub fn pulses(&self) -> u64 {
        self.pulses
    }
}
