#![forbid(unsafe_code)]

//! Gesture classification: turns one key's raw pointer stream into a
//! classified gesture.
//!
//! [`GestureClassifier`] is a stateful processor that converts a
//! `Down → Move* → Up | Cancel` sequence into [`Gesture`]s. It tracks a
//! single pointer at a time.
//!
//! # State Machine
//!
//! ```text
//!            move > dead-zone             up
//!   Down ───────────────────────▶ Sliding ─────▶ SlideEnd
//!    │ │                            │ cancel
//!    │ │ long-press threshold       └──────────▶ SlideCancel
//!    │ └──────────────────────▶ LongPressed ─up─▶ HoldRelease
//!    │ up                             │ cancel
//!    ├──────────▶ Tap                 └──────────▶ HoldCancel
//!    │ cancel
//!    └──────────▶ Cancel
//! ```
//!
//! # Invariants
//!
//! 1. Every cycle yields exactly one classification: `Tap`, `LongPress`,
//!    `SlideStart`, or `Cancel`. `Tap` and `LongPress` never both emit for
//!    the same cycle.
//! 2. A slide stream is well-formed: `SlideStart` → `SlideMove`* →
//!    `SlideEnd` or `SlideCancel`.
//! 3. The long-press timer is cancelled by every `Up`, `Cancel`, slide
//!    start, and superseding `Down`, so it never fires for a stale cycle.
//! 4. Keys without [`KeyCaps::LONG_PRESS`] never arm the timer; a long hold
//!    on them is still a `Tap`.
//!
//! # Failure Modes
//!
//! - `Move`/`Up`/`Cancel` with no prior `Down` are dropped (logged only).
//! - A `Down` while a cycle is live cancels the stale cycle first.
//! - If the tick that should fire a long press is late, the next pointer
//!   event fires it with its own timestamp before being handled, so the
//!   result does not depend on tick frequency.

use web_time::{Duration, Instant};

use crate::event::{Point, PointerEvent};
use crate::key::{KeyCaps, KeyIdentity};
use crate::timer::TimerSlot;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds for gesture classification.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Hold duration before a stationary press becomes a long press (default: 500ms).
    pub long_press_threshold: Duration,
    /// Displacement (dp) a press may wander before it becomes a slide (default: 8.0).
    pub slide_dead_zone: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_threshold: Duration::from_millis(500),
            slide_dead_zone: 8.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The mutually exclusive outcome of one gesture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Tap,
    LongPress,
    Slide,
    Cancel,
}

/// Events produced by the classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Released before the long-press threshold, inside the dead-zone.
    Tap { key: KeyIdentity, pos: Point },

    /// Held past the threshold without sliding.
    LongPress {
        key: KeyIdentity,
        pos: Point,
        held: Duration,
    },

    /// Movement after a long press (cursor-drag interaction).
    HoldMove {
        key: KeyIdentity,
        pos: Point,
        /// Movement since the previous event (dx, dy).
        delta: (f32, f32),
    },

    /// Released after a long press.
    HoldRelease {
        key: KeyIdentity,
        pos: Point,
        held: Duration,
    },

    /// Cancelled by the system after a long press.
    HoldCancel { key: KeyIdentity },

    /// Moved beyond the dead-zone before any other classification.
    SlideStart { key: KeyIdentity, origin: Point },

    /// Ongoing slide movement.
    SlideMove {
        key: KeyIdentity,
        start: Point,
        current: Point,
        /// Movement since the previous event (dx, dy).
        delta: (f32, f32),
    },

    /// Released after sliding.
    SlideEnd {
        key: KeyIdentity,
        start: Point,
        end: Point,
    },

    /// Cancelled by the system mid-slide.
    SlideCancel { key: KeyIdentity },

    /// Cancelled by the system (or superseded) before any classification.
    Cancel { key: KeyIdentity },
}

impl Gesture {
    /// The key this gesture belongs to.
    #[must_use]
    pub fn key(&self) -> &KeyIdentity {
        match self {
            Self::Tap { key, .. }
            | Self::LongPress { key, .. }
            | Self::HoldMove { key, .. }
            | Self::HoldRelease { key, .. }
            | Self::HoldCancel { key }
            | Self::SlideStart { key, .. }
            | Self::SlideMove { key, .. }
            | Self::SlideEnd { key, .. }
            | Self::SlideCancel { key }
            | Self::Cancel { key } => key,
        }
    }

    /// The classification this event carries, if it is the classifying
    /// event of its cycle.
    #[must_use]
    pub fn classification(&self) -> Option<Classification> {
        match self {
            Self::Tap { .. } => Some(Classification::Tap),
            Self::LongPress { .. } => Some(Classification::LongPress),
            Self::SlideStart { .. } => Some(Classification::Slide),
            Self::Cancel { .. } => Some(Classification::Cancel),
            _ => None,
        }
    }

    /// Returns true for slide stream events.
    #[must_use]
    pub fn is_slide(&self) -> bool {
        matches!(
            self,
            Self::SlideStart { .. }
                | Self::SlideMove { .. }
                | Self::SlideEnd { .. }
                | Self::SlideCancel { .. }
        )
    }

    /// Returns true for long-press stream events.
    #[must_use]
    pub fn is_hold(&self) -> bool {
        matches!(
            self,
            Self::LongPress { .. }
                | Self::HoldMove { .. }
                | Self::HoldRelease { .. }
                | Self::HoldCancel { .. }
        )
    }

    /// Returns true if this event closes its cycle.
    #[must_use]
    pub fn ends_cycle(&self) -> bool {
        matches!(
            self,
            Self::Tap { .. }
                | Self::HoldRelease { .. }
                | Self::HoldCancel { .. }
                | Self::SlideEnd { .. }
                | Self::SlideCancel { .. }
                | Self::Cancel { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Phase of the live pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    Down,
    Sliding,
    LongPressed,
    Cancelled,
}

/// The live pointer, created on `Down` and destroyed on `Up`/`Cancel`.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    pub down_time: Instant,
    pub start_pos: Point,
    pub last_pos: Point,
    pub phase: GesturePhase,
    pub start_key: KeyIdentity,
}

// ---------------------------------------------------------------------------
// GestureClassifier
// ---------------------------------------------------------------------------

/// Stateful single-pointer gesture classifier.
///
/// Call [`process`](GestureClassifier::process) for each pointer event.
/// Call [`check_long_press`](GestureClassifier::check_long_press) from the
/// event loop's tick (see [`next_deadline`](GestureClassifier::next_deadline))
/// to detect long presses while the finger is still down.
pub struct GestureClassifier {
    config: GestureConfig,
    state: Option<GestureState>,
    long_press: TimerSlot,
    // Phase reported while no pointer is live: `Idle` after an up,
    // `Cancelled` after a cancel.
    resting: GesturePhase,
}

impl std::fmt::Debug for GestureClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureClassifier")
            .field("phase", &self.phase())
            .field("long_press_armed", &self.long_press.is_armed())
            .finish()
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureClassifier {
    /// Create a classifier with the given configuration.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: None,
            long_press: TimerSlot::new(),
            resting: GesturePhase::Idle,
        }
    }

    /// Process one pointer event, returning any gestures produced.
    ///
    /// Most events produce zero or one gesture. A superseding `Down` yields
    /// the stale cycle's cancellation, and the first move past the dead-zone
    /// yields both `SlideStart` and `SlideMove`.
    pub fn process(&mut self, event: &PointerEvent) -> Vec<Gesture> {
        let mut out = Vec::with_capacity(2);

        // A late tick must not let an up/move overtake a due long press.
        if !matches!(event, PointerEvent::Down { .. })
            && let Some(long_press) = self.check_long_press(event.time())
        {
            out.push(long_press);
        }

        match event {
            PointerEvent::Down { key, pos, time } => self.on_down(key, *pos, *time, &mut out),
            PointerEvent::Move { pos, .. } => self.on_move(*pos, &mut out),
            PointerEvent::Up { pos, time } => self.on_up(*pos, *time, &mut out),
            PointerEvent::Cancel { .. } => self.on_cancel(&mut out),
        }

        out
    }

    /// Fire the long press if its threshold has elapsed.
    pub fn check_long_press(&mut self, now: Instant) -> Option<Gesture> {
        if !self.long_press.take_due(now) {
            return None;
        }
        let state = self.state.as_mut()?;
        if state.phase != GesturePhase::Down {
            return None;
        }
        state.phase = GesturePhase::LongPressed;
        Some(Gesture::LongPress {
            key: state.start_key.clone(),
            pos: state.last_pos,
            held: now.saturating_duration_since(state.down_time),
        })
    }

    /// When the pending long-press timer is due, if armed.
    #[inline]
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.long_press.deadline()
    }

    /// Phase of the live pointer, or the resting phase when none is live.
    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.state.as_ref().map_or(self.resting, |s| s.phase)
    }

    /// The live pointer state, if a cycle is in progress.
    #[inline]
    #[must_use]
    pub fn state(&self) -> Option<&GestureState> {
        self.state.as_ref()
    }

    /// Drop any live cycle without emitting anything.
    pub fn reset(&mut self) {
        self.state = None;
        self.long_press.cancel();
        self.resting = GesturePhase::Idle;
    }

    /// Get a reference to the current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Update the configuration. Applies from the next `Down`.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }
}

// ---------------------------------------------------------------------------
// Internal event handlers
// ---------------------------------------------------------------------------

impl GestureClassifier {
    fn on_down(&mut self, key: &KeyIdentity, pos: Point, now: Instant, out: &mut Vec<Gesture>) {
        if self.state.is_some() {
            #[cfg(feature = "tracing")]
            crate::logging::debug!(key = %key, "down while a cycle is live; cancelling stale cycle");
            self.on_cancel(out);
        }

        self.state = Some(GestureState {
            down_time: now,
            start_pos: pos,
            last_pos: pos,
            phase: GesturePhase::Down,
            start_key: key.clone(),
        });
        if key.caps().contains(KeyCaps::LONG_PRESS) {
            self.long_press.arm(now, self.config.long_press_threshold);
        } else {
            self.long_press.cancel();
        }
    }

    fn on_move(&mut self, pos: Point, out: &mut Vec<Gesture>) {
        let Some(state) = self.state.as_mut() else {
            #[cfg(feature = "tracing")]
            crate::logging::debug!("move without down; ignored");
            return;
        };

        let delta = state.last_pos.delta_to(pos);
        match state.phase {
            GesturePhase::Down => {
                if state.start_pos.distance(pos) > self.config.slide_dead_zone {
                    self.long_press.cancel();
                    state.phase = GesturePhase::Sliding;
                    out.push(Gesture::SlideStart {
                        key: state.start_key.clone(),
                        origin: state.start_pos,
                    });
                    out.push(Gesture::SlideMove {
                        key: state.start_key.clone(),
                        start: state.start_pos,
                        current: pos,
                        delta,
                    });
                } else {
                    // Jitter inside the dead-zone is not tracked as movement.
                    return;
                }
            }
            GesturePhase::Sliding => out.push(Gesture::SlideMove {
                key: state.start_key.clone(),
                start: state.start_pos,
                current: pos,
                delta,
            }),
            GesturePhase::LongPressed => out.push(Gesture::HoldMove {
                key: state.start_key.clone(),
                pos,
                delta,
            }),
            GesturePhase::Idle | GesturePhase::Cancelled => {}
        }
        state.last_pos = pos;
    }

    fn on_up(&mut self, pos: Point, now: Instant, out: &mut Vec<Gesture>) {
        self.long_press.cancel();
        let Some(state) = self.state.take() else {
            #[cfg(feature = "tracing")]
            crate::logging::debug!("up without down; ignored");
            return;
        };
        self.resting = GesturePhase::Idle;

        let key = state.start_key;
        match state.phase {
            GesturePhase::Sliding => out.push(Gesture::SlideEnd {
                key,
                start: state.start_pos,
                end: pos,
            }),
            GesturePhase::LongPressed => out.push(Gesture::HoldRelease {
                key,
                pos,
                held: now.saturating_duration_since(state.down_time),
            }),
            // Jitter inside the dead-zone between the last move and the up
            // does not turn a tap into a slide.
            GesturePhase::Down => out.push(Gesture::Tap { key, pos }),
            GesturePhase::Idle | GesturePhase::Cancelled => {}
        }
    }

    fn on_cancel(&mut self, out: &mut Vec<Gesture>) {
        self.long_press.cancel();
        let Some(state) = self.state.take() else {
            #[cfg(feature = "tracing")]
            crate::logging::debug!("cancel without down; ignored");
            return;
        };
        self.resting = GesturePhase::Cancelled;

        let key = state.start_key;
        match state.phase {
            GesturePhase::Sliding => out.push(Gesture::SlideCancel { key }),
            GesturePhase::LongPressed => out.push(Gesture::HoldCancel { key }),
            GesturePhase::Down => out.push(Gesture::Cancel { key }),
            GesturePhase::Idle | GesturePhase::Cancelled => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
