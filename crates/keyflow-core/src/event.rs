#![forbid(unsafe_code)]

//! Raw pointer events delivered by the view layer.
//!
//! Events are scoped to one key region: keys do not share pointer capture,
//! so a `Down` names the key and every following `Move`/`Up`/`Cancel`
//! belongs to that key until the cycle ends.
//!
//! # Design Notes
//!
//! - Positions are in density-independent pixels (dp) so thresholds do not
//!   depend on screen density.
//! - Timestamps come from the caller; nothing here reads a clock, which
//!   keeps every state machine deterministic under test.

use web_time::Instant;

use crate::key::KeyIdentity;

/// A 2D position in density-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        let (dx, dy) = self.delta_to(other);
        dx.hypot(dy)
    }

    /// Offset from `self` to `other`.
    #[must_use]
    pub fn delta_to(self, other: Self) -> (f32, f32) {
        (other.x - self.x, other.y - self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// One raw pointer event on a key region.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// Finger touched `key`.
    Down {
        key: KeyIdentity,
        pos: Point,
        time: Instant,
    },
    /// Finger moved while down.
    Move { pos: Point, time: Instant },
    /// Finger lifted.
    Up { pos: Point, time: Instant },
    /// The system took the pointer away (e.g. a parent started scrolling).
    Cancel { time: Instant },
}

impl PointerEvent {
    /// Timestamp of the event.
    #[must_use]
    pub fn time(&self) -> Instant {
        match self {
            Self::Down { time, .. }
            | Self::Move { time, .. }
            | Self::Up { time, .. }
            | Self::Cancel { time } => *time,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Down { .. } => "down",
            Self::Move { .. } => "move",
            Self::Up { .. } => "up",
            Self::Cancel { .. } => "cancel",
        }
    }
}
