#![forbid(unsafe_code)]

//! Keyboard configuration as data.
//!
//! [`KeyboardConfig`] groups every tunable of the interaction core. It can
//! be built in code or, with the `config-files` feature, loaded from TOML or
//! JSON. Missing sections and fields keep their defaults.
//!
//! ```toml
//! [gesture]
//! long_press_ms = 400
//!
//! [shift]
//! auto_reset = false
//!
//! [settings]
//! double_space_period = false
//! ```
//!
//! ```rust,ignore
//! let config = KeyboardConfig::from_toml_file("keyflow.toml")?;
//! let session = KeyboardSession::with_config(&config, haptics, view)?;
//! ```
//!
//! # Defaults
//!
//! `KeyboardConfig::default()` reproduces the hardcoded component defaults:
//! long press 500ms, dead-zone 8dp, double tap 300ms, shift double tap
//! 250ms, shift auto-reset 5s, cursor step 12dp, every setting on.

#[cfg(feature = "config-files")]
use std::path::Path;

#[cfg(feature = "config-files")]
use serde::{Deserialize, Serialize};

use keyflow_core::GestureConfig;
use keyflow_core::cursor::{CursorTracker, DEFAULT_CURSOR_STEP};
use web_time::Duration;

use crate::editing::EditSettings;
#[cfg(feature = "config-files")]
use crate::error::{KeyflowError, Result};

// ---------------------------------------------------------------------------
// Top-level KeyboardConfig
// ---------------------------------------------------------------------------

/// Every tunable of the interaction core.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config-files", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-files", serde(default))]
pub struct KeyboardConfig {
    pub gesture: GestureSection,
    pub cadence: CadenceSection,
    pub shift: ShiftSection,
    pub cursor: CursorSection,
    pub settings: EditSettings,
}

impl KeyboardConfig {
    /// Load from a TOML string and validate.
    #[cfg(feature = "config-files")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validated()
    }

    /// Load from a TOML file on disk and validate.
    #[cfg(feature = "config-files")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string and validate.
    #[cfg(feature = "config-files")]
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validated()
    }

    /// Load from a JSON file on disk and validate.
    #[cfg(feature = "config-files")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    #[cfg(feature = "config-files")]
    fn validated(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(KeyflowError::Invalid(errors))
        }
    }

    /// Check every parameter is within range.
    ///
    /// An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.gesture.long_press_ms == 0 {
            errors.push("gesture.long_press_ms must be > 0".into());
        }
        if !self.gesture.slide_dead_zone_dp.is_finite() || self.gesture.slide_dead_zone_dp < 0.0 {
            errors.push(format!(
                "gesture.slide_dead_zone_dp must be >= 0, got {}",
                self.gesture.slide_dead_zone_dp
            ));
        }

        if self.cadence.double_tap_timeout_ms == 0 {
            errors.push("cadence.double_tap_timeout_ms must be > 0".into());
        }
        if self.cadence.shift_double_tap_ms == 0 {
            errors.push("cadence.shift_double_tap_ms must be > 0".into());
        }
        if self.shift.auto_reset && self.shift.auto_reset_ms == 0 {
            errors.push("shift.auto_reset_ms must be > 0 (set auto_reset = false to disable)".into());
        }

        if !self.cursor.step_dp.is_finite() || self.cursor.step_dp <= 0.0 {
            errors.push(format!(
                "cursor.step_dp must be > 0, got {}",
                self.cursor.step_dp
            ));
        }

        errors
    }

    /// Build the classifier config.
    #[must_use]
    pub fn to_gesture_config(&self) -> GestureConfig {
        GestureConfig {
            long_press_threshold: Duration::from_millis(self.gesture.long_press_ms),
            slide_dead_zone: self.gesture.slide_dead_zone_dp,
        }
    }

    /// The double-tap window.
    #[must_use]
    pub fn to_double_tap_timeout(&self) -> Duration {
        Duration::from_millis(self.cadence.double_tap_timeout_ms)
    }

    /// The shift key's caps-lock window.
    #[must_use]
    pub fn to_shift_double_tap_timeout(&self) -> Duration {
        Duration::from_millis(self.cadence.shift_double_tap_ms)
    }

    /// The shift auto-reset delay; `None` disables it.
    #[must_use]
    pub fn to_shift_auto_reset(&self) -> Option<Duration> {
        self.shift
            .auto_reset
            .then(|| Duration::from_millis(self.shift.auto_reset_ms))
    }

    /// Build the cursor-drag tracker.
    #[must_use]
    pub fn to_cursor_tracker(&self) -> CursorTracker {
        CursorTracker::new(self.cursor.step_dp)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Gesture classification thresholds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-files", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-files", serde(default))]
pub struct GestureSection {
    /// Hold before a press becomes a long press. Default: 500.
    pub long_press_ms: u64,
    /// Movement tolerated before a press becomes a slide. Default: 8.0.
    pub slide_dead_zone_dp: f32,
}

impl Default for GestureSection {
    fn default() -> Self {
        Self {
            long_press_ms: 500,
            slide_dead_zone_dp: 8.0,
        }
    }
}

/// Double-tap windows.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-files", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-files", serde(default))]
pub struct CadenceSection {
    /// Spacebar. Default: 300.
    pub double_tap_timeout_ms: u64,
    /// Shift key, for caps-lock. Default: 250.
    pub shift_double_tap_ms: u64,
}

impl Default for CadenceSection {
    fn default() -> Self {
        Self {
            double_tap_timeout_ms: 300,
            shift_double_tap_ms: 250,
        }
    }
}

/// Shift auto-reset.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-files", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-files", serde(default))]
pub struct ShiftSection {
    /// Turn an unused one-shot shift off after a delay. Default: true.
    pub auto_reset: bool,
    /// The delay. Default: 5000.
    pub auto_reset_ms: u64,
}

impl Default for ShiftSection {
    fn default() -> Self {
        Self {
            auto_reset: true,
            auto_reset_ms: 5_000,
        }
    }
}

/// Cursor drag.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-files", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-files", serde(default))]
pub struct CursorSection {
    /// Horizontal distance per character. Default: 12.0.
    pub step_dp: f32,
}

impl Default for CursorSection {
    fn default() -> Self {
        Self {
            step_dp: DEFAULT_CURSOR_STEP,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
