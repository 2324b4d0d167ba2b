#![forbid(unsafe_code)]

//! Keyflow error model.
//!
//! # Design Principles
//!
//! 1. **Result inside, silence outside**: internal steps return
//!    [`Result`] and propagate with `?`; the session boundary logs and
//!    swallows so the keyboard never takes the host application down.
//! 2. **Fail-safe**: when a cycle fails, drop the activation rather than
//!    commit twice or pulse twice.

use thiserror::Error;

/// Errors raised inside the interaction core.
#[derive(Debug, Error)]
pub enum KeyflowError {
    /// No host input connection is attached; text I/O is skipped.
    #[error("no input connection attached")]
    SinkUnavailable,

    /// A pointer event arrived that does not fit the live cycle.
    #[error("malformed gesture sequence: {0} without a live pointer")]
    MalformedGesture(&'static str),

    /// A key handler panicked; the cycle was abandoned.
    #[error("key handler panicked: {0}")]
    HandlerPanicked(String),

    /// Reading a configuration file failed.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML configuration failed to parse.
    #[cfg(feature = "config-files")]
    #[error("config TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON configuration failed to parse.
    #[cfg(feature = "config-files")]
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration parsed but failed validation.
    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl KeyflowError {
    /// Build a [`KeyflowError::HandlerPanicked`] from a caught panic payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_owned());
        Self::HandlerPanicked(message)
    }
}

/// Result alias for Keyflow operations.
pub type Result<T> = std::result::Result<T, KeyflowError>;
