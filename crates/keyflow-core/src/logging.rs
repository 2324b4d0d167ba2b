#![forbid(unsafe_code)]

//! Structured logging facade.
//!
//! With the `tracing` feature the usual macros are re-exported here so
//! crate code can log as `crate::logging::debug!(..)`. With `tracing-json`
//! a JSON subscriber filtered by `RUST_LOG` can be installed for
//! production builds.

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Install a global JSON subscriber honoring `RUST_LOG` (default `info`).
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .try_init()
        .is_ok()
}
