//! # Dissector Utilities
//!
//! Shared logging and helpers for Dissector.
//!
//! This crate provides the `tracing` setup used by the command line tool and
//! the injected library, plus the debug-only [`ds_log!`] macro.

pub mod logging;
pub mod macros;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_for_tweak, init_logging_with_level, LogFormat, LogLevel, LoggingError};
pub use macros::DEBUG_TAG;
#[doc(hidden)]
pub use tracing;
pub use tracing::{debug, error, info, trace, warn};
