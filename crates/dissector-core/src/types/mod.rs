//! # Types
//!
//! Plain data types shared by the registry, the preferences layer, and the
//! injected library.

pub mod debugger;
pub mod process;

// Re-export all public types
pub use debugger::{DebuggerFlags, DebuggerType};
pub use process::{ProcessContext, SPRINGBOARD_BUNDLE_ID};
