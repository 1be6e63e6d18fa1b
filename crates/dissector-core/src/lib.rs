//! # dissector-core
//!
//! Debugger plugin descriptors and the logic that decides when to load them.
//!
//! This crate provides:
//! - The descriptor contract (`DebuggerActions`, `DebuggerProperties`, `DebuggerHandle`)
//! - A registry and a controller that loads/unloads at most one debugger per process
//! - Preference parsing for the global and per-application property lists
//! - A `dlopen`-based backend for library-packaged inspection tools
//! - The restart prompt model used when a debugger cannot be unloaded in place
//!
//! ## Platform Support
//!
//! - **iOS**: the real target, driven by the injected `dissector-tweak` library
//! - **macOS / Linux**: enough to run the CLI and the tests
//!
//! ## Why unsafe code is needed
//!
//! Loading a library into the running process means calling the dynamic
//! loader (`dlopen`, `dlclose`, `dlerror`) and, on Apple platforms, Mach
//! task APIs. These are wrapped in safe functions in [`platform`].

#![allow(unsafe_code)] // Required for the dynamic loader and Mach APIs

pub mod config;
pub mod debugger;
pub mod error;
pub mod handle;
pub mod lifecycle;
pub mod platform;
pub mod preferences;
pub mod prelude;
pub mod prompt;
pub mod registry;
pub mod types;

pub use debugger::{ActiveDebugger, DebuggerActions, DebuggerProperties};
// Re-export commonly used types
pub use error::{DissectorError, Result};
pub use handle::DebuggerHandle;
pub use registry::{DebuggerController, DebuggerRegistry, Transition};
pub use types::{DebuggerFlags, DebuggerType, ProcessContext};
