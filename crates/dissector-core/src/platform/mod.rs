//! # Platform-Specific Implementations
//!
//! Loader and process-control code that talks to the operating system.
//!
//! - **dylib**: `dlopen`/`dlclose` plus header validation with `object`
//! - **process**: `exit`, Mach `task_suspend` (Apple) or `SIGSTOP` (elsewhere)
//!
//! Everything here needs a Unix loader. iOS is the real target; macOS and
//! Linux builds exist so the CLI and the test suite can run on a workstation.

pub mod dylib;
pub mod process;

pub use dylib::{inspect_image, DynamicLibraryDebugger, ImageFormat, ImageInfo, LoadedLibrary};
pub use process::PosixLifecycle;
