//! # Error Types
//!
//! General error handling for Dissector.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::DebuggerType;

/// Main error type for Dissector operations
///
/// ## Error Categories
///
/// 1. **Argument errors**: InvalidArgument, HandleMismatch
/// 2. **Library errors**: LibraryNotFound, InvalidImage, LoadFailed, UnloadFailed
/// 3. **Host errors**: Unsupported
/// 4. **Preference errors**: Preferences
/// 5. **I/O errors**: Io
#[derive(Error, Debug)]
pub enum DissectorError
{
    /// Invalid argument passed to a Dissector function
    ///
    /// Examples:
    /// - Registering a descriptor for `DebuggerType::None`
    /// - Unknown debugger name on the command line
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The instrumentation library for a debugger is not installed
    #[error("Library not found: {}", .0.display())]
    LibraryNotFound(PathBuf),

    /// The file exists but is not a dynamic library we can load
    ///
    /// This usually means a partially installed package or a library built
    /// for a different platform.
    #[error("Invalid library image {}: {reason}", path.display())]
    InvalidImage
    {
        /// Path of the rejected image
        path: PathBuf,
        /// Why the image was rejected
        reason: String,
    },

    /// `dlopen()` or the integration's own setup failed
    #[error("Failed to load {debugger}: {reason}")]
    LoadFailed
    {
        /// Debugger that was being loaded
        debugger: DebuggerType,
        /// Details reported by the loader
        reason: String,
    },

    /// `dlclose()` or the integration's own teardown failed
    #[error("Failed to unload {debugger}: {reason}")]
    UnloadFailed
    {
        /// Debugger that was being unloaded
        debugger: DebuggerType,
        /// Details reported by the loader
        reason: String,
    },

    /// A handle was passed to the `unload` of a different debugger
    ///
    /// Handles may only be returned to the descriptor that produced them.
    #[error("Handle mismatch: expected a {expected} handle, got a {found} handle")]
    HandleMismatch
    {
        /// Debugger owning the descriptor
        expected: DebuggerType,
        /// Debugger that produced the handle
        found: DebuggerType,
    },

    /// The operation is not available in this process or on this platform
    ///
    /// Examples:
    /// - Loading a debugger into SpringBoard that does not support it
    /// - Launching applications without a UIKit host
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A preference file could not be read, parsed, or written
    #[error("Preferences error: {0}")]
    Preferences(String),

    /// I/O error (for file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, DissectorError>`
///
/// ```rust
/// use dissector_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, DissectorError>;
