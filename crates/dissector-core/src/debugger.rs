//! # Debugger Descriptors
//!
//! The plugin contract every debugger integration implements.
//!
//! Each integration (Reveal, Spark Inspector) is described by a
//! [`DebuggerProperties`] value: its type tag, its capability flags, and a
//! boxed [`DebuggerActions`] implementation that knows how to attach and
//! detach the tool. Descriptors are stateless; the handle produced by `load`
//! is owned by the caller (normally the
//! [`DebuggerController`](crate::registry::DebuggerController)).
//!
//! ## Lifecycle
//!
//! 1. `load()` returns a [`DebuggerHandle`]
//! 2. The caller stores it in an [`ActiveDebugger`] record
//! 3. `unload(handle)` consumes it
//!
//! Because `unload` takes the handle by value, the compiler rules out
//! unloading the same attachment twice.

use std::fmt;

use crate::error::Result;
use crate::handle::DebuggerHandle;
use crate::types::{DebuggerFlags, DebuggerType};

/// Load/unload operations for one debugger integration
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` so descriptors can live in a
/// process-wide registry, but the controller only ever calls them from a
/// single thread.
pub trait DebuggerActions: Send + Sync
{
    /// Attach the inspection tool to the current process
    ///
    /// Typically loads a dynamic library. All configuration comes from the
    /// descriptor itself; there are no parameters.
    ///
    /// ## Errors
    ///
    /// - `LibraryNotFound`: the tool is not installed
    /// - `InvalidImage`: the installed file is not a loadable library
    /// - `LoadFailed`: the loader rejected the library
    fn load(&self) -> Result<DebuggerHandle>;

    /// Reverse whatever `load` did
    ///
    /// ## Errors
    ///
    /// - `HandleMismatch`: `handle` was produced by another debugger
    /// - `UnloadFailed`: the loader refused to release the library
    fn unload(&self, handle: DebuggerHandle) -> Result<()>;
}

/// Static descriptor for one debugger integration
pub struct DebuggerProperties
{
    /// Which debugger this descriptor implements
    pub debugger: DebuggerType,
    /// Capabilities consulted before calling `load`/`unload`
    pub flags: DebuggerFlags,
    /// The integration's operations
    pub actions: Box<dyn DebuggerActions>,
}

impl DebuggerProperties
{
    /// Bundle a type tag, flags, and operations together.
    pub fn new(debugger: DebuggerType, flags: DebuggerFlags, actions: impl DebuggerActions + 'static) -> Self
    {
        Self {
            debugger,
            flags,
            actions: Box::new(actions),
        }
    }
}

impl fmt::Debug for DebuggerProperties
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("DebuggerProperties")
            .field("debugger", &self.debugger)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// A debugger that is currently loaded into this process
///
/// Created when `load` succeeds; consumed when its handle is given to
/// `unload`.
#[derive(Debug)]
pub struct ActiveDebugger
{
    /// Which debugger is loaded
    pub debugger: DebuggerType,
    /// Handle returned by that debugger's `load`
    pub handle: DebuggerHandle,
}
