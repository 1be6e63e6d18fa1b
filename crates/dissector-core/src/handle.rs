//! Opaque handles returned by `load` and consumed by `unload`.

use std::any::Any;
use std::fmt;

use crate::error::{DissectorError, Result};
use crate::types::DebuggerType;

/// Token representing an active debugger integration
///
/// A handle is produced by [`DebuggerActions::load`](crate::DebuggerActions::load)
/// and must be given back, by value, to the `unload` of the same debugger.
/// It is not `Clone`, so a handle can be unloaded at most once.
///
/// The resource inside is type-erased; each integration stores whatever it
/// needs to undo its setup (a `dlopen` handle, a server object, ...) and
/// recovers it with [`DebuggerHandle::into_resource`].
///
/// Dropping a handle does not release anything. Libraries that were loaded
/// stay resident until the process exits.
#[must_use = "a debugger handle must be passed to unload, or the debugger stays loaded"]
pub struct DebuggerHandle
{
    debugger: DebuggerType,
    resource: Box<dyn Any + Send>,
}

impl DebuggerHandle
{
    /// Wrap an integration specific resource.
    pub fn new<T: Any + Send>(debugger: DebuggerType, resource: T) -> Self
    {
        Self {
            debugger,
            resource: Box::new(resource),
        }
    }

    /// Debugger whose `load` produced this handle.
    #[must_use]
    pub const fn debugger(&self) -> DebuggerType
    {
        self.debugger
    }

    /// Check that this handle belongs to `expected`.
    ///
    /// ## Errors
    ///
    /// - `HandleMismatch`: the handle was produced by a different debugger
    pub fn ensure_debugger(&self, expected: DebuggerType) -> Result<()>
    {
        if self.debugger == expected {
            Ok(())
        } else {
            Err(DissectorError::HandleMismatch {
                expected,
                found: self.debugger,
            })
        }
    }

    /// Borrow the resource if it has type `T`.
    #[must_use]
    pub fn resource<T: Any>(&self) -> Option<&T>
    {
        self.resource.downcast_ref::<T>()
    }

    /// Consume the handle and take the resource back out.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: the resource is not a `T`
    pub fn into_resource<T: Any>(self) -> Result<T>
    {
        let debugger = self.debugger;
        self.resource.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
            DissectorError::InvalidArgument(format!(
                "{debugger} handle does not hold a {}",
                std::any::type_name::<T>()
            ))
        })
    }
}

impl fmt::Debug for DebuggerHandle
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("DebuggerHandle").field("debugger", &self.debugger).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_resource_round_trip()
    {
        let handle = DebuggerHandle::new(DebuggerType::Reveal, 42_usize);
        assert_eq!(handle.debugger(), DebuggerType::Reveal);
        assert_eq!(handle.resource::<usize>(), Some(&42));
        assert!(handle.resource::<String>().is_none());
        assert_eq!(handle.into_resource::<usize>().unwrap(), 42);
    }

    #[test]
    fn test_wrong_resource_type()
    {
        let handle = DebuggerHandle::new(DebuggerType::SparkInspector, "token");
        let err = handle.into_resource::<u64>().unwrap_err();
        assert!(matches!(err, DissectorError::InvalidArgument(_)));
    }

    #[test]
    fn test_ensure_debugger()
    {
        let handle = DebuggerHandle::new(DebuggerType::Reveal, ());
        assert!(handle.ensure_debugger(DebuggerType::Reveal).is_ok());
        match handle.ensure_debugger(DebuggerType::SparkInspector) {
            Err(DissectorError::HandleMismatch { expected, found }) => {
                assert_eq!(expected, DebuggerType::SparkInspector);
                assert_eq!(found, DebuggerType::Reveal);
            }
            other => panic!("Expected HandleMismatch, got {other:?}"),
        }
    }
}
