//! # Application Lifecycle
//!
//! Host operations Dissector calls into but does not implement.
//!
//! On iOS these are private `UIApplication` methods (`terminateWithSuccess`,
//! `suspend`, `launchApplicationWithIdentifier:suspended:`); the injected
//! library provides that implementation. [`PosixLifecycle`](crate::platform::PosixLifecycle)
//! is the fallback used outside UIKit.

use crate::error::Result;

/// Process control provided by the host environment
pub trait ApplicationLifecycle
{
    /// Exit the current process with a success status.
    ///
    /// Implementations backed by a real process do not return.
    fn terminate_with_success(&self);

    /// Move the current process to the background / stop it.
    ///
    /// ## Errors
    ///
    /// - `Unsupported`: the host cannot suspend the process
    fn suspend(&self) -> Result<()>;

    /// Ask the host to launch the application with `bundle_id`.
    ///
    /// Returns the host's answer (`false` if it declined).
    ///
    /// ## Errors
    ///
    /// - `Unsupported`: the host cannot launch applications
    fn launch_application(&self, bundle_id: &str, suspended: bool) -> Result<bool>;
}
