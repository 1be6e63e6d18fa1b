//! Host process identity.

use std::fmt;

/// Bundle identifier of the system UI process.
pub const SPRINGBOARD_BUNDLE_ID: &str = "com.apple.springboard";

/// The process Dissector has been injected into
///
/// Built once at startup from the main bundle's identifier. Debugger
/// selection and the restart flow both depend on whether we are running
/// inside SpringBoard or inside a regular application.
///
/// ## Example
///
/// ```rust
/// use dissector_core::types::ProcessContext;
///
/// let context = ProcessContext::new("com.apple.springboard");
/// assert!(context.is_springboard());
///
/// let context = ProcessContext::new("com.example.app");
/// assert!(!context.is_springboard());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessContext
{
    bundle_id: String,
    is_springboard: bool,
}

impl ProcessContext
{
    /// Create a context for the process with the given bundle identifier.
    pub fn new(bundle_id: impl Into<String>) -> Self
    {
        let bundle_id = bundle_id.into();
        let is_springboard = bundle_id == SPRINGBOARD_BUNDLE_ID;
        Self {
            bundle_id,
            is_springboard,
        }
    }

    /// Bundle identifier of the host process.
    #[must_use]
    pub fn bundle_id(&self) -> &str
    {
        &self.bundle_id
    }

    /// Whether the host process is SpringBoard.
    #[must_use]
    pub const fn is_springboard(&self) -> bool
    {
        self.is_springboard
    }
}

impl fmt::Display for ProcessContext
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.bundle_id)
    }
}
