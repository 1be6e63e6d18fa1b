//! Debugger identity and capability types.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::DissectorError;

/// External inspection tool a descriptor or record pertains to
///
/// The string forms (`None`, `SparkInspector`, `Reveal`) are what the
/// preference files store.
///
/// ## Example
///
/// ```rust
/// use dissector_core::types::DebuggerType;
///
/// let debugger: DebuggerType = "reveal".parse()?;
/// assert_eq!(debugger, DebuggerType::Reveal);
/// assert_eq!(debugger.to_string(), "Reveal");
/// # Ok::<(), dissector_core::error::DissectorError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum DebuggerType
{
    /// No debugger
    #[default]
    None,
    /// Spark Inspector
    SparkInspector,
    /// Reveal
    Reveal,
}

impl DebuggerType
{
    /// Every debugger that can actually be loaded (excludes `None`).
    pub const LOADABLE: [DebuggerType; 2] = [DebuggerType::SparkInspector, DebuggerType::Reveal];

    /// Canonical name, as stored in preference files.
    #[must_use]
    pub const fn as_str(self) -> &'static str
    {
        match self {
            Self::None => "None",
            Self::SparkInspector => "SparkInspector",
            Self::Reveal => "Reveal",
        }
    }

    /// Whether this is `DebuggerType::None`.
    #[must_use]
    pub const fn is_none(self) -> bool
    {
        matches!(self, Self::None)
    }
}

impl fmt::Display for DebuggerType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.pad(self.as_str())
    }
}

impl FromStr for DebuggerType
{
    type Err = DissectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "sparkinspector" | "spark-inspector" | "spark" => Ok(Self::SparkInspector),
            "reveal" => Ok(Self::Reveal),
            _ => Err(DissectorError::InvalidArgument(format!(
                "Unknown debugger: {s}. Use 'None', 'SparkInspector', or 'Reveal'"
            ))),
        }
    }
}

impl TryFrom<String> for DebuggerType
{
    type Error = DissectorError;

    fn try_from(value: String) -> Result<Self, Self::Error>
    {
        value.parse()
    }
}

impl From<DebuggerType> for &'static str
{
    fn from(debugger: DebuggerType) -> Self
    {
        debugger.as_str()
    }
}

bitflags! {
    /// Static capabilities of a debugger integration
    ///
    /// The controller consults these before calling `load`/`unload`:
    ///
    /// - `SUPPORTS_SPRINGBOARD`: may be loaded into the system UI process
    /// - `SUPPORTS_DYNAMIC_UNLOADING`: may be unloaded without restarting the process
    ///
    /// The default is no capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DebuggerFlags: u32 {
        /// Can be loaded into SpringBoard
        const SUPPORTS_SPRINGBOARD = 1 << 0;
        /// Can be unloaded without a process restart
        const SUPPORTS_DYNAMIC_UNLOADING = 1 << 1;
    }
}

impl DebuggerFlags
{
    /// Whether the integration may be loaded into SpringBoard.
    #[must_use]
    pub const fn supports_springboard(self) -> bool
    {
        self.contains(Self::SUPPORTS_SPRINGBOARD)
    }

    /// Whether the integration may be unloaded in place.
    #[must_use]
    pub const fn supports_dynamic_unloading(self) -> bool
    {
        self.contains(Self::SUPPORTS_DYNAMIC_UNLOADING)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_debugger_type_from_str()
    {
        assert_eq!(DebuggerType::from_str("Reveal").unwrap(), DebuggerType::Reveal);
        assert_eq!(DebuggerType::from_str("spark").unwrap(), DebuggerType::SparkInspector);
        assert_eq!(DebuggerType::from_str("SparkInspector").unwrap(), DebuggerType::SparkInspector);
        assert_eq!(DebuggerType::from_str("off").unwrap(), DebuggerType::None);
        assert!(DebuggerType::from_str("gdb").is_err());
    }

    #[test]
    fn test_default_flags_are_empty()
    {
        let flags = DebuggerFlags::default();
        assert!(flags.is_empty());
        assert!(!flags.supports_springboard());
        assert!(!flags.supports_dynamic_unloading());
    }

    #[test]
    fn test_flag_bits_are_independent()
    {
        let mut flags = DebuggerFlags::default();
        flags.insert(DebuggerFlags::SUPPORTS_SPRINGBOARD);
        assert!(flags.supports_springboard());
        assert!(!flags.supports_dynamic_unloading());

        flags.insert(DebuggerFlags::SUPPORTS_DYNAMIC_UNLOADING);
        flags.remove(DebuggerFlags::SUPPORTS_SPRINGBOARD);
        assert!(!flags.supports_springboard());
        assert!(flags.supports_dynamic_unloading());
        assert_eq!(flags.bits(), 0b10);
    }
}
