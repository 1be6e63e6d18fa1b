//! # Configuration
//!
//! File locations used by Dissector.
//!
//! The defaults are the fixed paths on a jailbroken device. Every path can be
//! overridden through an environment variable, which is how the CLI is pointed
//! at a copy of the preferences and how the tests avoid touching `/var`.
//!
//! ## Environment Variables
//!
//! - `DISSECTOR_SETTINGS_PLIST`: global settings property list
//! - `DISSECTOR_APPLICATIONS_PLIST`: per-application property list
//! - `DISSECTOR_REVEAL_LIBRARY`: Reveal instrumentation library
//! - `DISSECTOR_SPARK_INSPECTOR_LIBRARY`: Spark Inspector instrumentation library

use std::env;
use std::path::{Path, PathBuf};

use crate::types::DebuggerType;

/// Default global settings file.
pub const DEFAULT_SETTINGS_PLIST: &str = "/var/mobile/Library/Preferences/com.mologie.dissector.plist";
/// Default per-application settings file.
pub const DEFAULT_APPLICATIONS_PLIST: &str = "/var/mobile/Library/Preferences/com.mologie.dissector.applications.plist";
/// Default Reveal library.
pub const DEFAULT_REVEAL_LIBRARY: &str = "/Library/Dissector/Reveal.dylib";
/// Default Spark Inspector library.
pub const DEFAULT_SPARK_INSPECTOR_LIBRARY: &str = "/Library/Dissector/SparkInspector.dylib";

/// Paths Dissector reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config
{
    /// Global settings property list
    pub settings_plist: PathBuf,
    /// Per-application property list
    pub applications_plist: PathBuf,
    /// Reveal instrumentation library
    pub reveal_library: PathBuf,
    /// Spark Inspector instrumentation library
    pub spark_inspector_library: PathBuf,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            settings_plist: PathBuf::from(DEFAULT_SETTINGS_PLIST),
            applications_plist: PathBuf::from(DEFAULT_APPLICATIONS_PLIST),
            reveal_library: PathBuf::from(DEFAULT_REVEAL_LIBRARY),
            spark_inspector_library: PathBuf::from(DEFAULT_SPARK_INSPECTOR_LIBRARY),
        }
    }
}

impl Config
{
    /// Build a configuration from the defaults and any `DISSECTOR_*` overrides.
    ///
    /// Empty variables are ignored.
    #[must_use]
    pub fn from_env() -> Self
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`], with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self
    {
        let mut config = Self::default();
        let overrides: [(&str, &mut PathBuf); 4] = [
            ("DISSECTOR_SETTINGS_PLIST", &mut config.settings_plist),
            ("DISSECTOR_APPLICATIONS_PLIST", &mut config.applications_plist),
            ("DISSECTOR_REVEAL_LIBRARY", &mut config.reveal_library),
            ("DISSECTOR_SPARK_INSPECTOR_LIBRARY", &mut config.spark_inspector_library),
        ];
        for (key, slot) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = PathBuf::from(value);
            }
        }
        config
    }

    /// Library that implements `debugger`, if it has one.
    #[must_use]
    pub fn library_path(&self, debugger: DebuggerType) -> Option<&Path>
    {
        match debugger {
            DebuggerType::None => None,
            DebuggerType::SparkInspector => Some(&self.spark_inspector_library),
            DebuggerType::Reveal => Some(&self.reveal_library),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_defaults()
    {
        let config = Config::default();
        assert_eq!(config.settings_plist, PathBuf::from(DEFAULT_SETTINGS_PLIST));
        assert_eq!(config.library_path(DebuggerType::Reveal), Some(Path::new(DEFAULT_REVEAL_LIBRARY)));
        assert_eq!(config.library_path(DebuggerType::None), None);
    }

    #[test]
    fn test_overrides()
    {
        let config = Config::from_lookup(|key| match key {
            "DISSECTOR_SETTINGS_PLIST" => Some("/tmp/settings.plist".to_string()),
            "DISSECTOR_REVEAL_LIBRARY" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.settings_plist, PathBuf::from("/tmp/settings.plist"));
        // Empty values fall back to the default
        assert_eq!(config.reveal_library, PathBuf::from(DEFAULT_REVEAL_LIBRARY));
        assert_eq!(config.applications_plist, PathBuf::from(DEFAULT_APPLICATIONS_PLIST));
    }
}
