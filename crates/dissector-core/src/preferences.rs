//! # Preferences
//!
//! User configuration stored in two property lists.
//!
//! ## Settings (`com.mologie.dissector.plist`)
//!
//! | Key | Type | Default |
//! |---|---|---|
//! | `Enabled` | bool | `true` |
//! | `Debugger` | string (`None`, `SparkInspector`, `Reveal`) | `Reveal` |
//! | `EnableInSpringBoard` | bool | `false` |
//! | `PromptForRestart` | bool | `true` |
//!
//! ## Applications (`com.mologie.dissector.applications.plist`)
//!
//! A dictionary keyed by bundle identifier. A boolean value turns the global
//! debugger on or off for that application; a debugger name overrides the
//! global choice.
//!
//! Missing or empty files are treated as defaults, so a fresh install behaves
//! as "nothing enabled".

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{DissectorError, Result};
use crate::types::{DebuggerType, ProcessContext};

/// Global settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings
{
    /// Master switch
    #[serde(rename = "Enabled")]
    pub enabled: bool,
    /// Debugger used for enabled applications without an override
    #[serde(rename = "Debugger")]
    pub debugger: DebuggerType,
    /// Load the global debugger into SpringBoard
    #[serde(rename = "EnableInSpringBoard")]
    pub enable_in_springboard: bool,
    /// Ask before restarting an application whose debugger cannot be swapped in place
    #[serde(rename = "PromptForRestart")]
    pub prompt_for_restart: bool,
}

impl Default for Settings
{
    fn default() -> Self
    {
        Self {
            enabled: true,
            debugger: DebuggerType::Reveal,
            enable_in_springboard: false,
            prompt_for_restart: true,
        }
    }
}

/// Per-application entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AppEntry
{
    /// `true` uses the global debugger, `false` disables Dissector for the app
    Enabled(bool),
    /// Use this debugger regardless of the global choice
    Debugger(DebuggerType),
}

/// Both preference files, as loaded from disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences
{
    /// Global settings
    pub settings: Settings,
    /// Per-application entries keyed by bundle identifier
    pub applications: BTreeMap<String, AppEntry>,
}

impl Preferences
{
    /// Read both property lists named by `config`.
    ///
    /// ## Errors
    ///
    /// - `Preferences`: a file exists but is not a valid property list of the expected shape
    /// - `Io`: a file exists but cannot be read
    pub fn load(config: &Config) -> Result<Self>
    {
        let settings = read_plist(&config.settings_plist)?.unwrap_or_default();
        let applications = read_plist(&config.applications_plist)?.unwrap_or_default();
        let preferences = Self { settings, applications };
        debug!(
            enabled = preferences.settings.enabled,
            debugger = %preferences.settings.debugger,
            applications = preferences.applications.len(),
            "Loaded preferences"
        );
        Ok(preferences)
    }

    /// Write both property lists (XML format), creating parent directories.
    ///
    /// ## Errors
    ///
    /// - `Io`: a directory cannot be created
    /// - `Preferences`: serialization or writing failed
    pub fn save(&self, config: &Config) -> Result<()>
    {
        write_plist(&config.settings_plist, &self.settings)?;
        write_plist(&config.applications_plist, &self.applications)?;
        Ok(())
    }

    /// Decide which debugger should be active in `context`.
    ///
    /// - Disabled globally → `None`
    /// - SpringBoard → the global debugger if `EnableInSpringBoard`, else `None`
    /// - Application entry `true` → the global debugger
    /// - Application entry naming a debugger → that debugger
    /// - `false` or no entry → `None`
    #[must_use]
    pub fn resolve(&self, context: &ProcessContext) -> DebuggerType
    {
        if !self.settings.enabled {
            return DebuggerType::None;
        }

        if context.is_springboard() {
            return if self.settings.enable_in_springboard {
                self.settings.debugger
            } else {
                DebuggerType::None
            };
        }

        match self.applications.get(context.bundle_id()) {
            Some(AppEntry::Enabled(true)) => self.settings.debugger,
            Some(AppEntry::Debugger(debugger)) => *debugger,
            Some(AppEntry::Enabled(false)) | None => DebuggerType::None,
        }
    }

    /// Set the global debugger.
    pub fn set_debugger(&mut self, debugger: DebuggerType)
    {
        self.settings.debugger = debugger;
    }

    /// Flip the master switch.
    pub fn set_enabled(&mut self, enabled: bool)
    {
        self.settings.enabled = enabled;
    }

    /// Add or replace the entry for `bundle_id`.
    pub fn set_application(&mut self, bundle_id: impl Into<String>, entry: AppEntry)
    {
        self.applications.insert(bundle_id.into(), entry);
    }

    /// Drop the entry for `bundle_id`, returning it if there was one.
    pub fn remove_application(&mut self, bundle_id: &str) -> Option<AppEntry>
    {
        self.applications.remove(bundle_id)
    }
}

fn read_plist<T: DeserializeOwned>(path: &Path) -> Result<Option<T>>
{
    if !path.exists() {
        trace!("{} does not exist, using defaults", path.display());
        return Ok(None);
    }

    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Ok(None);
    }

    plist::from_bytes(&bytes)
        .map(Some)
        .map_err(|e| DissectorError::Preferences(format!("{}: {e}", path.display())))
}

fn write_plist<T: Serialize>(path: &Path, value: &T) -> Result<()>
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    plist::to_file_xml(path, value).map_err(|e| DissectorError::Preferences(format!("{}: {e}", path.display())))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn app() -> ProcessContext
    {
        ProcessContext::new("com.example.app")
    }

    #[test]
    fn test_defaults_resolve_to_none()
    {
        let prefs = Preferences::default();
        assert_eq!(prefs.resolve(&app()), DebuggerType::None);
        assert_eq!(prefs.resolve(&ProcessContext::new("com.apple.springboard")), DebuggerType::None);
    }

    #[test]
    fn test_enabled_app_uses_global_debugger()
    {
        let mut prefs = Preferences::default();
        prefs.set_application("com.example.app", AppEntry::Enabled(true));
        assert_eq!(prefs.resolve(&app()), DebuggerType::Reveal);

        prefs.set_debugger(DebuggerType::SparkInspector);
        assert_eq!(prefs.resolve(&app()), DebuggerType::SparkInspector);
    }

    #[test]
    fn test_override_and_disable()
    {
        let mut prefs = Preferences::default();
        prefs.set_application("com.example.app", AppEntry::Debugger(DebuggerType::SparkInspector));
        assert_eq!(prefs.resolve(&app()), DebuggerType::SparkInspector);

        prefs.set_enabled(false);
        assert_eq!(prefs.resolve(&app()), DebuggerType::None);

        prefs.set_enabled(true);
        prefs.set_application("com.example.app", AppEntry::Enabled(false));
        assert_eq!(prefs.resolve(&app()), DebuggerType::None);
    }

    #[test]
    fn test_springboard_switch()
    {
        let springboard = ProcessContext::new("com.apple.springboard");
        let mut prefs = Preferences::default();
        // Application entries never apply to SpringBoard
        prefs.set_application("com.apple.springboard", AppEntry::Enabled(true));
        assert_eq!(prefs.resolve(&springboard), DebuggerType::None);

        prefs.settings.enable_in_springboard = true;
        assert_eq!(prefs.resolve(&springboard), DebuggerType::Reveal);
    }
}
