//! Command implementations. Each one reads the preferences named by the
//! configuration, applies its change, and reports on `out`.

use std::io::Write;

use dissector_core::config::Config;
use dissector_core::platform::inspect_image;
use dissector_core::preferences::{AppEntry, Preferences};
use dissector_core::registry::{REVEAL_FLAGS, SPARK_INSPECTOR_FLAGS};
use dissector_core::types::{DebuggerFlags, DebuggerType, ProcessContext};
use dissector_core::{DissectorError, Result};
use dissector_utils::info;

/// Edit applied to one application entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppChange
{
    Enable,
    Disable,
    Override(DebuggerType),
    Remove,
}

fn flags_for(debugger: DebuggerType) -> DebuggerFlags
{
    match debugger {
        DebuggerType::Reveal => REVEAL_FLAGS,
        DebuggerType::SparkInspector => SPARK_INSPECTOR_FLAGS,
        DebuggerType::None => DebuggerFlags::default(),
    }
}

fn describe_flags(flags: DebuggerFlags) -> String
{
    let mut parts = Vec::new();
    if flags.supports_springboard() {
        parts.push("springboard");
    }
    if flags.supports_dynamic_unloading() {
        parts.push("dynamic-unload");
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(",")
    }
}

pub fn list(config: &Config, out: &mut impl Write) -> Result<()>
{
    for debugger in DebuggerType::LOADABLE {
        let Some(path) = config.library_path(debugger) else {
            continue;
        };
        let state = match inspect_image(path) {
            Ok(image) if image.is_loadable() => "installed".to_string(),
            Ok(_) => "not a dynamic library".to_string(),
            Err(DissectorError::LibraryNotFound(_)) => "missing".to_string(),
            Err(e) => e.to_string(),
        };
        writeln!(
            out,
            "{:<16} {:<28} {} ({})",
            debugger,
            describe_flags(flags_for(debugger)),
            path.display(),
            state
        )?;
    }
    Ok(())
}

pub fn status(config: &Config, bundle_id: Option<&str>, out: &mut impl Write) -> Result<()>
{
    let prefs = Preferences::load(config)?;
    let settings = &prefs.settings;
    writeln!(out, "Enabled:            {}", settings.enabled)?;
    writeln!(out, "Debugger:           {}", settings.debugger)?;
    writeln!(out, "SpringBoard:        {}", settings.enable_in_springboard)?;
    writeln!(out, "Prompt for restart: {}", settings.prompt_for_restart)?;

    if !prefs.applications.is_empty() {
        writeln!(out, "Applications:")?;
        for (bundle, entry) in &prefs.applications {
            let value = match entry {
                AppEntry::Enabled(true) => "on".to_string(),
                AppEntry::Enabled(false) => "off".to_string(),
                AppEntry::Debugger(debugger) => debugger.to_string(),
            };
            writeln!(out, "  {bundle}: {value}")?;
        }
    }

    if let Some(bundle_id) = bundle_id {
        let context = ProcessContext::new(bundle_id);
        writeln!(out, "{bundle_id} -> {}", prefs.resolve(&context))?;
    }
    Ok(())
}

pub fn set_debugger(config: &Config, debugger: DebuggerType, out: &mut impl Write) -> Result<()>
{
    update(config, out, |prefs| {
        prefs.set_debugger(debugger);
        format!("Debugger set to {debugger}")
    })
}

pub fn set_enabled(config: &Config, enabled: bool, out: &mut impl Write) -> Result<()>
{
    update(config, out, |prefs| {
        prefs.set_enabled(enabled);
        let state = if enabled { "enabled" } else { "disabled" };
        format!("Dissector {state}")
    })
}

pub fn set_springboard(config: &Config, enabled: bool, out: &mut impl Write) -> Result<()>
{
    update(config, out, |prefs| {
        prefs.settings.enable_in_springboard = enabled;
        format!("SpringBoard: {}", if enabled { "on" } else { "off" })
    })
}

pub fn configure_app(config: &Config, bundle_id: &str, change: AppChange, out: &mut impl Write) -> Result<()>
{
    if bundle_id.trim().is_empty() {
        return Err(DissectorError::InvalidArgument("bundle identifier cannot be empty".to_string()));
    }

    update(config, out, |prefs| match change {
        AppChange::Enable => {
            prefs.set_application(bundle_id, AppEntry::Enabled(true));
            format!("{bundle_id}: on")
        }
        AppChange::Disable => {
            prefs.set_application(bundle_id, AppEntry::Enabled(false));
            format!("{bundle_id}: off")
        }
        AppChange::Override(debugger) => {
            prefs.set_application(bundle_id, AppEntry::Debugger(debugger));
            format!("{bundle_id}: {debugger}")
        }
        AppChange::Remove => match prefs.remove_application(bundle_id) {
            Some(_) => format!("{bundle_id}: removed"),
            None => format!("{bundle_id}: not configured"),
        },
    })
}

pub fn check_library(config: &Config, debugger: DebuggerType, out: &mut impl Write) -> Result<()>
{
    let path = config
        .library_path(debugger)
        .ok_or_else(|| DissectorError::InvalidArgument(format!("{debugger} has no library")))?;
    let image = inspect_image(path)?;
    writeln!(
        out,
        "{}: {:?} {} {}",
        path.display(),
        image.format,
        image.architecture,
        if image.is_loadable() { "ok" } else { "not a dynamic library" }
    )?;
    Ok(())
}

fn update(config: &Config, out: &mut impl Write, edit: impl FnOnce(&mut Preferences) -> String) -> Result<()>
{
    let mut prefs = Preferences::load(config)?;
    let message = edit(&mut prefs);
    prefs.save(config)?;
    info!("{message}");
    writeln!(out, "{message}")?;
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn config(dir: &std::path::Path) -> Config
    {
        Config {
            settings_plist: dir.join("settings.plist"),
            applications_plist: dir.join("applications.plist"),
            reveal_library: dir.join("Reveal.dylib"),
            spark_inspector_library: dir.join("SparkInspector.dylib"),
        }
    }

    fn output(run: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String
    {
        let mut buf = Vec::new();
        run(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_configure_app_and_status()
    {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        output(|out| set_debugger(&config, DebuggerType::SparkInspector, out));
        output(|out| configure_app(&config, "com.example.app", AppChange::Enable, out));
        output(|out| configure_app(&config, "com.example.other", AppChange::Override(DebuggerType::Reveal), out));

        let text = output(|out| status(&config, Some("com.example.app"), out));
        assert!(text.contains("Debugger:           SparkInspector"));
        assert!(text.contains("com.example.other: Reveal"));
        assert!(text.contains("com.example.app -> SparkInspector"));

        output(|out| set_enabled(&config, false, out));
        let text = output(|out| status(&config, Some("com.example.app"), out));
        assert!(text.contains("com.example.app -> None"));
    }

    #[test]
    fn test_remove_unknown_app()
    {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let text = output(|out| configure_app(&config, "com.example.app", AppChange::Remove, out));
        assert_eq!(text.trim(), "com.example.app: not configured");
        assert!(configure_app(&config, " ", AppChange::Enable, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_list_reports_missing_libraries()
    {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let text = output(|out| list(&config, out));
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|line| line.ends_with("(missing)")));
        assert!(text.contains("springboard,dynamic-unload"));
    }

    #[test]
    fn test_check_library_none_is_invalid()
    {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        assert!(matches!(
            check_library(&config, DebuggerType::None, &mut Vec::new()),
            Err(DissectorError::InvalidArgument(_))
        ));
        assert!(matches!(
            check_library(&config, DebuggerType::Reveal, &mut Vec::new()),
            Err(DissectorError::LibraryNotFound(_))
        ));
    }
}
