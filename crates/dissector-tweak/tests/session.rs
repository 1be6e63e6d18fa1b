//! Tests for preference-driven sessions

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dissector_core::config::Config;
use dissector_core::preferences::{AppEntry, Preferences};
use dissector_core::registry::{REVEAL_FLAGS, SPARK_INSPECTOR_FLAGS};
use dissector_core::{
    DebuggerActions, DebuggerHandle, DebuggerProperties, DebuggerRegistry, DebuggerType, DissectorError,
    ProcessContext, Result,
};
use dissector_tweak::Session;

const APP: &str = "com.example.app";

#[derive(Clone)]
struct StubActions
{
    debugger: DebuggerType,
    live: Arc<AtomicUsize>,
}

impl DebuggerActions for StubActions
{
    fn load(&self) -> Result<DebuggerHandle>
    {
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(DebuggerHandle::new(self.debugger, ()))
    }

    fn unload(&self, handle: DebuggerHandle) -> Result<()>
    {
        handle.ensure_debugger(self.debugger)?;
        self.live.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Fixture
{
    _dir: tempfile::TempDir,
    config: Config,
    reveal: Arc<AtomicUsize>,
    spark: Arc<AtomicUsize>,
}

impl Fixture
{
    fn new() -> Self
    {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        Self {
            _dir: dir,
            config,
            reveal: Arc::new(AtomicUsize::new(0)),
            spark: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn session(&self, bundle_id: &str) -> Session
    {
        let mut registry = DebuggerRegistry::new();
        for (debugger, flags, live) in [
            (DebuggerType::Reveal, REVEAL_FLAGS, &self.reveal),
            (DebuggerType::SparkInspector, SPARK_INSPECTOR_FLAGS, &self.spark),
        ] {
            let actions = StubActions {
                debugger,
                live: Arc::clone(live),
            };
            registry.register(DebuggerProperties::new(debugger, flags, actions)).unwrap();
        }
        Session::with_registry(self.config.clone(), registry, ProcessContext::new(bundle_id), "Example")
    }

    fn edit(&self, edit: impl FnOnce(&mut Preferences))
    {
        let mut prefs = Preferences::load(&self.config).unwrap();
        edit(&mut prefs);
        prefs.save(&self.config).unwrap();
    }
}

fn config(dir: &Path) -> Config
{
    Config {
        settings_plist: dir.join("settings.plist"),
        applications_plist: dir.join("applications.plist"),
        reveal_library: dir.join("Reveal.dylib"),
        spark_inspector_library: dir.join("SparkInspector.dylib"),
    }
}

#[test]
fn test_unconfigured_app_loads_nothing()
{
    let fixture = Fixture::new();
    let mut session = fixture.session(APP);

    assert!(session.refresh().unwrap().is_none());
    assert_eq!(session.controller().active(), DebuggerType::None);
}

#[test]
fn test_refresh_follows_preferences()
{
    let fixture = Fixture::new();
    fixture.edit(|prefs| prefs.set_application(APP, AppEntry::Enabled(true)));

    let mut session = fixture.session(APP);
    assert!(session.refresh().unwrap().is_none());
    assert_eq!(session.controller().active(), DebuggerType::Reveal);
    assert_eq!(fixture.reveal.load(Ordering::SeqCst), 1);

    fixture.edit(|prefs| prefs.set_enabled(false));
    assert!(session.refresh().unwrap().is_none());
    assert_eq!(session.controller().active(), DebuggerType::None);
    assert_eq!(fixture.reveal.load(Ordering::SeqCst), 0);
}

#[test]
fn test_restart_prompt_shown_once()
{
    let fixture = Fixture::new();
    fixture.edit(|prefs| prefs.set_application(APP, AppEntry::Debugger(DebuggerType::SparkInspector)));

    let mut session = fixture.session(APP);
    assert!(session.refresh().unwrap().is_none());
    assert_eq!(session.controller().active(), DebuggerType::SparkInspector);

    fixture.edit(|prefs| prefs.set_application(APP, AppEntry::Debugger(DebuggerType::Reveal)));
    let prompt = session.refresh().unwrap().expect("restart prompt");
    assert!(prompt.message.starts_with("Example has to be restarted"));

    // Same request again: no second prompt, nothing changed
    assert!(session.refresh().unwrap().is_none());
    assert_eq!(session.controller().active(), DebuggerType::SparkInspector);
    assert_eq!(fixture.reveal.load(Ordering::SeqCst), 0);
    assert_eq!(fixture.spark.load(Ordering::SeqCst), 1);
}

#[test]
fn test_restart_prompt_can_be_disabled()
{
    let fixture = Fixture::new();
    fixture.edit(|prefs| prefs.set_application(APP, AppEntry::Debugger(DebuggerType::SparkInspector)));

    let mut session = fixture.session(APP);
    session.refresh().unwrap();

    fixture.edit(|prefs| {
        prefs.settings.prompt_for_restart = false;
        prefs.set_enabled(false);
    });
    assert!(session.refresh().unwrap().is_none());
    assert_eq!(session.controller().active(), DebuggerType::SparkInspector);
}

#[test]
fn test_springboard_skips_unsupported_debugger()
{
    let fixture = Fixture::new();
    fixture.edit(|prefs| {
        prefs.settings.enable_in_springboard = true;
        prefs.set_debugger(DebuggerType::SparkInspector);
    });

    let mut session = fixture.session("com.apple.springboard");
    assert!(session.context().is_springboard());
    assert!(session.refresh().unwrap().is_none());
    assert_eq!(session.controller().active(), DebuggerType::None);
    assert_eq!(fixture.spark.load(Ordering::SeqCst), 0);
}

#[test]
fn test_springboard_unloads_when_switched_to_unsupported_debugger()
{
    let fixture = Fixture::new();
    fixture.edit(|prefs| prefs.settings.enable_in_springboard = true);

    let mut session = fixture.session("com.apple.springboard");
    session.refresh().unwrap();
    assert_eq!(session.controller().active(), DebuggerType::Reveal);

    fixture.edit(|prefs| prefs.set_debugger(DebuggerType::SparkInspector));
    assert!(session.refresh().unwrap().is_none());
    assert_eq!(session.controller().active(), DebuggerType::None);
    assert_eq!(fixture.reveal.load(Ordering::SeqCst), 0);
    assert_eq!(fixture.spark.load(Ordering::SeqCst), 0);
}

#[test]
fn test_malformed_preferences_are_reported()
{
    let fixture = Fixture::new();
    fs::write(&fixture.config.settings_plist, "not a plist").unwrap();

    let mut session = fixture.session(APP);
    assert!(matches!(session.refresh(), Err(DissectorError::Preferences(_))));
}

#[test]
fn test_shutdown_unloads_reveal()
{
    let fixture = Fixture::new();
    fixture.edit(|prefs| prefs.set_application(APP, AppEntry::Enabled(true)));

    let mut session = fixture.session(APP);
    session.refresh().unwrap();
    session.shutdown();
    assert_eq!(fixture.reveal.load(Ordering::SeqCst), 0);
    assert_eq!(session.controller().active(), DebuggerType::None);
}

#[test]
fn test_process_wide_session()
{
    let fixture = Fixture::new();
    fixture.edit(|prefs| prefs.set_application(APP, AppEntry::Enabled(true)));

    assert!(dissector_tweak::install(fixture.session(APP)).is_none());
    let active = dissector_tweak::with_session(|session| {
        session.refresh().unwrap();
        session.controller().active()
    });
    assert_eq!(active, Some(DebuggerType::Reveal));

    let mut session = dissector_tweak::uninstall().unwrap();
    assert!(dissector_tweak::with_session(|_| ()).is_none());
    session.shutdown();
    assert_eq!(fixture.reveal.load(Ordering::SeqCst), 0);
}
