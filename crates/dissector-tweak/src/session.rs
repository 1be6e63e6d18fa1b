//! Per-process state of the injected library.
//!
//! A [`Session`] is created once when the library is loaded into an
//! application. Every [`refresh`](Session::refresh) re-reads the preference
//! files and moves the process to whatever debugger they now ask for.

use dissector_core::config::Config;
use dissector_core::preferences::Preferences;
use dissector_core::prompt::RestartPrompt;
use dissector_core::registry::{DebuggerController, DebuggerRegistry, Transition};
use dissector_core::types::{DebuggerType, ProcessContext};
use dissector_core::{DissectorError, Result};
use dissector_utils::ds_log;
use tracing::{info, warn};

/// Debugger state for the application this library was injected into
#[derive(Debug)]
pub struct Session
{
    config: Config,
    controller: DebuggerController,
    app_name: String,
    // Desired debugger the user was last asked to restart for
    prompted: Option<DebuggerType>,
}

impl Session
{
    /// Session backed by the library-packaged Reveal and Spark Inspector descriptors.
    #[must_use]
    pub fn new(config: Config, context: ProcessContext, app_name: impl Into<String>) -> Self
    {
        let registry = DebuggerRegistry::with_defaults(&config);
        Self::with_registry(config, registry, context, app_name)
    }

    /// Session with a caller-supplied registry.
    #[must_use]
    pub fn with_registry(
        config: Config,
        registry: DebuggerRegistry,
        context: ProcessContext,
        app_name: impl Into<String>,
    ) -> Self
    {
        Self {
            config,
            controller: DebuggerController::new(registry, context),
            app_name: app_name.into(),
            prompted: None,
        }
    }

    /// Controller owning the active debugger.
    pub fn controller(&self) -> &DebuggerController
    {
        &self.controller
    }

    /// Application this session runs in.
    pub fn context(&self) -> &ProcessContext
    {
        self.controller.context()
    }

    /// Re-read the preferences and apply the debugger they resolve to.
    ///
    /// Returns the prompt to show when the change needs a restart and the
    /// user wants to be asked. The same prompt is not returned twice in a
    /// row for the same desired debugger.
    ///
    /// A debugger that may not run in this process is logged and skipped.
    ///
    /// ## Errors
    ///
    /// - `Preferences`: a preference file could not be read
    /// - any load or unload failure from the controller
    pub fn refresh(&mut self) -> Result<Option<RestartPrompt>>
    {
        let prefs = Preferences::load(&self.config)?;
        let desired = prefs.resolve(self.controller.context());
        ds_log!("{} resolves to {}", self.controller.context(), desired);

        let transition = match self.controller.apply(desired) {
            Ok(transition) => transition,
            Err(DissectorError::Unsupported(reason)) => {
                warn!("{}: {reason}", self.controller.context());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if !matches!(transition, Transition::RestartRequired { .. }) {
            self.prompted = None;
            return Ok(None);
        }
        if !prefs.settings.prompt_for_restart || self.prompted == Some(desired) {
            return Ok(None);
        }

        self.prompted = Some(desired);
        Ok(RestartPrompt::for_transition(&transition, &self.app_name))
    }

    /// Unload the active debugger when the library is torn down.
    pub fn shutdown(&mut self)
    {
        match self.controller.shutdown() {
            Ok(true) => info!("{}: debugger unloaded", self.controller.context()),
            Ok(false) => info!("{}: {} stays loaded", self.controller.context(), self.controller.active()),
            Err(e) => warn!("{}: {e}", self.controller.context()),
        }
    }
}
