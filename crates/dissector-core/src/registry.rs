//! Debugger descriptor registry and the controller that drives it.
//!
//! The registry holds one [`DebuggerProperties`] per debugger type. The
//! controller owns the single [`ActiveDebugger`] record for this process and
//! turns "the user wants debugger X here" into the right sequence of
//! `load`/`unload` calls, consulting the descriptor flags first:
//!
//! - a debugger without `SUPPORTS_SPRINGBOARD` is never loaded into SpringBoard
//! - a debugger without `SUPPORTS_DYNAMIC_UNLOADING` is never unloaded in
//!   place; switching away from it requires a restart of the process
//!
//! At most one debugger is active at a time.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::debugger::{ActiveDebugger, DebuggerProperties};
use crate::error::{DissectorError, Result};
use crate::types::{DebuggerFlags, DebuggerType, ProcessContext};

/// Capabilities of the Reveal integration.
pub const REVEAL_FLAGS: DebuggerFlags =
    DebuggerFlags::SUPPORTS_SPRINGBOARD.union(DebuggerFlags::SUPPORTS_DYNAMIC_UNLOADING);
/// Capabilities of the Spark Inspector integration.
pub const SPARK_INSPECTOR_FLAGS: DebuggerFlags = DebuggerFlags::empty();

/// Descriptor lookup by debugger type
#[derive(Debug, Default)]
pub struct DebuggerRegistry
{
    descriptors: HashMap<DebuggerType, DebuggerProperties>,
}

impl DebuggerRegistry
{
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Registry with the library-backed Reveal and Spark Inspector descriptors.
    #[must_use]
    pub fn with_defaults(config: &Config) -> Self
    {
        use crate::platform::DynamicLibraryDebugger;

        let mut registry = Self::new();
        for (debugger, flags, path) in [
            (DebuggerType::Reveal, REVEAL_FLAGS, &config.reveal_library),
            (DebuggerType::SparkInspector, SPARK_INSPECTOR_FLAGS, &config.spark_inspector_library),
        ] {
            registry.descriptors.insert(
                debugger,
                DebuggerProperties::new(debugger, flags, DynamicLibraryDebugger::new(debugger, path)),
            );
        }
        registry
    }

    /// Add a descriptor, returning the one it replaced.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: the descriptor is for `DebuggerType::None`
    pub fn register(&mut self, properties: DebuggerProperties) -> Result<Option<DebuggerProperties>>
    {
        if properties.debugger.is_none() {
            return Err(DissectorError::InvalidArgument(
                "cannot register a descriptor for DebuggerType::None".to_string(),
            ));
        }
        debug!("Registering {} ({:?})", properties.debugger, properties.flags);
        Ok(self.descriptors.insert(properties.debugger, properties))
    }

    /// Descriptor for `debugger`.
    #[must_use]
    pub fn get(&self, debugger: DebuggerType) -> Option<&DebuggerProperties>
    {
        self.descriptors.get(&debugger)
    }

    /// Flags for `debugger`; empty for `None` and unregistered types.
    #[must_use]
    pub fn flags(&self, debugger: DebuggerType) -> DebuggerFlags
    {
        self.get(debugger).map(|p| p.flags).unwrap_or_default()
    }

    /// Registered debugger types, in declaration order.
    #[must_use]
    pub fn types(&self) -> Vec<DebuggerType>
    {
        let mut types: Vec<_> = self.descriptors.keys().copied().collect();
        types.sort();
        types
    }
}

/// What the controller will do (or did) to reach a desired debugger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition
{
    /// The desired debugger is already the active one
    Unchanged(DebuggerType),
    /// Nothing active; load the desired debugger
    Load(DebuggerType),
    /// Unload the active debugger and leave nothing active
    Unload(DebuggerType),
    /// Unload the active debugger, then load another
    Switch
    {
        /// Currently active debugger
        from: DebuggerType,
        /// Debugger to load
        to: DebuggerType,
    },
    /// The active debugger cannot be unloaded in place
    RestartRequired
    {
        /// Currently active debugger
        current: DebuggerType,
        /// Debugger the user asked for
        desired: DebuggerType,
    },
    /// The desired debugger cannot be used in this process
    Rejected
    {
        /// Debugger the user asked for
        desired: DebuggerType,
        /// Why it was rejected
        reason: String,
    },
}

impl fmt::Display for Transition
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Self::Unchanged(debugger) => write!(f, "{debugger} unchanged"),
            Self::Load(debugger) => write!(f, "load {debugger}"),
            Self::Unload(debugger) => write!(f, "unload {debugger}"),
            Self::Switch { from, to } => write!(f, "switch {from} -> {to}"),
            Self::RestartRequired { current, desired } => {
                write!(f, "restart required to switch {current} -> {desired}")
            }
            Self::Rejected { desired, reason } => write!(f, "{desired} rejected: {reason}"),
        }
    }
}

/// Owner of the active debugger record for this process
pub struct DebuggerController
{
    registry: DebuggerRegistry,
    context: ProcessContext,
    active: Option<ActiveDebugger>,
    // Debugger whose unload failed; still mapped, but its handle is gone
    stranded: Option<DebuggerType>,
}

impl DebuggerController
{
    /// Controller for `context` with nothing loaded.
    #[must_use]
    pub fn new(registry: DebuggerRegistry, context: ProcessContext) -> Self
    {
        Self {
            registry,
            context,
            active: None,
            stranded: None,
        }
    }

    /// The registry backing this controller.
    #[must_use]
    pub fn registry(&self) -> &DebuggerRegistry
    {
        &self.registry
    }

    /// The process this controller runs in.
    #[must_use]
    pub fn context(&self) -> &ProcessContext
    {
        &self.context
    }

    /// Debugger currently loaded, `None` if nothing is.
    ///
    /// A debugger whose `unload` failed still counts as loaded.
    #[must_use]
    pub fn active(&self) -> DebuggerType
    {
        self.active
            .as_ref()
            .map(|active| active.debugger)
            .or(self.stranded)
            .unwrap_or(DebuggerType::None)
    }

    /// Check whether `debugger` may be loaded into this process.
    ///
    /// ## Errors
    ///
    /// Returns the reason as a string when it may not.
    pub fn check_available(&self, debugger: DebuggerType) -> std::result::Result<(), String>
    {
        let Some(properties) = self.registry.get(debugger) else {
            return Err(format!("{debugger} is not registered"));
        };
        if self.context.is_springboard() && !properties.flags.supports_springboard() {
            return Err(format!("{debugger} cannot be loaded into SpringBoard"));
        }
        Ok(())
    }

    /// Work out how to get from the active debugger to `desired` without doing it.
    ///
    /// A `desired` debugger that may not run here is treated as `None` while
    /// something else is active, so the active one is still unloaded.
    #[must_use]
    pub fn plan(&self, desired: DebuggerType) -> Transition
    {
        let current = self.active();
        if desired == current {
            return Transition::Unchanged(current);
        }

        let mut target = desired;
        if !desired.is_none() {
            if let Err(reason) = self.check_available(desired) {
                if current.is_none() {
                    return Transition::Rejected { desired, reason };
                }
                debug!("{}: {reason}; unloading {current} instead", self.context);
                target = DebuggerType::None;
            }
        }

        if current.is_none() {
            return Transition::Load(target);
        }

        if self.stranded.is_some() || !self.registry.flags(current).supports_dynamic_unloading() {
            return Transition::RestartRequired { current, desired: target };
        }

        if target.is_none() {
            Transition::Unload(current)
        } else {
            Transition::Switch { from: current, to: target }
        }
    }

    /// Make `desired` the active debugger.
    ///
    /// `Unchanged` and `RestartRequired` are returned without touching
    /// anything; the caller decides whether to prompt for a restart.
    ///
    /// If a switch fails while loading the new debugger, nothing is active
    /// afterwards. If unloading fails, the old debugger still counts as
    /// active and every later change needs a restart.
    ///
    /// ## Errors
    ///
    /// - `Unsupported`: `desired` was rejected for this process
    /// - any error from the descriptor's `load` or `unload`
    pub fn apply(&mut self, desired: DebuggerType) -> Result<Transition>
    {
        let transition = self.plan(desired);
        info!("{}: {}", self.context, transition);

        match &transition {
            Transition::Unchanged(_) => {}
            Transition::RestartRequired { .. } => {
                warn!("{}: keeping {} loaded until the process restarts", self.context, self.active());
            }
            Transition::Rejected { reason, .. } => {
                return Err(DissectorError::Unsupported(reason.clone()));
            }
            Transition::Load(debugger) => self.load(*debugger)?,
            Transition::Unload(_) => self.unload_active()?,
            Transition::Switch { to, .. } => {
                self.unload_active()?;
                self.load(*to)?;
            }
        }

        Ok(transition)
    }

    /// Unload the active debugger if it supports it.
    ///
    /// Returns `false` when a debugger stays resident because it cannot be
    /// unloaded in place.
    ///
    /// ## Errors
    ///
    /// Any error from the descriptor's `unload`.
    pub fn shutdown(&mut self) -> Result<bool>
    {
        let current = self.active();
        if current.is_none() {
            return Ok(true);
        }
        if self.stranded.is_some() || !self.registry.flags(current).supports_dynamic_unloading() {
            debug!("{current} stays resident");
            return Ok(false);
        }
        self.unload_active()?;
        Ok(true)
    }

    fn load(&mut self, debugger: DebuggerType) -> Result<()>
    {
        let properties = self
            .registry
            .get(debugger)
            .ok_or_else(|| DissectorError::InvalidArgument(format!("{debugger} is not registered")))?;
        let handle = properties.actions.load()?;
        self.active = Some(ActiveDebugger { debugger, handle });
        Ok(())
    }

    fn unload_active(&mut self) -> Result<()>
    {
        let Some(active) = self.active.take() else {
            return Ok(());
        };
        let debugger = active.debugger;
        let properties = self
            .registry
            .get(debugger)
            .ok_or_else(|| DissectorError::InvalidArgument(format!("{debugger} is not registered")))?;
        let result = properties.actions.unload(active.handle);
        if let Err(e) = &result {
            error!("{}: unloading {debugger} failed: {e}", self.context);
            self.stranded = Some(debugger);
        }
        result
    }
}

impl fmt::Debug for DebuggerController
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("DebuggerController")
            .field("context", &self.context)
            .field("active", &self.active())
            .field("registered", &self.registry.types())
            .finish()
    }
}
