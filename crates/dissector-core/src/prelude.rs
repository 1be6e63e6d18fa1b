//! Common module for library exports

pub use crate::config::Config;
pub use crate::debugger::{ActiveDebugger, DebuggerActions, DebuggerProperties};
pub use crate::error::{DissectorError, Result};
pub use crate::handle::DebuggerHandle;
pub use crate::lifecycle::ApplicationLifecycle;
pub use crate::preferences::{AppEntry, Preferences, Settings};
pub use crate::prompt::{handle_response, PromptResponse, RestartPrompt};
pub use crate::registry::{DebuggerController, DebuggerRegistry, Transition};
pub use crate::types::{DebuggerFlags, DebuggerType, ProcessContext};
