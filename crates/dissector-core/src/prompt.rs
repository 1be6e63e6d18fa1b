//! # Restart Prompt
//!
//! The alert shown when a debugger change cannot be applied in place.
//!
//! The injected library presents a [`RestartPrompt`] as a `UIAlertView`; its
//! delegate receives `alertView:clickedButtonAtIndex:` and forwards the index
//! to [`PromptResponse::from_button_index`] and [`handle_response`].

use tracing::{info, warn};

use crate::error::{DissectorError, Result};
use crate::lifecycle::ApplicationLifecycle;
use crate::registry::Transition;
use crate::types::{DebuggerType, ProcessContext};

/// Title used for every Dissector alert.
pub const PROMPT_TITLE: &str = "Dissector";
/// Index of the cancel button.
pub const DISMISS_BUTTON_INDEX: isize = 0;
/// Index of the restart button.
pub const RESTART_BUTTON_INDEX: isize = 1;

/// Alert contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartPrompt
{
    /// Alert title
    pub title: String,
    /// Alert body
    pub message: String,
    /// Button titles, in index order
    pub buttons: Vec<String>,
}

impl RestartPrompt
{
    /// Prompt for a transition that needs a restart.
    ///
    /// Returns `None` for every other transition.
    #[must_use]
    pub fn for_transition(transition: &Transition, app_name: &str) -> Option<Self>
    {
        let Transition::RestartRequired { current, desired } = transition else {
            return None;
        };

        let change = if desired.is_none() {
            format!("unload {}", describe(*current))
        } else {
            format!("switch from {} to {}", describe(*current), describe(*desired))
        };

        Some(Self {
            title: PROMPT_TITLE.to_string(),
            message: format!("{app_name} has to be restarted to {change}. Restart now?"),
            buttons: vec!["Later".to_string(), "Restart".to_string()],
        })
    }
}

fn describe(debugger: DebuggerType) -> &'static str
{
    match debugger {
        DebuggerType::None => "no debugger",
        DebuggerType::SparkInspector => "Spark Inspector",
        DebuggerType::Reveal => "Reveal",
    }
}

/// What the user chose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptResponse
{
    /// Keep running with the current debugger
    Dismiss,
    /// Restart the application now
    Restart,
}

impl PromptResponse
{
    /// Map an alert button index to a response. Unknown indices dismiss.
    #[must_use]
    pub const fn from_button_index(index: isize) -> Self
    {
        match index {
            RESTART_BUTTON_INDEX => Self::Restart,
            _ => Self::Dismiss,
        }
    }
}

/// Act on the user's choice.
///
/// A restart suspends the application, asks the host to launch it again,
/// and terminates the current instance. A failed relaunch is logged; the
/// instance is terminated regardless. `suspend` is expected to return
/// (UIKit backgrounds the app rather than stopping it).
///
/// ## Errors
///
/// - `Unsupported`: restarting SpringBoard from inside itself is refused
/// - any error from the lifecycle implementation
pub fn handle_response(
    response: PromptResponse,
    lifecycle: &dyn ApplicationLifecycle,
    context: &ProcessContext,
) -> Result<()>
{
    match response {
        PromptResponse::Dismiss => {
            info!("{context}: restart postponed");
            Ok(())
        }
        PromptResponse::Restart => {
            if context.is_springboard() {
                return Err(DissectorError::Unsupported(
                    "SpringBoard cannot relaunch itself".to_string(),
                ));
            }
            info!("{context}: restarting");
            lifecycle.suspend()?;
            // Once suspended the app must go away, relaunched or not
            match lifecycle.launch_application(context.bundle_id(), false) {
                Ok(true) => {}
                Ok(false) => warn!("{context}: host declined the relaunch request"),
                Err(e) => warn!("{context}: relaunch failed: {e}"),
            }
            lifecycle.terminate_with_success();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_button_indices()
    {
        assert_eq!(PromptResponse::from_button_index(0), PromptResponse::Dismiss);
        assert_eq!(PromptResponse::from_button_index(1), PromptResponse::Restart);
        assert_eq!(PromptResponse::from_button_index(7), PromptResponse::Dismiss);
        assert_eq!(PromptResponse::from_button_index(-1), PromptResponse::Dismiss);
    }

    #[test]
    fn test_prompt_only_for_restart()
    {
        assert!(RestartPrompt::for_transition(&Transition::Load(DebuggerType::Reveal), "App").is_none());

        let prompt = RestartPrompt::for_transition(
            &Transition::RestartRequired {
                current: DebuggerType::SparkInspector,
                desired: DebuggerType::Reveal,
            },
            "Maps",
        )
        .unwrap();
        assert_eq!(prompt.title, PROMPT_TITLE);
        assert!(prompt.message.starts_with("Maps has to be restarted"));
        assert!(prompt.message.contains("from Spark Inspector to Reveal"));
        assert_eq!(prompt.buttons.len(), 2);
        assert_eq!(prompt.buttons[RESTART_BUTTON_INDEX as usize], "Restart");
    }
}
