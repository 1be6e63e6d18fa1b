//! `UIAlertView` presentation of a [`RestartPrompt`] and its delegate.

use dissector_core::prompt::{handle_response, PromptResponse, RestartPrompt, DISMISS_BUTTON_INDEX};
use objc::declare::ClassDecl;
use objc::runtime::{Class, Object, Sel};
use objc::{msg_send, sel, sel_impl};
use tracing::{error, warn};

use super::foundation::ns_string;
use super::lifecycle::UiApplicationLifecycle;

const HANDLER_CLASS: &str = "DSAlertViewHandler";

fn handler_class() -> Option<&'static Class>
{
    if let Some(cls) = Class::get(HANDLER_CLASS) {
        return Some(cls);
    }
    let mut decl = ClassDecl::new(HANDLER_CLASS, Class::get("NSObject")?)?;
    unsafe {
        decl.add_method(
            sel!(alertView:clickedButtonAtIndex:),
            clicked_button as extern "C" fn(&Object, Sel, *mut Object, isize),
        );
    }
    Some(decl.register())
}

/// Present `prompt`.
///
/// # Safety
///
/// Must be called on the main thread with UIKit loaded.
pub unsafe fn show(prompt: &RestartPrompt)
{
    let (Some(handler_cls), Some(alert_cls)) = (handler_class(), Class::get("UIAlertView")) else {
        warn!("UIAlertView unavailable; restart prompt dropped");
        return;
    };

    // UIAlertView does not retain its delegate; the handler is never released
    let handler: *mut Object = msg_send![handler_cls, new];
    let alert: *mut Object = msg_send![alert_cls, new];
    let _: () = msg_send![alert, setTitle: ns_string(&prompt.title)];
    let _: () = msg_send![alert, setMessage: ns_string(&prompt.message)];
    let _: () = msg_send![alert, setDelegate: handler];
    for button in &prompt.buttons {
        let _: isize = msg_send![alert, addButtonWithTitle: ns_string(button)];
    }
    let _: () = msg_send![alert, setCancelButtonIndex: DISMISS_BUTTON_INDEX];
    let _: () = msg_send![alert, show];
    let _: () = msg_send![alert, release];
}

extern "C" fn clicked_button(_this: &Object, _cmd: Sel, _alert: *mut Object, index: isize)
{
    let response = PromptResponse::from_button_index(index);
    let Some(context) = crate::with_session(|session| session.context().clone()) else {
        return;
    };
    if let Err(e) = handle_response(response, &UiApplicationLifecycle, &context) {
        error!("{context}: {e}");
    }
}
