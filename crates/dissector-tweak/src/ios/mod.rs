//! UIKit integration: load-time entry point and notification observer.

pub mod alert;
pub mod foundation;
pub mod lifecycle;
pub mod reveal;

use dissector_core::config::Config;
use dissector_core::registry::{DebuggerRegistry, REVEAL_FLAGS};
use dissector_core::types::{DebuggerType, ProcessContext};
use dissector_core::DebuggerProperties;
use dissector_utils::{ds_log, init_logging_for_tweak};
use objc::declare::ClassDecl;
use objc::runtime::{Class, Object, Sel};
use objc::{msg_send, sel, sel_impl};
use tracing::{error, info, warn};

use crate::Session;

const OBSERVER_CLASS: &str = "DSApplicationObserver";
const DID_BECOME_ACTIVE: &str = "UIApplicationDidBecomeActiveNotification";
const WILL_TERMINATE: &str = "UIApplicationWillTerminateNotification";

#[ctor::ctor]
fn init()
{
    // Nowhere to report a logging failure from inside another process
    let _ = init_logging_for_tweak(None);

    let Some(bundle_id) = foundation::bundle_identifier() else {
        warn!("No bundle identifier; not a UIKit application");
        return;
    };
    let app_name = foundation::display_name().unwrap_or_else(|| bundle_id.clone());
    let context = ProcessContext::new(bundle_id);
    ds_log!("injected into {}", context);

    let config = Config::from_env();
    let mut registry = DebuggerRegistry::with_defaults(&config);
    let reveal = reveal::RevealActions::new(&config.reveal_library);
    if let Err(e) = registry.register(DebuggerProperties::new(DebuggerType::Reveal, REVEAL_FLAGS, reveal)) {
        error!("Registering Reveal failed: {e}");
    }

    let mut session = Session::with_registry(config, registry, context, app_name);
    // Nothing is loaded yet, so the first refresh never needs a restart
    if let Err(e) = session.refresh() {
        error!("{}: {e}", session.context());
    }
    info!("{}: active debugger {}", session.context(), session.controller().active());
    crate::install(session);

    unsafe { observe_application() };
}

unsafe fn observe_application()
{
    let Some(superclass) = Class::get("NSObject") else {
        return;
    };
    if Class::get(OBSERVER_CLASS).is_none() {
        let Some(mut decl) = ClassDecl::new(OBSERVER_CLASS, superclass) else {
            return;
        };
        decl.add_method(
            sel!(applicationDidBecomeActive:),
            did_become_active as extern "C" fn(&Object, Sel, *mut Object),
        );
        decl.add_method(
            sel!(applicationWillTerminate:),
            will_terminate as extern "C" fn(&Object, Sel, *mut Object),
        );
        decl.register();
    }
    let (Some(cls), Some(center_cls)) = (Class::get(OBSERVER_CLASS), Class::get("NSNotificationCenter")) else {
        return;
    };

    // Observers live for the rest of the process
    let observer: *mut Object = msg_send![cls, new];
    let center: *mut Object = msg_send![center_cls, defaultCenter];
    for (selector, name) in [
        (sel!(applicationDidBecomeActive:), DID_BECOME_ACTIVE),
        (sel!(applicationWillTerminate:), WILL_TERMINATE),
    ] {
        let name = foundation::ns_string(name);
        let _: () = msg_send![center, addObserver:observer selector:selector name:name object:std::ptr::null_mut::<Object>()];
    }
}

extern "C" fn did_become_active(_this: &Object, _cmd: Sel, _notification: *mut Object)
{
    let prompt = crate::with_session(|session| {
        session.refresh().unwrap_or_else(|e| {
            error!("{}: {e}", session.context());
            None
        })
    });

    if let Some(Some(prompt)) = prompt {
        unsafe { alert::show(&prompt) };
    }
}

extern "C" fn will_terminate(_this: &Object, _cmd: Sel, _notification: *mut Object)
{
    if let Some(mut session) = crate::uninstall() {
        session.shutdown();
    }
}
