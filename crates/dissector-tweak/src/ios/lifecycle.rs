//! [`ApplicationLifecycle`] backed by private `UIApplication` methods.

use dissector_core::lifecycle::ApplicationLifecycle;
use dissector_core::{DissectorError, Result};
use objc::runtime::{Class, Object, BOOL, NO, YES};
use objc::{msg_send, sel, sel_impl};

use super::foundation::ns_string;

/// `[UIApplication sharedApplication]` process control
#[derive(Debug, Clone, Copy, Default)]
pub struct UiApplicationLifecycle;

impl UiApplicationLifecycle
{
    fn shared_application() -> Result<*mut Object>
    {
        let cls = Class::get("UIApplication")
            .ok_or_else(|| DissectorError::Unsupported("UIKit is not loaded".to_string()))?;
        let app: *mut Object = unsafe { msg_send![cls, sharedApplication] };
        if app.is_null() {
            return Err(DissectorError::Unsupported("no UIApplication instance".to_string()));
        }
        Ok(app)
    }
}

impl ApplicationLifecycle for UiApplicationLifecycle
{
    fn terminate_with_success(&self)
    {
        match Self::shared_application() {
            Ok(app) => unsafe {
                let _: () = msg_send![app, terminateWithSuccess];
            },
            Err(_) => std::process::exit(0),
        }
    }

    fn suspend(&self) -> Result<()>
    {
        let app = Self::shared_application()?;
        unsafe {
            let _: () = msg_send![app, suspend];
        }
        Ok(())
    }

    fn launch_application(&self, bundle_id: &str, suspended: bool) -> Result<bool>
    {
        let app = Self::shared_application()?;
        let suspended: BOOL = if suspended { YES } else { NO };
        let launched: BOOL = unsafe {
            let identifier = ns_string(bundle_id);
            msg_send![app, launchApplicationWithIdentifier:identifier suspended:suspended]
        };
        Ok(launched != NO)
    }
}
