//! Reveal descriptor.
//!
//! Reveal starts its server on `UIApplicationDidFinishLaunchingNotification`,
//! which has already been posted by the time a running application is
//! switched to Reveal. Its server listens for the request notifications
//! below instead.

use std::path::PathBuf;

use dissector_core::platform::DynamicLibraryDebugger;
use dissector_core::types::DebuggerType;
use dissector_core::{DebuggerActions, DebuggerHandle, Result};
use objc::runtime::{Class, Object};
use objc::{msg_send, sel, sel_impl};
use tracing::debug;

use super::foundation::ns_string;

const START_REQUEST: &str = "IBARevealRequestStart";
const STOP_REQUEST: &str = "IBARevealRequestStop";

/// Library-packaged Reveal plus server start/stop requests
#[derive(Debug)]
pub struct RevealActions
{
    library: DynamicLibraryDebugger,
}

impl RevealActions
{
    pub fn new(path: impl Into<PathBuf>) -> Self
    {
        Self {
            library: DynamicLibraryDebugger::new(DebuggerType::Reveal, path),
        }
    }
}

impl DebuggerActions for RevealActions
{
    fn load(&self) -> Result<DebuggerHandle>
    {
        let handle = self.library.load()?;
        post_notification(START_REQUEST);
        Ok(handle)
    }

    fn unload(&self, handle: DebuggerHandle) -> Result<()>
    {
        post_notification(STOP_REQUEST);
        self.library.unload(handle)
    }
}

fn post_notification(name: &str)
{
    debug!("Posting {name}");
    unsafe {
        let Some(cls) = Class::get("NSNotificationCenter") else {
            return;
        };
        let center: *mut Object = msg_send![cls, defaultCenter];
        let _: () = msg_send![center, postNotificationName: ns_string(name) object: std::ptr::null_mut::<Object>()];
    }
}
