//! Lifecycle fallback for processes without a UIKit host.

use tracing::info;

use crate::error::{DissectorError, Result};
use crate::lifecycle::ApplicationLifecycle;

/// [`ApplicationLifecycle`] built on plain process control
///
/// - terminate: `exit(0)`
/// - suspend: `task_suspend(mach_task_self())` on Apple platforms, `SIGSTOP` elsewhere
/// - launch: not available
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixLifecycle;

impl ApplicationLifecycle for PosixLifecycle
{
    fn terminate_with_success(&self)
    {
        info!("Terminating process {}", std::process::id());
        std::process::exit(0);
    }

    #[cfg(target_vendor = "apple")]
    fn suspend(&self) -> Result<()>
    {
        use mach2::kern_return::KERN_SUCCESS;

        info!("Suspending task");
        let result = unsafe { mach2::task::task_suspend(mach2::traps::mach_task_self()) };
        if result == KERN_SUCCESS {
            Ok(())
        } else {
            Err(DissectorError::Unsupported(format!("task_suspend failed: {result}")))
        }
    }

    #[cfg(not(target_vendor = "apple"))]
    fn suspend(&self) -> Result<()>
    {
        info!("Stopping process {}", std::process::id());
        if unsafe { libc::raise(libc::SIGSTOP) } == 0 {
            Ok(())
        } else {
            Err(DissectorError::Io(std::io::Error::last_os_error()))
        }
    }

    fn launch_application(&self, bundle_id: &str, _suspended: bool) -> Result<bool>
    {
        Err(DissectorError::Unsupported(format!(
            "cannot launch {bundle_id} without SpringBoard"
        )))
    }
}
