//! Debug-build diagnostics.

/// Tag prefixed to every [`ds_log!`](crate::ds_log) line, also used as the `tracing` target.
pub const DEBUG_TAG: &str = "Dissector";

/// Emit `Dissector! file:line: message` at debug level
///
/// Only debug builds log; in release builds the branch is compiled out
/// (the arguments are still type-checked).
///
/// ```rust
/// use dissector_utils::ds_log;
///
/// let bundle_id = "com.example.app";
/// ds_log!("injected into {}", bundle_id);
/// ```
#[macro_export]
macro_rules! ds_log {
    ($($arg:tt)+) => {
        if cfg!(debug_assertions) {
            $crate::tracing::debug!(
                target: "Dissector",
                "{}! {}:{}: {}",
                $crate::DEBUG_TAG,
                file!(),
                line!(),
                format_args!($($arg)+)
            );
        }
    };
}
