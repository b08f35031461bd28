//! Small crate-wide convenience macros.

/// Debug-level log line under the widget's log target.
///
/// Silent unless the frontend debug toggle raised the max level (see
/// `logging::set_debug`).
///
/// ```rust,ignore
/// debug_log!("attached widget {}", key);
/// ```
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        ::log::debug!(target: "prompt_widget", $($arg)*)
    };
}
