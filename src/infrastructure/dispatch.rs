use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Shared application callback taking one argument.
pub type Callback<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// Runs an application callback, logging and swallowing a panic so the caller keeps going.
///
/// Returns `false` if the callback panicked.
pub fn dispatch(label: &str, callback: impl FnOnce()) -> bool {
    match catch_unwind(AssertUnwindSafe(callback)) {
        Ok(()) => true,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!("Callback {} panicked: {}", label, reason);
            false
        }
    }
}
