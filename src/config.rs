//! Process-wide configuration flags.
//!
//! Request/response logging is off by default and is expected to be switched
//! on once during startup, before the registry starts serving lookups.

use std::sync::atomic::{AtomicBool, Ordering};

static LOG_REQUESTS: AtomicBool = AtomicBool::new(false);

/// Enable or disable verbose request/response logging.
pub fn set_log_requests(enabled: bool) {
    LOG_REQUESTS.store(enabled, Ordering::Relaxed);
}

/// Whether verbose request/response logging is enabled.
pub fn should_log_requests() -> bool {
    LOG_REQUESTS.load(Ordering::Relaxed)
}
