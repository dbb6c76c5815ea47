//! Logging utilities
//!
//! The crate logs through the `log` facade. Binaries call [`init`] once to
//! install `env_logger`; the filter comes from `RUST_LOG`.

pub use log::{debug, error, info, trace, warn};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

/// Initialize the logging system.
///
/// Calling this more than once is harmless; later calls leave the first
/// logger in place.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Initialize logging with a fallback filter such as `"scene_core=debug"`.
pub fn init_with_filter(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("Logger already initialized");
    }
}

/// Route log output through the test harness capture.
#[cfg(test)]
pub(crate) fn init_for_tests() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
