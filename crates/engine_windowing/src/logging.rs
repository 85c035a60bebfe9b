//! Logging setup

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system with the default `info` filter.
///
/// `RUST_LOG` overrides the filter. Calling this more than once is harmless.
pub fn init() {
    init_with_level("info");
}

/// Initialize the logging system with `level` as the default filter
pub fn init_with_level(level: &str) {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .try_init();

    if result.is_err() {
        log::debug!("Logger already initialized");
    }
}
