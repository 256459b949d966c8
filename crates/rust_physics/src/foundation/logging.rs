//! Logging utilities
//!
//! The library logs through the `log` facade only; binaries pick the backend.

pub use log::{debug, error, info, trace, warn};

/// Initialize `env_logger` from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize `env_logger` with a default level that `RUST_LOG` can still override.
/// Safe to call more than once; later calls are ignored.
pub fn init_with_level(level: log::LevelFilter) {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
