//! Tracing setup shared by the binaries.
//!
//! The library only emits `tracing` events; nothing is printed unless a
//! binary installs this subscriber.

use tracing_subscriber::EnvFilter;

/// Filter directive variable, e.g. `EXECABLE_LOG=execable=debug`.
pub const LOG_ENV: &str = "EXECABLE_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Install a stderr fmt subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
