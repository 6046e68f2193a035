//! Log output for tests.
//!
//! Mocks emit `tracing` events (`trace!` per call when
//! [`MockConfig::trace_calls`](crate::MockConfig) is set, `debug!` for
//! lifecycle changes and panicking implementations). Install a subscriber to
//! see them; `RUST_LOG` selects the level.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Install a fmt subscriber writing through the test harness.
///
/// Safe to call from every test; returns `true` only for the call that
/// installed the subscriber.
pub fn init_test_logging() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .with_ansi(false)
        .try_init()
        .is_ok()
}
