//! Support for tracing execution of a generator.

use tracing_subscriber::{fmt::Subscriber, prelude::*, EnvFilter};

/// The filter used when `RUST_LOG` is unset or can't be parsed.
const DEFAULT_FILTER: &str = "info";

/// Set up the `tracing` library with reasonable options.
///
/// Logs go to standard error, filtered by `RUST_LOG`.
pub fn initialize_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .finish()
        .init();
}
