//! Subscriber setup for the storefront processes.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,hyper=warn";

/// Install the global JSON subscriber.
///
/// `RUST_LOG` overrides the default filter. Calling this twice is harmless;
/// the second install attempt is ignored.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
