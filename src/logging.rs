//! Tracing setup
//!
//! Installs a `tracing-subscriber` fmt subscriber. `RUST_LOG` takes
//! precedence over the configured filter.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&filter))
        .with_target(true)
        .try_init()
        .is_ok()
}
