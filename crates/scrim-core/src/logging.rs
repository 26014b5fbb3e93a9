//! Logging setup for the overlay layer
//!
//! Hosts embed Scrim into a larger application, so logging is opt-in and
//! never panics if a global subscriber is already installed.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global tracing subscriber with the given default filter.
///
/// `SCRIM_LOG` overrides the default (standard `EnvFilter` syntax).
/// Returns `false` if a subscriber was already installed.
pub fn init_with_filter(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_env("SCRIM_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(version = crate::VERSION, "logging initialized");
    }
    installed
}

/// Install a global tracing subscriber with the default `scrim=info` filter
pub fn init() -> bool {
    init_with_filter("scrim=info")
}
