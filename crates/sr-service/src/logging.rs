//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Per-target log levels, e.g. `SAFEROUTE_LOG=sr_graph=debug,sr_routing=info`.
pub const LOG_ENV: &str = "SAFEROUTE_LOG";

static INIT: Once = Once::new();

/// Install a fmt subscriber filtered by `SAFEROUTE_LOG`, falling back to
/// `default_filter` when the variable is unset or invalid.
///
/// Idempotent.  If another global subscriber is already installed it is
/// left in place.
pub fn init(default_filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .try_init();
    });
}
