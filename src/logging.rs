//! Tracing subscriber setup for applications embedding the analytics

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{AnalyticsError, Result};

/// Install a global subscriber writing compact logs to stderr.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (usually
/// `Settings.general.log_level`) applies. Calling this twice returns an
/// error rather than replacing the first subscriber.
pub fn init_tracing(default_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| AnalyticsError::Config(format!("invalid log level '{}': {}", default_level, e)))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| AnalyticsError::Config(format!("tracing already initialized: {}", e)))
}
