//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Select pretty or JSON output
//! - Apply the configured level, unless `RUST_LOG` overrides it

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Default filter: this crate at `level`, dependencies at info.
pub fn default_filter(level: &str) -> String {
    format!("info,raiden_deploy={level}")
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
