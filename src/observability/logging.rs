//! # Logging
//!
//! Tracing subscriber setup. `RUST_LOG` takes precedence over the
//! configured `LOG_LEVEL`.

use crate::config::{ControllerConfig, LogFormat};
use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// # Errors
///
/// Returns an error if the log level is not a valid filter directive or a
/// global subscriber is already installed.
pub fn init_tracing(config: &ControllerConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("Invalid LOG_LEVEL {:?}", config.log_level))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    result.map_err(|e| anyhow!("Failed to initialize tracing subscriber: {e}"))
}
