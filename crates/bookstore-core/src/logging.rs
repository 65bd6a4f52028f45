//! Tracing subscriber initialization from [`LoggingConfig`].

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::logging::LoggingConfig;
use crate::error::AppError;

/// Initialize the global tracing subscriber.
///
/// The `RUST_LOG` environment variable takes precedence over the configured
/// level. Returns an error if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        _ => fmt().pretty().with_env_filter(filter).try_init(),
    };

    result.map_err(|e| AppError::configuration(format!("Failed to init logging: {e}")))
}
