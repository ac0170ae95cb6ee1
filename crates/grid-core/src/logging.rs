//! Logging setup, powered by tracing-subscriber
//!
//! Console output only; compact text or JSON lines. `RUST_LOG`, when set,
//! takes precedence over the configured directives.

use crate::config::{ConfigError, LogConfig, LogFormat};
use tracing_subscriber::EnvFilter;

/// Build the `EnvFilter` from the base level and per-target overrides.
fn build_env_filter(config: &LogConfig) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut directives = vec![config.level.clone()];
    for (target, level) in &config.targets {
        directives.push(format!("{target}={level}"));
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| ConfigError::Invalid(format!("invalid tracing filter '{filter_str}': {e}")))
}

/// Install the global subscriber.
///
/// # Errors
/// - `ConfigError::Invalid` for a bad filter directive or when a global
///   subscriber is already installed
pub fn init_logging(config: &LogConfig) -> Result<(), ConfigError> {
    let filter = build_env_filter(config)?;

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    result.map_err(|e| ConfigError::Invalid(format!("logging already initialised: {e}")))
}
