//! # Logging Setup
//!
//! Installs a `tracing-subscriber` for hosts that do not bring their own.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::domain::ConfirmationError;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.filter`. Returns `Ok(false)` if
/// a global subscriber was already installed.
///
/// # Errors
/// - `InvalidConfig` if the filter directive does not parse
pub fn init_logging(config: &LoggingConfig) -> Result<bool, ConfirmationError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| ConfirmationError::InvalidConfig(format!("log filter: {}", e)))?;

    let installed = if config.json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .is_ok()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::debug!(filter = %config.filter, json = config.json, "[confirm] Logging initialized");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        let config = LoggingConfig::default();
        init_logging(&config).unwrap();
        // A subscriber is in place now, whoever installed it.
        assert!(!init_logging(&config).unwrap());
    }
}
