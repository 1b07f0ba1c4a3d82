//! # Confirmation Configuration
//!
//! Configuration for the remote node confirmation service.

use serde::{Deserialize, Serialize};

use crate::algorithms::RequestCatalog;
use crate::domain::{ConfirmationError, RequestTraits, DEFAULT_VALIDATORS_COUNT};

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` overrides it.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Remote node confirmation configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Validator nodes sampled per confirmable request.
    pub validators_count: usize,

    /// Keep refreshing the peer list.
    pub polling_enabled: bool,

    /// Connected to the test network.
    pub testnet: bool,

    /// Address of the node serving requests, if known up front.
    pub serving_node: Option<String>,

    /// Extra request types that are safe to replay on other nodes.
    pub extra_forwardable: Vec<String>,

    /// Extra request types that mutate state.
    pub extra_post_only: Vec<String>,

    /// Logging setup.
    pub logging: LoggingConfig,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            validators_count: DEFAULT_VALIDATORS_COUNT,
            polling_enabled: true,
            testnet: false,
            serving_node: None,
            extra_forwardable: Vec::new(),
            extra_post_only: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ConfirmationConfig {
    /// Create a config for testing (no polling, two validators).
    pub fn for_testing() -> Self {
        Self {
            validators_count: 2,
            polling_enabled: false,
            testnet: true,
            logging: LoggingConfig {
                filter: "debug".to_string(),
                json: false,
            },
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfirmationError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfirmationError> {
        if self.validators_count == 0 {
            return Err(ConfirmationError::InvalidConfig(
                "validators_count must be at least 1".to_string(),
            ));
        }
        if let Some(name) = self
            .extra_forwardable
            .iter()
            .find(|name| self.extra_post_only.contains(name))
        {
            return Err(ConfirmationError::InvalidConfig(format!(
                "{} is listed both as forwardable and post-only",
                name
            )));
        }
        Ok(())
    }

    /// Built-in request catalog with this config's overrides applied.
    pub fn request_catalog(&self) -> RequestCatalog {
        let mut catalog = RequestCatalog::builtin();
        for name in &self.extra_forwardable {
            catalog.insert(name, RequestTraits::replayable());
        }
        for name in &self.extra_post_only {
            catalog.insert(name, RequestTraits::mutating());
        }
        catalog
    }
}
