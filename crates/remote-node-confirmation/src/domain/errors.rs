//! # Domain Errors
//!
//! Error types for remote node confirmation.
//!
//! None of these escape the coordinator or the discovery loop; they are
//! logged and absorbed at the point of detection.

use thiserror::Error;

/// Remote node confirmation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfirmationError {
    /// Response could not be canonicalized (not an object, bad transactions list, ...).
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Transport failed to deliver a request or its answer.
    #[error("Transport error from {node}: {reason}")]
    Transport {
        /// Address of the node the request targeted
        node: String,
        /// Transport-level failure description
        reason: String,
    },

    /// Remote node answered with an error payload.
    #[error("Remote error {code}: {description}")]
    RemoteError {
        /// `errorCode` reported by the node
        code: i64,
        /// `errorDescription` reported by the node
        description: String,
    },

    /// Configuration values are out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(String),
}

impl From<toml::de::Error> for ConfirmationError {
    fn from(err: toml::de::Error) -> Self {
        ConfirmationError::ConfigParse(err.to_string())
    }
}
