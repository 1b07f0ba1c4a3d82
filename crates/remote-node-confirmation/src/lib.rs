//! # Remote Node Confirmation
//!
//! Statistical trust for light clients that talk to untrusted remote nodes.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A light client forwards most API calls to a single serving node it does
//! not control. For read-only requests that any honest node would answer
//! the same way, this crate replays the request on a random sample of
//! other known nodes, compares the canonicalized answers and turns the
//! agreement rate over the last 20 requests into a trust indicator.
//!
//! It does not validate ledger content cryptographically; agreement across
//! independent nodes is the only evidence collected.
//!
//! ## Flow
//!
//! ```text
//! PeerDiscoveryLoop ──replace_all──▶ NodeRegistry
//!                                       │ sample
//! confirm_response ──▶ ConfirmationCoordinator ──▶ RemoteTransport (per validator)
//!                            │ canonicalize        │
//!                            ▼                     ▼
//!                       RollingLog ◀──── tally on each answer
//!                            │ score
//!                            ▼
//!                     ConfirmationSink (rows + color + trusted)
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! remote-node-confirmation/
//! ├── domain/          # Node, ConfirmationReport, RollingLog, NodeRegistry, errors
//! ├── algorithms/      # Canonicalization, request catalog, trust scoring
//! ├── ports/           # API trait (inbound) + transport/settings/sink (outbound)
//! ├── adapters/        # Config-backed settings, tracing sink
//! ├── application/     # Coordinator, discovery loop, ConfirmationService
//! ├── telemetry.rs     # tracing-subscriber setup
//! └── config.rs        # ConfirmationConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

// Re-exports
pub use adapters::{ConfigSettings, TracingSink};
pub use algorithms::{
    attachment_kinds, base_request_type, canonicalize, indicator_color, rejection_ratio, score,
    RequestCatalog, DISTRUSTED_COLOR, TRUSTED_COLOR, WARNING_COLOR,
};
pub use application::{
    ConfirmationCoordinator, ConfirmationService, PeerDiscoveryLoop, TrustContext,
};
pub use config::{ConfirmationConfig, LoggingConfig};
pub use domain::{
    AttachmentKind, ConfirmationError, ConfirmationReport, Node, NodeRegistry, ReportId,
    ReportRow, ReportState, ReportSummary, RequestTraits, Rgb, RollingLog, TrustSnapshot,
    TrustUpdate, DEFAULT_VALIDATORS_COUNT, PEER_REFRESH_INTERVAL, ROLLING_LOG_CAPACITY,
    invariant_disjoint_tally, invariant_log_bounded,
};
pub use ports::{
    ConfirmationApi, ConfirmationHandle, ConfirmationSink, MockTransport, RecordingSink,
    RemoteRequest, RemoteTransport, RequestOptions, SettingsProvider,
};
pub use telemetry::init_logging;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_protocol_constants() {
        assert_eq!(ROLLING_LOG_CAPACITY, 20);
        assert_eq!(PEER_REFRESH_INTERVAL.as_secs(), 30);
        assert_eq!(DEFAULT_VALIDATORS_COUNT, 3);
    }
}
