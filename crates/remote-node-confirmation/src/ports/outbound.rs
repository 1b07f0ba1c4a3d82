//! # Outbound Ports
//!
//! Traits for external collaborators: the transport that performs requests,
//! the settings source and the UI sink.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::{ConfirmationError, Node, ReportSummary, TrustUpdate};

/// Payload field carrying a remote error code.
pub const ERROR_CODE_FIELD: &str = "errorCode";

/// Payload field carrying a remote error description.
pub const ERROR_DESCRIPTION_FIELD: &str = "errorDescription";

/// Routing options for an outgoing request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Do not route through the serving-node proxy.
    pub no_proxy: bool,
    /// Send to this node instead of the serving node.
    pub remote_node: Option<Node>,
    /// Send parameters without escaping.
    pub do_not_escape: bool,
}

impl RequestOptions {
    /// Options for a verification sub-request aimed at `node`.
    pub fn verification(node: Node) -> Self {
        Self {
            no_proxy: true,
            remote_node: Some(node),
            do_not_escape: true,
        }
    }
}

/// A request handed to the transport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteRequest {
    /// API request type.
    pub request_type: String,
    /// Request parameters, sent as-is.
    pub params: Value,
    /// Routing options.
    pub options: RequestOptions,
}

/// Transport - outbound port.
///
/// Each call completes exactly once, with a payload or an error. Timeouts
/// are the transport's concern.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Perform a request.
    async fn send(&self, request: RemoteRequest) -> Result<Value, ConfirmationError>;
}

/// Settings collaborator - outbound port.
pub trait SettingsProvider: Send + Sync {
    /// Number of validator nodes to sample per request.
    fn validators_count(&self) -> usize;

    /// Whether the peer list should keep refreshing.
    fn polling_enabled(&self) -> bool;

    /// Address of the node currently serving requests.
    fn serving_node(&self) -> Option<String>;
}

/// UI sink - outbound port.
///
/// Called with the rolling log locked, in tally order. Implementations must
/// not call back into the confirmation API from these methods.
pub trait ConfirmationSink: Send + Sync {
    /// Receive the rolling-log rows and trust indicator after a recompute.
    fn publish(&self, update: TrustUpdate);

    /// A report resolved with at least one rejecting validator.
    fn rejection_warning(&self, _summary: &ReportSummary) {}
}

/// Turn a payload carrying `errorCode` into an error.
pub fn check_remote_error(payload: Value) -> Result<Value, ConfirmationError> {
    let Some(code) = payload.get(ERROR_CODE_FIELD) else {
        return Ok(payload);
    };
    let code = code
        .as_i64()
        .or_else(|| code.as_str().and_then(|s| s.parse().ok()))
        .unwrap_or(-1);
    let description = payload
        .get(ERROR_DESCRIPTION_FIELD)
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    Err(ConfirmationError::RemoteError { code, description })
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Canned answer of the mock transport.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Answer with this payload.
    Payload(Value),
    /// Fail at the transport level.
    Fail(String),
}

/// Mock transport answering per target node.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, MockReply>>,
    serving_reply: Mutex<Option<MockReply>>,
    delays: Mutex<HashMap<String, Duration>>,
    sent: Mutex<Vec<RemoteRequest>>,
}

impl MockTransport {
    /// Create a transport with no canned answers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests targeting `address` with `payload`.
    pub fn with_reply(self, address: &str, payload: Value) -> Self {
        self.set_reply(address, MockReply::Payload(payload));
        self
    }

    /// Fail requests targeting `address`.
    pub fn with_failure(self, address: &str, reason: &str) -> Self {
        self.set_reply(address, MockReply::Fail(reason.to_string()));
        self
    }

    /// Delay answers from `address`.
    pub fn with_delay(self, address: &str, delay: Duration) -> Self {
        self.delays.lock().insert(address.to_string(), delay);
        self
    }

    /// Answer requests without a target node (the serving node).
    pub fn with_serving_reply(self, payload: Value) -> Self {
        self.set_serving_reply(MockReply::Payload(payload));
        self
    }

    /// Replace the answer for `address`.
    pub fn set_reply(&self, address: &str, reply: MockReply) {
        self.replies.lock().insert(address.to_string(), reply);
    }

    /// Replace the serving-node answer.
    pub fn set_serving_reply(&self, reply: MockReply) {
        *self.serving_reply.lock() = Some(reply);
    }

    /// Every request sent so far.
    pub fn sent(&self) -> Vec<RemoteRequest> {
        self.sent.lock().clone()
    }

    /// Number of requests sent so far.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl RemoteTransport for MockTransport {
    async fn send(&self, request: RemoteRequest) -> Result<Value, ConfirmationError> {
        let target = request
            .options
            .remote_node
            .as_ref()
            .map(|n| n.address.clone());
        self.sent.lock().push(request);

        let delay = target
            .as_ref()
            .and_then(|address| self.delays.lock().get(address).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = match &target {
            Some(address) => self.replies.lock().get(address).cloned(),
            None => self.serving_reply.lock().clone(),
        };
        let node = target.unwrap_or_else(|| "serving".to_string());
        match reply {
            Some(MockReply::Payload(payload)) => Ok(payload),
            Some(MockReply::Fail(reason)) => Err(ConfirmationError::Transport { node, reason }),
            None => Err(ConfirmationError::Transport {
                node,
                reason: "no route".to_string(),
            }),
        }
    }
}

/// Sink that records everything it receives.
#[derive(Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<TrustUpdate>>,
    warnings: Mutex<Vec<ReportSummary>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every update received, oldest first.
    pub fn updates(&self) -> Vec<TrustUpdate> {
        self.updates.lock().clone()
    }

    /// Most recent update.
    pub fn latest(&self) -> Option<TrustUpdate> {
        self.updates.lock().last().cloned()
    }

    /// Rejection warnings received, oldest first.
    pub fn warnings(&self) -> Vec<ReportSummary> {
        self.warnings.lock().clone()
    }
}

impl ConfirmationSink for RecordingSink {
    fn publish(&self, update: TrustUpdate) {
        self.updates.lock().push(update);
    }

    fn rejection_warning(&self, summary: &ReportSummary) {
        self.warnings.lock().push(summary.clone());
    }
}
