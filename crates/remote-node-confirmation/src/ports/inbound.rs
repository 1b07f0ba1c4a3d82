//! # Inbound Ports
//!
//! API trait defining what the confirmation subsystem offers its host.

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::domain::{Node, ReportId, ReportRow, TrustSnapshot, TrustUpdate};

/// In-flight verification sub-requests of one report.
///
/// Dropping the handle does not cancel anything; sub-requests cannot be
/// cancelled once dispatched.
#[derive(Debug)]
pub struct ConfirmationHandle {
    report_id: ReportId,
    tasks: Vec<JoinHandle<()>>,
}

impl ConfirmationHandle {
    /// Wrap the spawned sub-request tasks of a report.
    pub fn new(report_id: ReportId, tasks: Vec<JoinHandle<()>>) -> Self {
        Self { report_id, tasks }
    }

    /// Report the sub-requests belong to.
    pub fn report_id(&self) -> ReportId {
        self.report_id
    }

    /// Number of sub-requests dispatched.
    pub fn dispatched(&self) -> usize {
        self.tasks.len()
    }

    /// Wait until every sub-request has been tallied.
    pub async fn wait(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!("[confirm] Verification task failed: {}", e);
            }
        }
    }
}

/// Remote node confirmation API - inbound port.
pub trait ConfirmationApi: Send + Sync {
    /// Cross-check a response the serving node returned.
    ///
    /// Returns `None` when the request is not confirmable or its response
    /// cannot be canonicalized; nothing is sent in that case.
    ///
    /// # Panics
    /// Sub-requests are spawned with `tokio::spawn`, so this panics when
    /// called outside a Tokio runtime.
    fn confirm_response(
        &self,
        request_type: &str,
        params: &Value,
        response: &Value,
        serving_node: Option<&Node>,
    ) -> Option<ConfirmationHandle>;

    /// Whether responses to `request_type` get cross-checked.
    fn needs_confirmation(&self, request_type: &str) -> bool;

    /// Current trust indicator.
    fn trust_snapshot(&self) -> TrustSnapshot;

    /// Rolling-log rows, most recent first.
    fn report_rows(&self) -> Vec<ReportRow>;

    /// Rows and indicator read under one lock.
    fn trust_update(&self) -> TrustUpdate;
}
