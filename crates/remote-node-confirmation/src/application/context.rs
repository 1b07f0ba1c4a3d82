//! # Trust Context
//!
//! Per-client state: the node registry and the rolling log. Every mutation
//! of the log happens under one lock, so concurrent verification callbacks
//! never interleave inside a report.

use parking_lot::Mutex;

use crate::algorithms::score;
use crate::domain::{
    ConfirmationReport, NodeRegistry, ReportId, ReportRow, RollingLog, TrustSnapshot, TrustUpdate,
};

/// State owned by one light-client instance.
#[derive(Debug, Default)]
pub struct TrustContext {
    registry: NodeRegistry,
    log: Mutex<RollingLog>,
}

impl TrustContext {
    /// Create a context with an empty registry and log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context around an existing registry.
    pub fn with_registry(registry: NodeRegistry) -> Self {
        Self {
            registry,
            log: Mutex::new(RollingLog::new()),
        }
    }

    /// Known nodes.
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Run `f` with the log locked. Tally, snapshot and publish done inside
    /// one call are ordered against every other call.
    pub fn with_log<R>(&self, f: impl FnOnce(&mut RollingLog) -> R) -> R {
        f(&mut self.log.lock())
    }

    /// Copy of a report still held in the log.
    pub fn report(&self, id: ReportId) -> Option<ConfirmationReport> {
        self.log.lock().get(id).cloned()
    }

    /// Number of reports in the log.
    pub fn log_len(&self) -> usize {
        self.log.lock().len()
    }

    /// UI rows, most recent first.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.log.lock().rows()
    }

    /// Trust indicator for the current log.
    pub fn snapshot(&self) -> TrustSnapshot {
        score(self.log.lock().iter())
    }

    /// Rows and indicator taken from the same view of the log.
    pub fn trust_update(&self) -> TrustUpdate {
        update_of(&self.log.lock())
    }
}

/// Rows and indicator of a locked log.
pub fn update_of(log: &RollingLog) -> TrustUpdate {
    TrustUpdate {
        rows: log.rows(),
        snapshot: score(log.iter()),
    }
}
