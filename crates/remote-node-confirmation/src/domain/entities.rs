//! # Domain Entities
//!
//! Nodes, confirmation reports and the rolling log that holds them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, VecDeque};

use super::invariants::ROLLING_LOG_CAPACITY;
use super::value_objects::{ReportId, ReportRow, ReportState, ReportSummary};

/// A known remote node. Identity is `address`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Address used to reach the node.
    pub address: String,
    /// Address the node announces for itself.
    pub announced_address: String,
    /// Blacklisted nodes are never sampled.
    #[serde(default)]
    pub blacklisted: bool,
}

impl Node {
    /// Create a node announcing its own address.
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            announced_address: address.clone(),
            address,
            blacklisted: false,
        }
    }

    /// Create a node with a distinct announced address.
    pub fn with_announced(address: impl Into<String>, announced: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            announced_address: announced.into(),
            blacklisted: false,
        }
    }

    /// Build a node from one entry of a `getPeers` response.
    ///
    /// Returns `None` when the entry has no string `address`. Extra fields
    /// are ignored.
    pub fn from_peer_info(peer: &Value) -> Option<Self> {
        let address = peer.get("address")?.as_str()?.to_string();
        let announced_address = peer
            .get("announcedAddress")
            .and_then(Value::as_str)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| address.clone());
        let blacklisted = peer
            .get("blacklisted")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Some(Self {
            address,
            announced_address,
            blacklisted,
        })
    }

    /// Blacklist predicate, consulted at sample time.
    pub fn is_blacklisted(&self) -> bool {
        self.blacklisted
    }
}

/// Per-request record of which validators agreed and which disagreed.
///
/// A validator leaves `processing` exactly once and lands in at most one of
/// the two tallies; `processing` never regrows.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmationReport {
    id: ReportId,
    request_type: String,
    processing: BTreeSet<String>,
    confirming_nodes: Vec<Node>,
    rejecting_nodes: Vec<Node>,
    sample_size: usize,
}

impl ConfirmationReport {
    /// Create a report with every sampled node still processing.
    pub fn new<'a>(request_type: &str, sample: impl IntoIterator<Item = &'a Node>) -> Self {
        let processing: BTreeSet<String> = sample.into_iter().map(|n| n.address.clone()).collect();
        Self {
            id: ReportId::new(),
            request_type: request_type.to_string(),
            sample_size: processing.len(),
            processing,
            confirming_nodes: Vec::new(),
            rejecting_nodes: Vec::new(),
        }
    }

    /// Report id.
    pub fn id(&self) -> ReportId {
        self.id
    }

    /// Request type being cross-checked.
    pub fn request_type(&self) -> &str {
        &self.request_type
    }

    /// Addresses still awaiting an answer.
    pub fn processing(&self) -> &BTreeSet<String> {
        &self.processing
    }

    /// Validators whose answer matched, in arrival order.
    pub fn confirming_nodes(&self) -> &[Node] {
        &self.confirming_nodes
    }

    /// Validators whose answer differed, in arrival order.
    pub fn rejecting_nodes(&self) -> &[Node] {
        &self.rejecting_nodes
    }

    /// Number of validators sampled.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReportState {
        if self.processing.is_empty() {
            ReportState::Resolved
        } else if self.processing.len() == self.sample_size {
            ReportState::Created
        } else {
            ReportState::PartiallyResolved
        }
    }

    /// True once no validator is left processing.
    pub fn is_resolved(&self) -> bool {
        self.processing.is_empty()
    }

    /// Record a matching answer. Returns false if the node was not pending.
    pub fn resolve_confirmed(&mut self, node: Node) -> bool {
        if !self.processing.remove(&node.address) {
            return false;
        }
        self.confirming_nodes.push(node);
        true
    }

    /// Record a differing answer. Returns false if the node was not pending.
    pub fn resolve_rejected(&mut self, node: Node) -> bool {
        if !self.processing.remove(&node.address) {
            return false;
        }
        self.rejecting_nodes.push(node);
        true
    }

    /// Record a failed sub-request; the node joins neither tally.
    pub fn resolve_failed(&mut self, address: &str) -> bool {
        self.processing.remove(address)
    }

    /// Row handed to the UI sink.
    pub fn row(&self) -> ReportRow {
        ReportRow {
            request_type: self.request_type.clone(),
            confirming_addresses: self
                .confirming_nodes
                .iter()
                .map(|n| n.announced_address.clone())
                .collect(),
            rejecting_addresses: self
                .rejecting_nodes
                .iter()
                .map(|n| n.announced_address.clone())
                .collect(),
        }
    }

    /// Consolidated tally.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            id: self.id,
            request_type: self.request_type.clone(),
            sampled: self.sample_size,
            confirmations: self.confirming_nodes.len(),
            rejections: self.rejecting_nodes.len(),
        }
    }
}

/// Most-recent-first log of confirmation reports, bounded by
/// [`ROLLING_LOG_CAPACITY`].
#[derive(Clone, Debug, Default)]
pub struct RollingLog {
    reports: VecDeque<ConfirmationReport>,
}

impl RollingLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            reports: VecDeque::with_capacity(ROLLING_LOG_CAPACITY + 1),
        }
    }

    /// Insert at the front, evicting and returning the oldest report once
    /// the log is over capacity.
    pub fn push_front(&mut self, report: ConfirmationReport) -> Option<ConfirmationReport> {
        self.reports.push_front(report);
        if self.reports.len() > ROLLING_LOG_CAPACITY {
            self.reports.pop_back()
        } else {
            None
        }
    }

    /// Number of reports held.
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// True when no report is held.
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Reports, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &ConfirmationReport> {
        self.reports.iter()
    }

    /// Look up a report still held in the log.
    pub fn get(&self, id: ReportId) -> Option<&ConfirmationReport> {
        self.reports.iter().find(|r| r.id() == id)
    }

    /// Mutable lookup of a report still held in the log.
    pub fn get_mut(&mut self, id: ReportId) -> Option<&mut ConfirmationReport> {
        self.reports.iter_mut().find(|r| r.id() == id)
    }

    /// UI rows, most recent first.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.reports.iter().map(ConfirmationReport::row).collect()
    }
}
