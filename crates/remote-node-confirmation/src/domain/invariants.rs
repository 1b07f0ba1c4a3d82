//! # Domain Invariants
//!
//! Constants and rules that must always hold true.

use std::collections::HashSet;
use std::time::Duration;

use super::entities::ConfirmationReport;

/// Maximum number of reports kept in the rolling log.
pub const ROLLING_LOG_CAPACITY: usize = 20;

/// Delay between two peer-list refreshes.
pub const PEER_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Default number of validator nodes sampled per request.
pub const DEFAULT_VALIDATORS_COUNT: usize = 3;

/// Peer state requested from the serving node on refresh.
pub const PEER_STATE_CONNECTED: &str = "CONNECTED";

/// Request type used to refresh the peer list.
pub const GET_PEERS_REQUEST: &str = "getPeers";

/// Request type whose forward link is dropped before comparison.
pub const GET_BLOCK_REQUEST: &str = "getBlock";

/// Invariant: a node sits in at most one of processing / confirming / rejecting.
pub fn invariant_disjoint_tally(report: &ConfirmationReport) -> bool {
    let mut seen: HashSet<&str> = HashSet::new();
    let all = report
        .processing()
        .iter()
        .map(String::as_str)
        .chain(report.confirming_nodes().iter().map(|n| n.address.as_str()))
        .chain(report.rejecting_nodes().iter().map(|n| n.address.as_str()));
    for address in all {
        if !seen.insert(address) {
            return false;
        }
    }
    true
}

/// Invariant: the rolling log never grows past its capacity.
pub fn invariant_log_bounded(len: usize) -> bool {
    len <= ROLLING_LOG_CAPACITY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Node;

    #[test]
    fn test_invariant_disjoint_tally_pass() {
        let mut report = ConfirmationReport::new(
            "getBlock",
            vec![Node::new("b"), Node::new("c")].iter(),
        );
        report.resolve_confirmed(Node::new("b"));
        assert!(invariant_disjoint_tally(&report));
    }

    #[test]
    fn test_invariant_log_bounded() {
        assert!(invariant_log_bounded(0));
        assert!(invariant_log_bounded(ROLLING_LOG_CAPACITY));
        assert!(!invariant_log_bounded(ROLLING_LOG_CAPACITY + 1));
    }

    #[test]
    fn test_refresh_interval_is_thirty_seconds() {
        assert_eq!(PEER_REFRESH_INTERVAL.as_secs(), 30);
    }
}
