//! Tracing Sink Adapter
//!
//! Implements `ConfirmationSink` by logging every update. Useful for
//! headless hosts that have no UI to render the indicator.

use tracing::{info, warn};

use crate::domain::{ReportSummary, TrustUpdate};
use crate::ports::outbound::ConfirmationSink;

/// Sink that writes trust updates to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ConfirmationSink for TracingSink {
    fn publish(&self, update: TrustUpdate) {
        let snapshot = update.snapshot;
        info!(
            confirmations = snapshot.confirmations,
            rejections = snapshot.rejections,
            ratio = snapshot.rejection_ratio,
            color = %snapshot.color,
            trusted = snapshot.trusted,
            reports = update.rows.len(),
            "[confirm] Trust indicator updated"
        );
    }

    fn rejection_warning(&self, summary: &ReportSummary) {
        warn!(
            request_type = %summary.request_type,
            confirmations = summary.confirmations,
            rejections = summary.rejections,
            "[confirm] Request {} rejected by {} of {} validators",
            summary.request_type,
            summary.rejections,
            summary.sampled
        );
    }
}
