//! # Confirmation Coordinator
//!
//! Fans a confirmable response out to a random sample of validator nodes,
//! tallies their answers into a report in the rolling log and pushes trust
//! updates to the UI sink.
//!
//! ## Flow
//!
//! ```text
//! confirm() -> canonicalize expected -> sample validators -> push report
//!           -> spawn one sub-request per validator
//! each answer -> lock log -> move node out of `processing`
//!             -> confirming / rejecting / dropped on error
//!             -> publish on rejection and once more when resolved
//!             -> unlock log
//! ```
//!
//! Updates are published with the log still locked, so the sink receives
//! them in tally order and the last one reflects the final log.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::algorithms::{canonicalize, RequestCatalog};
use crate::application::context::{update_of, TrustContext};
use crate::domain::{
    invariant_disjoint_tally, invariant_log_bounded, ConfirmationError, ConfirmationReport, Node,
    ReportId, ReportSummary, RollingLog,
};
use crate::ports::{
    check_remote_error, ConfirmationHandle, ConfirmationSink, RemoteRequest, RemoteTransport,
    RequestOptions, SettingsProvider,
};

/// Correlation data for one verification sub-request. Travels with the
/// spawned task; nothing of it is sent over the wire.
#[derive(Clone, Debug)]
struct PendingVerification {
    report_id: ReportId,
    request_type: String,
    node: Node,
    expected: Arc<str>,
    serving: Arc<str>,
}

/// Cross-checks serving-node responses against sampled validators.
pub struct ConfirmationCoordinator {
    context: Arc<TrustContext>,
    transport: Arc<dyn RemoteTransport>,
    settings: Arc<dyn SettingsProvider>,
    sink: Arc<dyn ConfirmationSink>,
    catalog: RequestCatalog,
}

impl ConfirmationCoordinator {
    /// Create a coordinator over a shared context.
    pub fn new(
        context: Arc<TrustContext>,
        transport: Arc<dyn RemoteTransport>,
        settings: Arc<dyn SettingsProvider>,
        sink: Arc<dyn ConfirmationSink>,
        catalog: RequestCatalog,
    ) -> Self {
        Self {
            context,
            transport,
            settings,
            sink,
            catalog,
        }
    }

    /// Request catalog in use.
    pub fn catalog(&self) -> &RequestCatalog {
        &self.catalog
    }

    /// Whether responses to `request_type` get cross-checked.
    pub fn needs_confirmation(&self, request_type: &str) -> bool {
        self.catalog.needs_confirmation(request_type)
    }

    /// Start cross-checking `response`, which `serving_node` returned for
    /// `request_type` with `params`.
    ///
    /// Must be called from within a Tokio runtime. Returns `None`, without
    /// any network activity, when the request is not confirmable or the
    /// response cannot be canonicalized.
    pub fn confirm(
        &self,
        request_type: &str,
        params: &Value,
        response: &Value,
        serving_node: Option<&Node>,
    ) -> Option<ConfirmationHandle> {
        if !self.needs_confirmation(request_type) {
            debug!("[confirm] {} does not need confirmation", request_type);
            return None;
        }

        let expected: Arc<str> = match canonicalize(response, request_type) {
            Ok(expected) => expected.into(),
            Err(e) => {
                warn!("[confirm] Cannot parse response for request {}: {}", request_type, e);
                return None;
            }
        };

        let serving_address = serving_node
            .map(|n| n.address.clone())
            .or_else(|| self.settings.serving_node());
        let serving: Arc<str> = serving_node
            .map(|n| n.announced_address.clone())
            .or_else(|| serving_address.clone())
            .unwrap_or_else(|| "serving node".to_string())
            .into();
        let exclude: Vec<&str> = serving_address.iter().map(String::as_str).collect();

        let validators = self
            .context
            .registry()
            .sample(self.settings.validators_count(), &exclude);
        let report = ConfirmationReport::new(request_type, validators.iter());
        let report_id = report.id();
        info!(
            report_id = %report_id,
            validators = validators.len(),
            "[confirm] Confirming {} from {}",
            request_type,
            serving
        );

        self.context.with_log(|log| {
            let resolved = report.is_resolved().then(|| report.summary());
            if let Some(evicted) = log.push_front(report) {
                debug!(
                    report_id = %evicted.id(),
                    "[confirm] Evicted oldest report for {}",
                    evicted.request_type()
                );
            }
            debug_assert!(invariant_log_bounded(log.len()));
            // Nothing will call back for an empty sample.
            if let Some(summary) = resolved {
                publish_resolved(log, self.sink.as_ref(), &summary);
            }
        });

        let tasks = validators
            .into_iter()
            .map(|node| {
                let request = RemoteRequest {
                    request_type: request_type.to_string(),
                    params: params.clone(),
                    options: RequestOptions::verification(node.clone()),
                };
                let pending = PendingVerification {
                    report_id,
                    request_type: request_type.to_string(),
                    node,
                    expected: Arc::clone(&expected),
                    serving: Arc::clone(&serving),
                };
                let transport = Arc::clone(&self.transport);
                let context = Arc::clone(&self.context);
                let sink = Arc::clone(&self.sink);
                tokio::spawn(async move {
                    let result = transport.send(request).await.and_then(check_remote_error);
                    on_verification(&context, sink.as_ref(), pending, result);
                })
            })
            .collect();

        Some(ConfirmationHandle::new(report_id, tasks))
    }
}

/// Tally one validator answer. Runs to completion under the log lock.
fn on_verification(
    context: &TrustContext,
    sink: &dyn ConfirmationSink,
    pending: PendingVerification,
    result: Result<Value, ConfirmationError>,
) {
    let PendingVerification {
        report_id,
        request_type,
        node,
        expected,
        serving,
    } = pending;

    // Unparseable answers count as rejections.
    let actual = match result {
        Ok(payload) => Some(canonicalize(&payload, &request_type)),
        Err(e) => {
            warn!(
                report_id = %report_id,
                "[confirm] Confirm request {} with {} failed: {}",
                request_type,
                node.announced_address,
                e
            );
            None
        }
    };

    context.with_log(|log| {
        let Some(report) = log.get_mut(report_id) else {
            debug!(
                report_id = %report_id,
                "[confirm] Report for {} already evicted, ignoring answer from {}",
                request_type,
                node.announced_address
            );
            return;
        };

        let mut rejected = false;
        match &actual {
            None => {
                report.resolve_failed(&node.address);
            }
            Some(Ok(actual)) if actual.as_str() == &*expected => {
                debug!(
                    "[confirm] {} confirmed {} with {}",
                    node.announced_address, request_type, serving
                );
                report.resolve_confirmed(node.clone());
            }
            Some(actual) => {
                warn!(
                    report_id = %report_id,
                    "[confirm] {} response differs from {} response for {}",
                    node.announced_address,
                    serving,
                    request_type
                );
                debug!("[confirm] Expected response: {}", expected);
                match actual {
                    Ok(actual) => debug!("[confirm] Actual   response: {}", actual),
                    Err(e) => debug!("[confirm] Actual   response unparseable: {}", e),
                }
                rejected = report.resolve_rejected(node.clone());
            }
        }
        debug_assert!(invariant_disjoint_tally(report));
        let resolved = report.is_resolved().then(|| report.summary());

        if rejected {
            sink.publish(update_of(log));
        }
        if let Some(summary) = resolved {
            publish_resolved(log, sink, &summary);
        }
    });
}

/// Log the final tally of a report and push the update that closes it.
/// Must be called with the log locked.
fn publish_resolved(log: &RollingLog, sink: &dyn ConfirmationSink, summary: &ReportSummary) {
    info!(
        report_id = %summary.id,
        failures = summary.failures(),
        "[confirm] Request {} confirmations {} rejections {}",
        summary.request_type,
        summary.confirmations,
        summary.rejections
    );
    if summary.rejections > 0 {
        sink.rejection_warning(summary);
    }
    sink.publish(update_of(log));
}
