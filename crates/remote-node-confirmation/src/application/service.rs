//! # Confirmation Service
//!
//! Application service wiring the per-client context, the coordinator and
//! the peer discovery loop behind the `ConfirmationApi` port.

use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::application::context::TrustContext;
use crate::application::coordinator::ConfirmationCoordinator;
use crate::application::discovery::PeerDiscoveryLoop;
use crate::config::ConfirmationConfig;
use crate::domain::{
    ConfirmationError, Node, NodeRegistry, ReportRow, TrustSnapshot, TrustUpdate,
};
use crate::ports::{
    ConfirmationApi, ConfirmationHandle, ConfirmationSink, RemoteTransport, SettingsProvider,
};

/// Remote node confirmation service for one light-client instance.
pub struct ConfirmationService {
    /// Configuration.
    config: ConfirmationConfig,
    /// Registry and rolling log.
    context: Arc<TrustContext>,
    /// Cross-checks responses.
    coordinator: ConfirmationCoordinator,
    /// Shared with the discovery loop.
    transport: Arc<dyn RemoteTransport>,
    /// Shared with the discovery loop.
    settings: Arc<dyn SettingsProvider>,
}

impl ConfirmationService {
    /// Create a service. Fails if `config` does not validate.
    pub fn new(
        config: ConfirmationConfig,
        transport: Arc<dyn RemoteTransport>,
        settings: Arc<dyn SettingsProvider>,
        sink: Arc<dyn ConfirmationSink>,
    ) -> Result<Self, ConfirmationError> {
        config.validate()?;
        let context = Arc::new(TrustContext::new());
        let coordinator = ConfirmationCoordinator::new(
            Arc::clone(&context),
            Arc::clone(&transport),
            Arc::clone(&settings),
            sink,
            config.request_catalog(),
        );
        info!(
            validators = config.validators_count,
            testnet = config.testnet,
            "[confirm] Confirmation service created"
        );
        Ok(Self {
            config,
            context,
            coordinator,
            transport,
            settings,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &ConfirmationConfig {
        &self.config
    }

    /// Per-client state.
    pub fn context(&self) -> &Arc<TrustContext> {
        &self.context
    }

    /// Known nodes.
    pub fn registry(&self) -> &NodeRegistry {
        self.context.registry()
    }

    /// Start the peer refresh loop. Returns `None` when polling is
    /// disabled; call [`Self::refresh_peers`] for a one-off refresh then.
    pub fn spawn_discovery(&self) -> Option<JoinHandle<()>> {
        if !self.settings.polling_enabled() {
            info!("[confirm] Peer polling disabled, discovery not started");
            return None;
        }
        Some(self.discovery().spawn())
    }

    /// Refresh the registry once.
    pub async fn refresh_peers(&self) -> Result<Option<usize>, ConfirmationError> {
        self.discovery().refresh().await
    }

    /// Flip the blacklist flag of a known node.
    pub fn set_blacklisted(&self, address: &str, blacklisted: bool) -> bool {
        self.context.registry().set_blacklisted(address, blacklisted)
    }

    fn discovery(&self) -> PeerDiscoveryLoop {
        PeerDiscoveryLoop::new(
            Arc::clone(&self.context),
            Arc::clone(&self.transport),
            Arc::clone(&self.settings),
        )
    }
}

impl ConfirmationApi for ConfirmationService {
    fn confirm_response(
        &self,
        request_type: &str,
        params: &Value,
        response: &Value,
        serving_node: Option<&Node>,
    ) -> Option<ConfirmationHandle> {
        self.coordinator
            .confirm(request_type, params, response, serving_node)
    }

    fn needs_confirmation(&self, request_type: &str) -> bool {
        self.coordinator.needs_confirmation(request_type)
    }

    fn trust_snapshot(&self) -> TrustSnapshot {
        self.context.snapshot()
    }

    fn report_rows(&self) -> Vec<ReportRow> {
        self.context.rows()
    }

    fn trust_update(&self) -> TrustUpdate {
        self.context.trust_update()
    }
}
