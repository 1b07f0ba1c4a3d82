//! # Peer Discovery Loop
//!
//! Periodically asks the serving node for its connected peers and swaps the
//! registry snapshot. The loop stops itself once polling is disabled; the
//! predicate is checked before each reschedule, so a tick that is already
//! scheduled still fires.

use serde_json::{json, Value};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::context::TrustContext;
use crate::domain::{
    ConfirmationError, Node, GET_PEERS_REQUEST, PEER_REFRESH_INTERVAL, PEER_STATE_CONNECTED,
};
use crate::ports::{
    check_remote_error, RemoteRequest, RemoteTransport, RequestOptions, SettingsProvider,
};

/// Field of the `getPeers` response holding the peer list.
const PEERS_FIELD: &str = "peers";

/// Cooperative refresh task for the node registry.
pub struct PeerDiscoveryLoop {
    context: Arc<TrustContext>,
    transport: Arc<dyn RemoteTransport>,
    settings: Arc<dyn SettingsProvider>,
}

impl PeerDiscoveryLoop {
    /// Create a loop feeding the registry of `context`.
    pub fn new(
        context: Arc<TrustContext>,
        transport: Arc<dyn RemoteTransport>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            context,
            transport,
            settings,
        }
    }

    /// The peer-list request sent to the serving node.
    pub fn peers_request() -> RemoteRequest {
        RemoteRequest {
            request_type: GET_PEERS_REQUEST.to_string(),
            params: json!({
                "state": PEER_STATE_CONNECTED,
                "includePeerInfo": true,
            }),
            options: RequestOptions::default(),
        }
    }

    /// Run one tick: fetch peers and replace the registry.
    ///
    /// Returns the new registry size, or `None` when the response carried
    /// no peer list and the registry was left as is.
    pub async fn refresh(&self) -> Result<Option<usize>, ConfirmationError> {
        let response = self
            .transport
            .send(Self::peers_request())
            .await
            .and_then(check_remote_error)?;

        let Some(peers) = response.get(PEERS_FIELD).and_then(Value::as_array) else {
            warn!("[discovery] getPeers response without peer list");
            return Ok(None);
        };

        let nodes: Vec<Node> = peers
            .iter()
            .filter_map(|peer| {
                let node = Node::from_peer_info(peer);
                if node.is_none() {
                    warn!("[discovery] Skipping peer without address: {}", peer);
                }
                node
            })
            .collect();

        let registry = self.context.registry();
        registry.replace_all(nodes);
        debug!("[discovery] Registry now holds {} nodes", registry.len());
        Ok(Some(registry.len()))
    }

    /// Tick until the polling predicate turns false.
    pub async fn run(self) {
        info!("[discovery] Starting peer refresh loop");
        loop {
            if let Err(e) = self.refresh().await {
                warn!("[discovery] Peer refresh failed: {}", e);
            }
            if !self.settings.polling_enabled() {
                break;
            }
            tokio::time::sleep(PEER_REFRESH_INTERVAL).await;
        }
        info!("[discovery] Polling disabled, peer refresh loop stopped");
    }

    /// Run the loop on the current Tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
