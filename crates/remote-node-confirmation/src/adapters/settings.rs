//! Config-backed Settings Adapter
//!
//! Implements `SettingsProvider` on top of a `ConfirmationConfig`. The
//! polling flag and serving node can change at runtime.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::info;

use crate::config::ConfirmationConfig;
use crate::ports::outbound::SettingsProvider;

/// Settings read from configuration, adjustable at runtime.
#[derive(Debug)]
pub struct ConfigSettings {
    validators_count: AtomicUsize,
    polling_enabled: AtomicBool,
    serving_node: RwLock<Option<String>>,
}

impl ConfigSettings {
    /// Seed settings from a config.
    pub fn new(config: &ConfirmationConfig) -> Self {
        Self {
            validators_count: AtomicUsize::new(config.validators_count),
            polling_enabled: AtomicBool::new(config.polling_enabled),
            serving_node: RwLock::new(config.serving_node.clone()),
        }
    }

    /// Turn peer-list polling on or off. The discovery loop notices at its
    /// next reschedule point.
    pub fn set_polling_enabled(&self, enabled: bool) {
        self.polling_enabled.store(enabled, Ordering::SeqCst);
        info!("[confirm] Peer polling {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Change the number of validators sampled per request.
    pub fn set_validators_count(&self, count: usize) {
        self.validators_count.store(count, Ordering::SeqCst);
    }

    /// Switch to another serving node.
    pub fn set_serving_node(&self, address: Option<String>) {
        info!("[confirm] Serving node set to {:?}", address);
        *self.serving_node.write() = address;
    }
}

impl Default for ConfigSettings {
    fn default() -> Self {
        Self::new(&ConfirmationConfig::default())
    }
}

impl SettingsProvider for ConfigSettings {
    fn validators_count(&self) -> usize {
        self.validators_count.load(Ordering::SeqCst)
    }

    fn polling_enabled(&self) -> bool {
        self.polling_enabled.load(Ordering::SeqCst)
    }

    fn serving_node(&self) -> Option<String> {
        self.serving_node.read().clone()
    }
}
