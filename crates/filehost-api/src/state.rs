use filehost_core::{FilehostConfig, SharedConfig};
use filehost_storage::{LocalStorage, Storage};
use std::sync::Arc;

/// Application state shared by all handlers.
///
/// Only the configuration is shared; handlers take one snapshot per request
/// and derive everything else from it.
#[derive(Clone)]
pub struct AppState {
    pub config: SharedConfig,
}

impl AppState {
    pub fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Storage rooted at the snapshot's upload path.
    pub fn storage(&self, config: &FilehostConfig) -> Arc<dyn Storage> {
        Arc::new(LocalStorage::new(config.storage_path.clone()))
    }
}
