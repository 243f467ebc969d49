//! In-memory peer roster

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::host::{Peer, PeerRoster};

/// Peer table for hosts without one of their own, and for tests.
///
/// Reads take a snapshot under the read lock, so fan-out never holds the lock
/// while sending.
#[derive(Clone)]
pub struct InMemoryRoster {
    peers: Arc<RwLock<HashMap<String, Arc<dyn Peer>>>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self {
            peers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Add a peer, replacing any peer with the same id.
    pub async fn connect(&self, peer: Arc<dyn Peer>) {
        let id = peer.id();
        self.peers.write().await.insert(id, peer);
    }

    pub async fn disconnect(&self, id: &str) -> bool {
        self.peers.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}

impl Default for InMemoryRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PeerRoster for InMemoryRoster {
    async fn snapshot(&self) -> Vec<Arc<dyn Peer>> {
        self.peers.read().await.values().cloned().collect()
    }
}
