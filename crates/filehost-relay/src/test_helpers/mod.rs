//! Mock host implementations for relay unit tests

use async_trait::async_trait;
use filehost_core::constants::CAPABILITY_NAME;
use filehost_core::{FilehostConfig, SharedConfig, TagMessage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::host::{ChatSession, Peer, PeerError};

pub const TEST_SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

/// Config with public URL `https://host/files`.
pub fn test_config(overrides: &[(&str, &str)]) -> SharedConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("FILEHOST_HOSTNAME".to_string(), "host".to_string()),
        ("FILEHOST_URI".to_string(), "/files".to_string()),
        ("FILEHOST_TOKEN_SECRET".to_string(), TEST_SECRET.to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }
    let config = FilehostConfig::from_source(|key| vars.get(key).cloned()).unwrap();
    SharedConfig::new(config)
}

pub struct MockSession {
    pub account: Option<String>,
    pub source: String,
    pub local: bool,
    pub secure: bool,
    pub notices: Mutex<Vec<String>>,
}

impl MockSession {
    pub fn secure(account: Option<&str>) -> Self {
        Self {
            account: account.map(str::to_string),
            source: "alice!alice@example.net".to_string(),
            local: true,
            secure: true,
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn plaintext(account: Option<&str>) -> Self {
        Self {
            secure: false,
            ..Self::secure(account)
        }
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl ChatSession for MockSession {
    fn account(&self) -> Option<String> {
        self.account.clone()
    }

    fn source(&self) -> String {
        self.source.clone()
    }

    fn is_local(&self) -> bool {
        self.local
    }

    fn is_secure(&self) -> bool {
        self.secure
    }

    fn notice(&self, text: &str) {
        self.notices.lock().unwrap().push(text.to_string());
    }
}

pub struct MockPeer {
    id: String,
    capable: bool,
    connected: AtomicBool,
    pub received: Mutex<Vec<TagMessage>>,
}

impl MockPeer {
    pub fn capable(id: &str) -> Self {
        Self {
            id: id.to_string(),
            capable: true,
            connected: AtomicBool::new(true),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn plain(id: &str) -> Self {
        Self {
            capable: false,
            ..Self::capable(id)
        }
    }

    /// A capable peer whose connection is already gone.
    pub fn gone(id: &str) -> Self {
        let peer = Self::capable(id);
        peer.connected.store(false, Ordering::SeqCst);
        peer
    }

    pub fn received(&self) -> Vec<TagMessage> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Peer for MockPeer {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn has_capability(&self, capability: &str) -> bool {
        self.capable && capability == CAPABILITY_NAME
    }

    async fn send_tag_message(&self, message: &TagMessage) -> Result<(), PeerError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(PeerError::Disconnected);
        }
        self.received.lock().unwrap().push(message.clone());
        Ok(())
    }
}
