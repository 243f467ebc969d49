//! Seams to the hosting chat server.
//!
//! Connections, accounts and capability negotiation belong to the host. This
//! crate only reads them through these traits.

use async_trait::async_trait;
use filehost_core::{ProtocolTag, TagMessage};
use std::sync::Arc;
use thiserror::Error;

/// The user on whose behalf a message or command is being processed.
pub trait ChatSession: Send + Sync {
    /// Account the user is logged in to, if any.
    fn account(&self) -> Option<String>;

    /// Message prefix of the user, e.g. `nick!user@host`.
    fn source(&self) -> String;

    /// Whether the user is connected to this server (as opposed to a remote one).
    fn is_local(&self) -> bool;

    /// Whether the user's connection is encrypted.
    fn is_secure(&self) -> bool;

    /// Send a server notice to the user.
    fn notice(&self, text: &str);
}

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("Peer disconnected")]
    Disconnected,

    #[error("Send failed: {0}")]
    Send(String),
}

/// A connected client that may receive companion messages.
#[async_trait]
pub trait Peer: Send + Sync {
    fn id(&self) -> String;

    fn has_capability(&self, capability: &str) -> bool;

    async fn send_tag_message(&self, message: &TagMessage) -> Result<(), PeerError>;
}

/// The host's table of connected peers.
#[async_trait]
pub trait PeerRoster: Send + Sync {
    /// Peers connected right now. Peers may disconnect after the snapshot is taken.
    async fn snapshot(&self) -> Vec<Arc<dyn Peer>>;
}

/// A chat message on its way out, before the host delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub source: String,
    pub target: String,
    pub text: String,
    pub tags: Vec<ProtocolTag>,
}

impl OutgoingMessage {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            text: text.into(),
            tags: Vec::new(),
        }
    }

    pub fn tag(&self, key: &str) -> Option<&ProtocolTag> {
        self.tags.iter().find(|tag| tag.key() == key)
    }

    /// Add a tag, replacing any existing tag with the same key.
    pub fn set_tag(&mut self, tag: ProtocolTag) {
        self.tags.retain(|existing| existing.key() != tag.key());
        self.tags.push(tag);
    }
}
