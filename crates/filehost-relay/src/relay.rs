//! Entry points the host calls into.

use filehost_core::constants::{CAPABILITY_NAME, DISCOVERY_KEY};
use filehost_core::{FileMetadata, ProtocolTag, SharedConfig};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::command::{self, CommandOutcome};
use crate::host::{ChatSession, OutgoingMessage, PeerRoster};
use crate::policy::{violates_tls_policy, TLS_REQUIRED_NOTICE};
use crate::propagator::{FanoutReport, TagPropagator};
use crate::scanner;

/// What the host should do with an outgoing message.
#[derive(Debug)]
pub enum MessageVerdict {
    /// Deliver unchanged.
    Pass,
    /// Deliver with the metadata tag attached. The companion fan-out is running
    /// on `fanout` when a runtime was available.
    Tagged {
        fanout: Option<JoinHandle<FanoutReport>>,
    },
    /// Refuse delivery; the sender has been told why.
    Denied,
}

impl MessageVerdict {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, MessageVerdict::Denied)
    }
}

#[derive(Clone)]
pub struct FilehostRelay {
    config: SharedConfig,
    propagator: TagPropagator,
}

impl FilehostRelay {
    pub fn new(config: SharedConfig, roster: Arc<dyn PeerRoster>) -> Self {
        Self {
            config,
            propagator: TagPropagator::new(roster),
        }
    }

    /// Capability peers negotiate to receive file metadata.
    pub fn capability(&self) -> &'static str {
        CAPABILITY_NAME
    }

    /// Discovery tokens to publish, e.g. `FILEHOST=https://irc.example.net/upload`.
    pub fn discovery_tokens(&self) -> Vec<(&'static str, String)> {
        vec![(DISCOVERY_KEY, self.config.snapshot().public_url())]
    }

    /// Run before the host delivers `message` from `session`.
    #[tracing::instrument(skip_all, fields(target_name = %message.target))]
    pub fn on_outgoing_message(
        &self,
        session: &dyn ChatSession,
        message: &mut OutgoingMessage,
    ) -> MessageVerdict {
        let config = self.config.snapshot();

        if violates_tls_policy(&config, session, &message.text) {
            tracing::info!(source = %session.source(), "Refused hosted link over plaintext connection");
            session.notice(TLS_REQUIRED_NOTICE);
            return MessageVerdict::Denied;
        }

        let Some(link) = scanner::scan(&message.text, &config.public_url()) else {
            return MessageVerdict::Pass;
        };

        let metadata = FileMetadata::from_link(link.url, Some(link.filename));
        let tag = match ProtocolTag::file_metadata(&metadata) {
            Ok(tag) => tag,
            Err(e) => {
                tracing::warn!(error = %e, "Hosted link not tagged");
                return MessageVerdict::Pass;
            }
        };

        tracing::debug!(
            url = %metadata.url,
            category = %metadata.category,
            "Tagging hosted link"
        );

        let fanout = self.propagator.propagate(message, tag);
        MessageVerdict::Tagged { fanout }
    }

    /// Handle `FILEHOST [args]` from `session`.
    pub fn handle_command(&self, session: &dyn ChatSession, args: &[&str]) -> CommandOutcome {
        let config = self.config.snapshot();
        command::handle_command(&config, session, args)
    }
}
