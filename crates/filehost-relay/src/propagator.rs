//! Tag attachment and companion fan-out.

use filehost_core::constants::CAPABILITY_NAME;
use filehost_core::{ProtocolTag, TagMessage};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::host::{OutgoingMessage, PeerRoster};

/// Outcome of one companion fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub delivered: usize,
    pub failed: usize,
    /// Peers without the capability
    pub skipped: usize,
}

#[derive(Clone)]
pub struct TagPropagator {
    roster: Arc<dyn PeerRoster>,
}

impl TagPropagator {
    pub fn new(roster: Arc<dyn PeerRoster>) -> Self {
        Self { roster }
    }

    /// Attach `tag` to the message and broadcast a `TAGMSG` carrying only that tag.
    ///
    /// The fan-out runs on its own task; the returned handle may be dropped.
    /// Returns `None` when no runtime is available to run it.
    pub fn propagate(
        &self,
        message: &mut OutgoingMessage,
        tag: ProtocolTag,
    ) -> Option<JoinHandle<FanoutReport>> {
        let companion = TagMessage {
            source: message.source.clone(),
            target: message.target.clone(),
            tags: vec![tag.clone()],
        };
        message.set_tag(tag);
        self.broadcast(companion)
    }

    pub fn broadcast(&self, companion: TagMessage) -> Option<JoinHandle<FanoutReport>> {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, "No runtime for companion fan-out, skipping");
                return None;
            }
        };
        let roster = self.roster.clone();
        Some(handle.spawn(fan_out(roster, companion)))
    }
}

/// Send `companion` to every capable peer. Failures are counted, never retried.
pub async fn fan_out(roster: Arc<dyn PeerRoster>, companion: TagMessage) -> FanoutReport {
    let start = std::time::Instant::now();
    let peers = roster.snapshot().await;
    let mut report = FanoutReport::default();

    let capable: Vec<_> = peers
        .into_iter()
        .filter(|peer| {
            let keep = peer.has_capability(CAPABILITY_NAME);
            if !keep {
                report.skipped += 1;
            }
            keep
        })
        .collect();

    let results = futures::future::join_all(capable.iter().map(|peer| {
        let companion = &companion;
        async move { (peer.id(), peer.send_tag_message(companion).await) }
    }))
    .await;

    for (peer_id, result) in results {
        match result {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                report.failed += 1;
                tracing::warn!(peer = %peer_id, error = %e, "Companion delivery failed");
            }
        }
    }

    tracing::debug!(
        target_name = %companion.target,
        delivered = report.delivered,
        failed = report.failed,
        skipped = report.skipped,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Companion fan-out finished"
    );

    report
}
