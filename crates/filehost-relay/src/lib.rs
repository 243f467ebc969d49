//! Filehost Relay Library
//!
//! The chat side of the file host. The host server plugs its sessions and
//! connection table in through the traits in [`host`]; this crate then
//!
//! - answers the `FILEHOST` command with personalized upload URLs,
//! - publishes the public base URL as a discovery token,
//! - enforces the TLS policy for messages carrying hosted links,
//! - tags outgoing messages that link a hosted file and fans a `TAGMSG`
//!   companion out to every peer that negotiated the capability.

pub mod command;
pub mod host;
pub mod policy;
pub mod propagator;
pub mod relay;
pub mod roster;
pub mod scanner;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use command::CommandOutcome;
pub use host::{ChatSession, OutgoingMessage, Peer, PeerError, PeerRoster};
pub use propagator::{FanoutReport, TagPropagator};
pub use relay::{FilehostRelay, MessageVerdict};
pub use roster::InMemoryRoster;
pub use scanner::{scan, Link};
