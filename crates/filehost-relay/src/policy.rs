//! Transport-security policy for hosted links.

use filehost_core::FilehostConfig;

use crate::host::ChatSession;

pub const TLS_REQUIRED_NOTICE: &str =
    "You cannot send FILEHOST URLs over a non-SSL connection. Please use an SSL connection.";

/// Whether `text` from `session` must be refused because it would carry a hosted
/// link over an unencrypted local connection.
///
/// Remote users are not checked; their own server applies the policy.
pub fn violates_tls_policy(config: &FilehostConfig, session: &dyn ChatSession, text: &str) -> bool {
    config.require_ssl
        && session.is_local()
        && !session.is_secure()
        && text.contains(&config.public_url())
}
