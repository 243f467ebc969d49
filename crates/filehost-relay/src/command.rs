//! The `FILEHOST` chat command.

use filehost_core::constants::COMMAND_NAME;
use filehost_core::models::ACCEPTED_CONTENT_TYPES;
use filehost_core::{FilehostConfig, TokenService};

use crate::host::ChatSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    Failure,
}

/// Handle `FILEHOST [info]` for `session`. Replies go out as notices.
pub fn handle_command(
    config: &FilehostConfig,
    session: &dyn ChatSession,
    args: &[&str],
) -> CommandOutcome {
    let Some(account) = session.account() else {
        session.notice(&format!(
            "You must be logged in to an account to use {}. Identify to your account and try again.",
            COMMAND_NAME
        ));
        return CommandOutcome::Failure;
    };

    match args {
        [] => upload_url(config, session, &account),
        [arg] if arg.eq_ignore_ascii_case("info") => {
            info(config, session);
            CommandOutcome::Success
        }
        _ => {
            session.notice(&format!("Usage: {} [info]", COMMAND_NAME));
            CommandOutcome::Failure
        }
    }
}

fn upload_url(config: &FilehostConfig, session: &dyn ChatSession, account: &str) -> CommandOutcome {
    let public_url = config.public_url();

    let url = if config.authenticate {
        let token = TokenService::from_config(config)
            .and_then(|tokens| tokens.issue(account, config.token_ttl));
        match token {
            Ok(token) => format!("{}?token={}", public_url, token),
            Err(e) => {
                tracing::error!(account = %account, error = %e, "Failed to issue upload credential");
                session.notice("Unable to issue an upload URL right now. Please try again later.");
                return CommandOutcome::Failure;
            }
        }
    } else {
        public_url
    };

    tracing::info!(account = %account, "Issued upload URL");

    session.notice(&format!("Your upload URL: {}", url));
    session.notice(&format!(
        "Upload with: curl -H \"Content-Type: image/png\" -H 'Content-Disposition: filename=\"picture.png\"' --data-binary @picture.png '{}'",
        url
    ));
    if config.authenticate {
        let ttl = config.clamp_ttl(config.token_ttl);
        session.notice(&format!(
            "This URL is valid for {}. Do not share it.",
            describe_duration(ttl.as_secs())
        ));
    }
    session.notice(&format!(
        "Maximum upload size: {}. Send {} info for allowed types.",
        describe_size(config.max_upload_bytes),
        COMMAND_NAME
    ));
    CommandOutcome::Success
}

fn info(config: &FilehostConfig, session: &dyn ChatSession) {
    let types = ACCEPTED_CONTENT_TYPES
        .iter()
        .map(|(mime, _)| *mime)
        .collect::<Vec<_>>()
        .join(", ");

    session.notice(&format!("Upload endpoint: {}", config.public_url()));
    session.notice(&format!(
        "Maximum upload size: {}",
        describe_size(config.max_upload_bytes)
    ));
    session.notice(&format!("Allowed types: {}", types));
    session.notice(&format!(
        "Authentication: {}",
        if config.authenticate {
            "required"
        } else {
            "not required"
        }
    ));
    session.notice(&format!(
        "Links require an encrypted connection: {}",
        if config.require_ssl { "yes" } else { "no" }
    ));
}

fn describe_duration(secs: u64) -> String {
    match secs {
        s if s >= 3600 && s % 3600 == 0 => plural(s / 3600, "hour"),
        s if s >= 60 && s % 60 == 0 => plural(s / 60, "minute"),
        s => plural(s, "second"),
    }
}

fn describe_size(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{} MB", bytes / MB)
    } else {
        plural(bytes, "byte")
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}
