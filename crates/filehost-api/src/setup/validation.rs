//! Configuration validation
//!
//! Validates configuration at startup to catch misconfigurations early.

use anyhow::Result;
use filehost_core::FilehostConfig;

use crate::setup::routes::HEALTH_PATH;

/// Validate configuration before serving.
///
/// Hard errors fail startup (and reject a reload); risky but legal settings
/// only warn.
pub fn validate_config(config: &FilehostConfig) -> Result<()> {
    config.validate()?;

    if config.mount_path == HEALTH_PATH || config.mount_path.starts_with("/health/") {
        return Err(anyhow::anyhow!(
            "FILEHOST_URI {} collides with the health endpoint",
            config.mount_path
        ));
    }

    if config.is_production() {
        if !config.authenticate {
            tracing::warn!("Uploads are unauthenticated in production - anyone can store files");
        }
        if !config.public_ssl {
            tracing::warn!(
                public_url = %config.public_url(),
                "Public URL uses plain http in production"
            );
        }
    }

    if config.require_ssl && !config.public_ssl {
        tracing::warn!(
            "FILEHOST_REQUIRE_SSL is on but the public URL is http - links will only travel over TLS chat"
        );
    }

    Ok(())
}
