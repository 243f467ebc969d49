//! Storage setup and initialization

use anyhow::{Context, Result};
use filehost_core::FilehostConfig;
use filehost_storage::LocalStorage;

/// Create the upload directory (and its partial-upload area) if missing.
pub async fn setup_storage(config: &FilehostConfig) -> Result<()> {
    let storage = LocalStorage::new(config.storage_path.clone());
    storage.ensure_dirs().await.with_context(|| {
        format!(
            "Failed to prepare upload directory {}",
            config.storage_path.display()
        )
    })?;

    tracing::info!(
        path = %config.storage_path.display(),
        "Upload directory ready"
    );
    Ok(())
}
