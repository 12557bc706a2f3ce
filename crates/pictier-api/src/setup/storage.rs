//! Storage setup

use std::sync::Arc;

use anyhow::{Context, Result};
use pictier_core::Config;
use pictier_storage::{LocalStorage, Storage};

/// Create the media root if needed and return the storage backend over it.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = LocalStorage::new(&config.media_root, config.media_base_url.clone())
        .await
        .context("Failed to initialize local storage")?;

    tracing::info!(
        media_root = %config.media_root.display(),
        media_base_url = %config.media_base_url,
        "Local storage ready"
    );

    Ok(Arc::new(storage))
}
