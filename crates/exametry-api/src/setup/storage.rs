//! Storage setup and initialization

use anyhow::{Context, Result};
use exametry_core::{Config, StorageBackend};
use exametry_storage::{create_storage, Storage};
use std::sync::Arc;

/// Build the storage backend selected by configuration.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage abstraction...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;

    match storage.backend_type() {
        StorageBackend::S3 => tracing::info!(
            backend = %StorageBackend::S3,
            bucket = %config.s3_bucket(),
            region = %config.s3_region(),
            endpoint = ?config.s3_endpoint(),
            "Storage abstraction initialized successfully"
        ),
        StorageBackend::Local => tracing::info!(
            backend = %StorageBackend::Local,
            path = ?config.local_storage_path(),
            public_base_url = ?config.public_base_url(),
            "Storage abstraction initialized successfully"
        ),
    }

    Ok(storage)
}
