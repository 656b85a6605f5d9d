//! Storage setup and initialization

use anyhow::Result;
use mediadrop_core::Config;
use mediadrop_storage::{create_storage, BucketConfig, Storage};
use std::sync::Arc;

/// Build the configured storage backend and, unless disabled, make sure the upload bucket
/// exists as a public bucket with the configured size and type restrictions.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config).await?;
    tracing::info!(
        backend = %storage.backend_type(),
        bucket = %config.storage_bucket(),
        "Storage initialized successfully"
    );

    if config.ensure_bucket_on_startup() {
        ensure_upload_bucket(config, storage.as_ref()).await;
    }

    Ok(storage)
}

/// Failures are logged; uploads will surface any real misconfiguration per file.
async fn ensure_upload_bucket(config: &Config, storage: &dyn Storage) {
    let bucket_config = BucketConfig::public(
        config.max_file_size_bytes(),
        config.allowed_content_types().to_vec(),
    );

    match storage
        .ensure_bucket(config.storage_bucket(), &bucket_config)
        .await
    {
        Ok(()) => tracing::info!(bucket = %config.storage_bucket(), "Upload bucket ready"),
        Err(e) => tracing::warn!(
            error = %e,
            bucket = %config.storage_bucket(),
            "Failed to ensure upload bucket"
        ),
    }
}
