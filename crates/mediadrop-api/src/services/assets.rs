//! Asset listing and deletion
//!
//! Deletion removes the stored object best-effort and then the record. Storage failures
//! are logged and never fail the request, so a record can always be deleted even when its
//! object is already gone.

use std::collections::BTreeMap;
use std::sync::Arc;

use mediadrop_core::constants::STORAGE_REMOVE_CHUNK_SIZE;
use mediadrop_core::models::{AssetFilter, AssetRecord};
use mediadrop_core::AppError;
use mediadrop_db::AssetStore;
use mediadrop_storage::Storage;
use uuid::Uuid;

#[derive(Clone)]
pub struct AssetService {
    storage: Arc<dyn Storage>,
    assets: Arc<dyn AssetStore>,
}

impl AssetService {
    pub fn new(storage: Arc<dyn Storage>, assets: Arc<dyn AssetStore>) -> Self {
        Self { storage, assets }
    }

    pub async fn list(&self, filter: &AssetFilter) -> Result<Vec<AssetRecord>, AppError> {
        self.assets.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<AssetRecord, AppError> {
        self.assets
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Asset not found".to_string()))
    }

    #[tracing::instrument(skip(self), fields(asset_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let record = self.get(id).await?;

        if let Err(err) = self
            .storage
            .remove(&record.bucket_name, std::slice::from_ref(&record.storage_path))
            .await
        {
            tracing::warn!(
                error = %err,
                bucket = %record.bucket_name,
                key = %record.storage_path,
                "Failed to remove stored object, deleting record anyway"
            );
        }

        if !self.assets.delete(id).await? {
            // Lost a race with a concurrent delete; the end state is the same.
            tracing::debug!("Asset record already deleted");
        }

        tracing::info!(bucket = %record.bucket_name, key = %record.storage_path, "Asset deleted");
        Ok(())
    }

    /// Delete every record (optionally only one user's) and their objects. Returns the
    /// number of records deleted.
    #[tracing::instrument(skip(self), fields(user_id = ?user_id))]
    pub async fn delete_all(&self, user_id: Option<Uuid>) -> Result<u64, AppError> {
        let records = self.assets.list_all(user_id).await?;
        if records.is_empty() {
            return Ok(0);
        }

        let mut by_bucket: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for record in &records {
            by_bucket
                .entry(record.bucket_name.as_str())
                .or_default()
                .push(record.storage_path.clone());
        }

        for (bucket, keys) in &by_bucket {
            for (chunk_index, chunk) in keys.chunks(STORAGE_REMOVE_CHUNK_SIZE).enumerate() {
                if let Err(err) = self.storage.remove(bucket, chunk).await {
                    tracing::warn!(
                        error = %err,
                        bucket = %bucket,
                        chunk_index,
                        key_count = chunk.len(),
                        "Failed to remove stored objects, continuing"
                    );
                }
            }
        }

        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let deleted = self.assets.delete_many(&ids).await?;

        tracing::info!(
            deleted,
            buckets = by_bucket.len(),
            "Bulk asset deletion finished"
        );
        Ok(deleted)
    }
}
