//! Single-file upload pipeline
//!
//! validate → build key → store → resolve owner → persist record
//!
//! Every failure is folded into the returned [`UploadOutcome`]; this service never
//! returns an error. A file whose bytes were stored but whose record could not be
//! written is reported as a degraded success, and the stored object is left in place.

use std::sync::Arc;

use mediadrop_core::models::{NewAsset, UploadFile, UploadOutcome};
use mediadrop_core::naming::build_storage_key;
use mediadrop_core::validation::validate_file;
use mediadrop_core::{UploadError, UploadLimits};
use mediadrop_db::{AssetStore, UserDirectory};
use mediadrop_storage::{classify_storage_error, Storage};
use uuid::Uuid;

/// Uploads one file to the sink and records its metadata.
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn Storage>,
    assets: Arc<dyn AssetStore>,
    users: Arc<dyn UserDirectory>,
    bucket: String,
    limits: UploadLimits,
}

impl UploadService {
    pub fn new(
        storage: Arc<dyn Storage>,
        assets: Arc<dyn AssetStore>,
        users: Arc<dyn UserDirectory>,
        bucket: String,
        limits: UploadLimits,
    ) -> Self {
        Self {
            storage,
            assets,
            users,
            bucket,
            limits,
        }
    }

    #[tracing::instrument(
        skip(self, file),
        fields(filename = %file.filename, size_bytes = file.size(), folder = ?folder)
    )]
    pub async fn upload(
        &self,
        file: UploadFile,
        folder: Option<&str>,
        user_id: Option<Uuid>,
    ) -> UploadOutcome {
        let content_type = match validate_file(&file, &self.limits) {
            Ok(content_type) => content_type,
            Err(err) => {
                tracing::debug!(error = %err, "Upload rejected by validation");
                return UploadOutcome::failed(file.filename, err);
            }
        };

        let key = build_storage_key(&file.filename, folder);
        let UploadFile { filename, data, .. } = file;
        let file_size = data.len() as i64;

        let public_url = match self
            .storage
            .put(&self.bucket, &key, data, &content_type)
            .await
        {
            Ok(url) => url,
            Err(err) => {
                let classified = classify_storage_error(&err);
                tracing::warn!(
                    error = %err,
                    kind = %classified.kind,
                    bucket = %self.bucket,
                    key = %key,
                    "Storage upload failed"
                );
                return UploadOutcome::failed(filename, classified);
            }
        };

        let owner = self.resolve_owner(user_id).await;

        let new_asset = NewAsset {
            filename: filename.clone(),
            file_size,
            file_type: content_type,
            bucket_name: self.bucket.clone(),
            storage_path: key.clone(),
            public_url: public_url.clone(),
            user_id: owner,
        };

        match self.assets.insert(new_asset).await {
            Ok(record) => {
                tracing::info!(
                    asset_id = %record.id,
                    key = %record.storage_path,
                    "File uploaded"
                );
                UploadOutcome::uploaded(record)
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    bucket = %self.bucket,
                    key = %key,
                    "Stored object has no metadata record"
                );
                UploadOutcome::degraded(
                    filename,
                    key,
                    public_url,
                    UploadError::metadata_write_failed(err.to_string()),
                )
            }
        }
    }

    /// Keep the owner only if the directory confirms the user exists.
    async fn resolve_owner(&self, user_id: Option<Uuid>) -> Option<Uuid> {
        let id = user_id?;
        match self.users.user_exists(id).await {
            Ok(true) => Some(id),
            Ok(false) => {
                tracing::warn!(user_id = %id, "Unknown user, storing asset without owner");
                None
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    user_id = %id,
                    "User lookup failed, storing asset without owner"
                );
                None
            }
        }
    }
}
