use crate::traits::{encode_key, validate_key, BucketConfig, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const BUCKET_CONFIG_DIR: &str = ".buckets";

/// Local filesystem storage implementation
///
/// Objects live at `{base_path}/{bucket}/{key}`. Bucket settings written by
/// `ensure_bucket` are kept as JSON under `{base_path}/.buckets/` and enforced on `put`.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/mediadrop")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:4000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    fn validate_bucket(bucket: &str) -> StorageResult<()> {
        if bucket.is_empty() || bucket.contains('/') || bucket.contains("..") || bucket.starts_with('.')
        {
            return Err(StorageError::InvalidKey(format!(
                "Invalid bucket name: {}",
                bucket
            )));
        }
        Ok(())
    }

    /// Convert bucket and key to a filesystem path with security validation
    ///
    /// Rejects keys containing traversal sequences and any path that resolves outside
    /// the bucket directory.
    fn key_to_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        Self::validate_bucket(bucket)?;
        validate_key(key)?;

        let bucket_dir = self.base_path.join(bucket);
        let path = bucket_dir.join(key);

        if let (Ok(canonical), Ok(bucket_canonical)) =
            (path.canonicalize(), bucket_dir.canonicalize())
        {
            if canonical.strip_prefix(&bucket_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    fn bucket_config_path(&self, bucket: &str) -> PathBuf {
        self.base_path
            .join(BUCKET_CONFIG_DIR)
            .join(format!("{}.json", bucket))
    }

    async fn load_bucket_config(&self, bucket: &str) -> StorageResult<Option<BucketConfig>> {
        match fs::read(self.bucket_config_path(bucket)).await {
            Ok(raw) => serde_json::from_slice(&raw).map(Some).map_err(|e| {
                StorageError::ConfigError(format!("Corrupt bucket config for {}: {}", bucket, e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(bucket, key)?;
        let size = data.len();

        if let Some(config) = self.load_bucket_config(bucket).await? {
            config.check(size, content_type)?;
        }

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(self.public_url(bucket, key))
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> StorageResult<()> {
        let mut failures = Vec::new();

        for key in keys {
            let path = self.key_to_path(bucket, key)?;
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(bucket = %bucket, key = %key, "Object already absent");
                }
                Err(e) => {
                    tracing::error!(error = %e, bucket = %bucket, key = %key, "Local delete failed");
                    failures.push(format!("{}: {}", key, e));
                }
            }
        }

        if !failures.is_empty() {
            return Err(StorageError::DeleteFailed(failures.join("; ")));
        }

        tracing::info!(bucket = %bucket, key_count = keys.len(), "Local storage remove successful");
        Ok(())
    }

    async fn ensure_bucket(&self, name: &str, config: &BucketConfig) -> StorageResult<()> {
        Self::validate_bucket(name)?;
        fs::create_dir_all(self.base_path.join(name)).await?;

        let config_path = self.bucket_config_path(name);
        self.ensure_parent_dir(&config_path).await?;
        let raw = serde_json::to_vec_pretty(config)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        fs::write(&config_path, raw).await?;

        tracing::info!(bucket = %name, public = config.public, "Local bucket ensured");
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            bucket,
            encode_key(key)
        )
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:4000/media/".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_put_and_remove() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let url = storage
            .put("images", "uploads/a-1.png", b"test data".to_vec(), "image/png")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:4000/media/images/uploads/a-1.png");

        let on_disk = dir.path().join("images/uploads/a-1.png");
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"test data");

        storage
            .remove("images", &["uploads/a-1.png".to_string(), "missing.png".to_string()])
            .await
            .unwrap();
        assert!(!on_disk.exists());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage
            .put("images", "../../../etc/passwd", vec![1], "image/png")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.remove("images", &["/etc/passwd".to_string()]).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.put("../images", "a.png", vec![1], "image/png").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_bucket_config_is_enforced() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        storage
            .ensure_bucket("images", &BucketConfig::public(4, vec!["image/png".to_string()]))
            .await
            .unwrap();

        let err = storage
            .put("images", "big.png", vec![0; 5], "image/png")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(413));

        let err = storage
            .put("images", "a.txt", vec![0; 1], "text/plain")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(415));

        assert!(storage
            .put("images", "ok.png", vec![0; 4], "image/png")
            .await
            .is_ok());
    }
}
