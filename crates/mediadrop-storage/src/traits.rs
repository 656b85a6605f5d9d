//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// The backend answered with an error status
    #[error("Storage rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend answered with a body that could not be decoded
    #[error("Malformed storage response: {0}")]
    MalformedResponse(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// HTTP-like status code, when the backend exposed one
    pub fn status(&self) -> Option<u16> {
        match self {
            StorageError::Rejected { status, .. } => Some(*status),
            StorageError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Bucket settings applied by `ensure_bucket`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Objects readable without credentials
    pub public: bool,
    /// Per-object size ceiling in bytes
    pub max_file_size: Option<usize>,
    /// Accepted MIME types; `None` accepts everything
    pub allowed_mime_types: Option<Vec<String>>,
}

impl BucketConfig {
    pub fn public(max_file_size: usize, allowed_mime_types: Vec<String>) -> Self {
        Self {
            public: true,
            max_file_size: Some(max_file_size),
            allowed_mime_types: Some(allowed_mime_types),
        }
    }

    /// Whether an object of this size and type would be accepted
    pub fn check(&self, size: usize, content_type: &str) -> StorageResult<()> {
        if let Some(max) = self.max_file_size {
            if size > max {
                return Err(StorageError::Rejected {
                    status: 413,
                    message: format!("The object exceeded the maximum allowed size of {max} bytes"),
                });
            }
        }
        if let Some(ref allowed) = self.allowed_mime_types {
            if !allowed.iter().any(|t| t.eq_ignore_ascii_case(content_type)) {
                return Err(StorageError::Rejected {
                    status: 415,
                    message: format!("mime type {content_type} is not supported"),
                });
            }
        }
        Ok(())
    }
}

/// Storage abstraction trait
///
/// All storage backends (REST, S3, local filesystem) implement this trait so the upload
/// services work with any backend. Keys are bucket-relative.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `bucket/key`, publicly readable, and return its public URL.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Remove the given keys from a bucket. Missing keys are not an error.
    async fn remove(&self, bucket: &str, keys: &[String]) -> StorageResult<()>;

    /// Create the bucket if missing and reconcile its settings.
    async fn ensure_bucket(&self, name: &str, config: &BucketConfig) -> StorageResult<()>;

    /// Deterministic public URL for an object. Does not check existence.
    fn public_url(&self, bucket: &str, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Reject keys that could escape their bucket.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {key}"
        )));
    }
    Ok(())
}

/// Percent-encode each path segment of a key, keeping `/` separators.
pub(crate) fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_config_enforces_size_and_type() {
        let config = BucketConfig::public(10, vec!["image/png".to_string()]);
        assert!(config.check(10, "image/png").is_ok());
        assert_eq!(config.check(11, "image/png").unwrap_err().status(), Some(413));
        assert_eq!(config.check(1, "text/plain").unwrap_err().status(), Some(415));
    }

    #[test]
    fn keys_are_validated_and_encoded() {
        assert!(validate_key("uploads/a-1.png").is_ok());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("/abs").is_err());
        assert_eq!(encode_key("uploads/a b.png"), "uploads/a%20b.png");
    }
}
