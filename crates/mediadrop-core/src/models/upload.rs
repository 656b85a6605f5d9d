use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::asset::AssetRecord;
use crate::error::UploadError;

/// Warning attached to a degraded upload.
pub const METADATA_NOT_SAVED_WARNING: &str = "File uploaded but metadata was not saved";

/// Message carried by outcomes synthesized after a rate-limit short-circuit.
pub const SKIPPED_RATE_LIMITED_MESSAGE: &str = "Skipped due to rate limiting";

/// A file received from the caller, fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    /// Client-declared MIME type, if any
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// Stored and recorded
    Uploaded,
    /// Stored, record write failed
    Degraded,
    Failed,
    /// Never attempted because the batch hit a rate limit
    Skipped,
}

/// Result of processing a single file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub filename: String,
    pub success: bool,
    pub status: OutcomeStatus,
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<AssetRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<UploadError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl UploadOutcome {
    pub fn uploaded(record: AssetRecord) -> Self {
        Self {
            filename: record.filename.clone(),
            success: true,
            status: OutcomeStatus::Uploaded,
            skipped: false,
            storage_path: Some(record.storage_path.clone()),
            public_url: Some(record.public_url.clone()),
            record: Some(record),
            error: None,
            warning: None,
        }
    }

    /// Bytes are stored but the metadata write failed. Still counts as a success.
    pub fn degraded(
        filename: impl Into<String>,
        storage_path: impl Into<String>,
        public_url: impl Into<String>,
        error: UploadError,
    ) -> Self {
        Self {
            filename: filename.into(),
            success: true,
            status: OutcomeStatus::Degraded,
            skipped: false,
            storage_path: Some(storage_path.into()),
            public_url: Some(public_url.into()),
            record: None,
            error: Some(error),
            warning: Some(METADATA_NOT_SAVED_WARNING.to_string()),
        }
    }

    pub fn failed(filename: impl Into<String>, error: UploadError) -> Self {
        Self {
            filename: filename.into(),
            success: false,
            status: OutcomeStatus::Failed,
            skipped: false,
            storage_path: None,
            public_url: None,
            record: None,
            error: Some(error),
            warning: None,
        }
    }

    pub fn skipped_rate_limited(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            success: false,
            status: OutcomeStatus::Skipped,
            skipped: true,
            storage_path: None,
            public_url: None,
            record: None,
            error: Some(UploadError::rate_limited(SKIPPED_RATE_LIMITED_MESSAGE)),
            warning: None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.error.as_ref().is_some_and(UploadError::is_rate_limited)
    }
}

/// Aggregate result of a batch upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchUploadResult {
    /// One entry per input file, in input order
    pub outcomes: Vec<UploadOutcome>,
    pub total_files: usize,
    pub successful_uploads: usize,
    pub rate_limit_hit: bool,
}

impl BatchUploadResult {
    /// Build the aggregate so the counters always agree with `outcomes`.
    pub fn from_outcomes(outcomes: Vec<UploadOutcome>) -> Self {
        let successful_uploads = outcomes.iter().filter(|o| o.success).count();
        let rate_limit_hit = outcomes.iter().any(UploadOutcome::is_rate_limited);
        Self {
            total_files: outcomes.len(),
            successful_uploads,
            rate_limit_hit,
            outcomes,
        }
    }

    pub fn failed_uploads(&self) -> usize {
        self.total_files - self.successful_uploads
    }
}
