//! Upload validation performed before any storage call.

use crate::constants::{ALLOWED_CONTENT_TYPES, DEFAULT_MAX_BATCH_FILES, MAX_FILE_SIZE_BYTES};
use crate::error::{AppError, UploadError};
use crate::models::UploadFile;
use crate::naming::resolve_content_type;

/// Limits enforced on single files and batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_size: usize,
    pub max_batch_files: usize,
    /// Lowercase MIME types
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE_BYTES,
            max_batch_files: DEFAULT_MAX_BATCH_FILES,
            allowed_content_types: ALLOWED_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl UploadLimits {
    pub fn is_allowed(&self, content_type: &str) -> bool {
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }
}

/// Reason a whole batch is refused before processing starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchRejection {
    #[error("No files provided")]
    Empty,

    #[error("Too many files: {count} provided, at most {max} allowed per batch")]
    TooManyFiles { count: usize, max: usize },

    #[error("Files exceed the {} byte limit: {}", .max_bytes, .files.join(", "))]
    OversizedFiles { files: Vec<String>, max_bytes: usize },
}

impl From<BatchRejection> for AppError {
    fn from(rejection: BatchRejection) -> Self {
        match rejection {
            BatchRejection::OversizedFiles { .. } => {
                AppError::PayloadTooLarge(rejection.to_string())
            }
            BatchRejection::Empty | BatchRejection::TooManyFiles { .. } => {
                AppError::BadRequest(rejection.to_string())
            }
        }
    }
}

/// Validate one file and return its resolved content type.
///
/// Fails with a `Validation` error for an empty file, a missing filename, a file above the
/// size cap, or a resolved type outside the allow-list.
pub fn validate_file(file: &UploadFile, limits: &UploadLimits) -> Result<String, UploadError> {
    if file.filename.trim().is_empty() {
        return Err(UploadError::validation("Missing filename"));
    }

    if file.data.is_empty() {
        return Err(UploadError::validation(format!(
            "File {} is empty",
            file.filename
        )));
    }

    if file.size() > limits.max_file_size {
        return Err(UploadError::validation(format!(
            "File {} is {} bytes, exceeding the {} byte limit",
            file.filename,
            file.size(),
            limits.max_file_size
        )));
    }

    let content_type = resolve_content_type(file.content_type.as_deref(), &file.filename);
    if !limits.is_allowed(&content_type) {
        return Err(UploadError::validation(format!(
            "File type {} is not allowed",
            content_type
        )));
    }

    Ok(content_type)
}

/// Whole-batch pre-check. Per-file type checks are left to the single-file path so one bad
/// file does not sink its siblings.
pub fn validate_batch(files: &[UploadFile], limits: &UploadLimits) -> Result<(), BatchRejection> {
    if files.is_empty() {
        return Err(BatchRejection::Empty);
    }

    if files.len() > limits.max_batch_files {
        return Err(BatchRejection::TooManyFiles {
            count: files.len(),
            max: limits.max_batch_files,
        });
    }

    let oversized: Vec<String> = files
        .iter()
        .filter(|f| f.size() > limits.max_file_size)
        .map(|f| f.filename.clone())
        .collect();
    if !oversized.is_empty() {
        return Err(BatchRejection::OversizedFiles {
            files: oversized,
            max_bytes: limits.max_file_size,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorMetadata, UploadErrorKind};

    fn file(name: &str, size: usize) -> UploadFile {
        UploadFile::new(name, None, vec![0u8; size])
    }

    #[test]
    fn accepts_allowed_file_and_returns_resolved_type() {
        let limits = UploadLimits::default();
        assert_eq!(
            validate_file(&file("photo.JPG", 10), &limits).unwrap(),
            "image/jpeg"
        );
    }

    #[test]
    fn rejects_empty_oversized_and_disallowed() {
        let limits = UploadLimits {
            max_file_size: 100,
            ..UploadLimits::default()
        };
        for f in [file("a.png", 0), file("a.png", 101), file("notes.txt", 5), file("", 5)] {
            let err = validate_file(&f, &limits).unwrap_err();
            assert_eq!(err.kind, UploadErrorKind::Validation);
        }
    }

    #[test]
    fn sixty_megabyte_file_fails_validation() {
        let err = validate_file(&file("big.mp4", 60 * 1024 * 1024), &UploadLimits::default())
            .unwrap_err();
        assert_eq!(err.kind, UploadErrorKind::Validation);
    }

    #[test]
    fn batch_rejections() {
        let limits = UploadLimits {
            max_file_size: 100,
            max_batch_files: 2,
            ..UploadLimits::default()
        };

        assert_eq!(validate_batch(&[], &limits), Err(BatchRejection::Empty));
        assert_eq!(
            validate_batch(&[file("a.png", 1), file("b.png", 1), file("c.png", 1)], &limits),
            Err(BatchRejection::TooManyFiles { count: 3, max: 2 })
        );

        let rejection =
            validate_batch(&[file("a.png", 1), file("huge.png", 500)], &limits).unwrap_err();
        assert!(rejection.to_string().contains("huge.png"));
        assert_eq!(AppError::from(rejection).http_status_code(), 413);

        assert!(validate_batch(&[file("a.png", 1), file("notes.txt", 1)], &limits).is_ok());
    }
}
