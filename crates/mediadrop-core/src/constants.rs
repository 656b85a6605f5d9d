//! Application-wide constants.

/// Per-file size ceiling (50 MiB), enforced before any network call.
pub const MAX_FILE_SIZE_BYTES: usize = 50 * 1024 * 1024;

/// Default maximum number of files accepted in one batch.
pub const DEFAULT_MAX_BATCH_FILES: usize = 500;

/// Delay inserted before every file of a batch except the first.
pub const DEFAULT_UPLOAD_PACING_MS: u64 = 500;

/// Maximum length of the sanitized filename base inside a storage key.
pub const MAX_BASE_NAME_LENGTH: usize = 50;

/// Length of the base-36 random token appended to storage keys.
pub const RANDOM_TOKEN_LENGTH: usize = 8;

/// Maximum number of keys passed to a single storage removal call.
pub const STORAGE_REMOVE_CHUNK_SIZE: usize = 1000;

/// Bucket used when `STORAGE_BUCKET` is not set.
pub const DEFAULT_BUCKET: &str = "images";

/// Content type stored when neither the extension nor the client declares one.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// MIME types accepted for upload.
pub const ALLOWED_CONTENT_TYPES: [&str; 12] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "video/mp4",
    "video/webm",
    "video/quicktime",
    "video/x-msvideo",
    "audio/mpeg",
    "audio/wav",
    "audio/ogg",
    "audio/mp4",
];

/// Default page size for asset listings.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Upper bound on a caller-supplied listing limit.
pub const MAX_LIST_LIMIT: i64 = 1000;
