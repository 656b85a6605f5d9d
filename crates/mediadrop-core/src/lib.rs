//! Mediadrop Core Library
//!
//! This crate provides the domain models, error types, configuration, filename and
//! storage-key handling, and upload validation shared across all mediadrop components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod naming;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel, UploadError, UploadErrorKind};
pub use storage_types::StorageBackend;
pub use validation::{BatchRejection, UploadLimits};
// Note: Storage, StorageError, StorageResult live in the mediadrop-storage crate
