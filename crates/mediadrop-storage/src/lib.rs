//! Mediadrop Storage Library
//!
//! This crate provides the storage sink abstraction and its implementations: an
//! object-storage REST API, S3 (via `object_store`) and the local filesystem.
//!
//! # Storage key format
//!
//! Keys are built by `mediadrop_core::naming` and are bucket-relative:
//! `{folder/}{base}-{timestamp_ms}-{token}.{ext}`. Keys must not contain `..` or a
//! leading `/`.
//!
//! Backend failures are mapped onto the per-file upload taxonomy by [`classify`].

pub mod classify;
pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-rest")]
pub mod rest;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use classify::{classify_message, classify_storage_error};
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use mediadrop_core::StorageBackend;
#[cfg(feature = "storage-rest")]
pub use rest::RestStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{BucketConfig, Storage, StorageError, StorageResult};
