//! Test helpers for service and router tests
//!
//! This module provides in-memory implementations of the storage sink and the
//! metadata stores so the upload pipeline can be exercised without a network or a
//! database.

pub mod mock_repositories;
pub mod mock_storage;

pub use mock_repositories::{MockAssetStore, MockUserDirectory};
pub use mock_storage::{MockFailure, MockStorage, PutCall, RemoveCall};

use mediadrop_core::models::UploadFile;

/// Build an in-memory PNG upload with `size` bytes of payload.
pub fn png_file(filename: &str, size: usize) -> UploadFile {
    UploadFile::new(filename, Some("image/png".to_string()), vec![0u8; size])
}
