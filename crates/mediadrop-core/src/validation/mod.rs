//! Validation modules

pub mod upload;

pub use upload::{validate_batch, validate_file, BatchRejection, UploadLimits};
