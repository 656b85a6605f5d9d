//! Mediadrop API Library
//!
//! This crate provides the HTTP handlers, the upload and asset services, and application setup.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
pub mod services;
pub mod setup;
mod telemetry;

// Public modules
pub mod error;
pub mod state;
pub mod test_helpers;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::{AssetService, BatchUploader, UploadService};
pub use state::AppState;
