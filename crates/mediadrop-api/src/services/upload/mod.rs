//! Upload services: the single-file pipeline and the batch orchestrator built on it.

mod batch;
mod service;

pub use batch::BatchUploader;
pub use service::UploadService;
