pub mod assets;
pub mod upload;

pub use assets::AssetService;
pub use upload::{BatchUploader, UploadService};
