//! Test fixtures: minimal media blobs and multipart parts.

use axum_test::multipart::Part;
use mediadrop_core::models::NewAsset;
use uuid::Uuid;

/// Minimal valid 1x1 PNG bytes.
pub fn create_minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// A PNG file part with the given filename.
pub fn png_part(filename: &str) -> Part {
    Part::bytes(create_minimal_png())
        .file_name(filename.to_string())
        .mime_type("image/png")
}

/// Asset values for seeding the mock store directly.
pub fn new_asset(key: &str, user_id: Option<Uuid>) -> NewAsset {
    NewAsset {
        filename: key.to_string(),
        file_size: 67,
        file_type: "image/png".to_string(),
        bucket_name: "images".to_string(),
        storage_path: key.to_string(),
        public_url: format!("https://storage.test/images/{}", key),
        user_id,
    }
}
