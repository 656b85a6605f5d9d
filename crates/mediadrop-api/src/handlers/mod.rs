pub mod assets;
pub mod batch;
pub mod health;
pub mod multipart;
pub mod upload;
