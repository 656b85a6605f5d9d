//! Data models for the application
//!
//! `asset` holds the persisted metadata row; `upload` holds the ephemeral per-file and
//! per-batch results returned to callers.

mod asset;
mod upload;

pub use asset::*;
pub use upload::*;
