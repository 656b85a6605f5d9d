//! Mediadrop database layer
//!
//! PostgreSQL repositories for asset records and the read-only user directory, plus the
//! traits the upload services depend on so they can run against in-memory stores in tests.

pub mod db;

pub use db::{AssetRepository, AssetStore, UserDirectory, UserRepository};
