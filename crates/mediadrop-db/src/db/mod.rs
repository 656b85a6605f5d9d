//! Database repositories for data access layer
//!
//! Each repository owns a `PgPool` clone and implements the matching trait:
//! `AssetRepository` → `AssetStore` (table `images`) and `UserRepository` → `UserDirectory`
//! (table `users`, read-only).

pub mod assets;
pub mod users;

pub use assets::{AssetRepository, AssetStore};
pub use users::{UserDirectory, UserRepository};
