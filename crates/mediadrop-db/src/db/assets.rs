use async_trait::async_trait;
use mediadrop_core::models::{AssetFilter, AssetRecord, NewAsset};
use mediadrop_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const ASSET_COLUMNS: &str = "id, filename, file_size, file_type, bucket_name, storage_path, public_url, user_id, created_at";

/// Persistence operations on asset records (table `images`)
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Insert one record; `id` and `created_at` are assigned by the store.
    async fn insert(&self, asset: NewAsset) -> Result<AssetRecord, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<AssetRecord>, AppError>;

    /// Newest first, optionally filtered by owner, bounded by the filter's limit.
    async fn list(&self, filter: &AssetFilter) -> Result<Vec<AssetRecord>, AppError>;

    /// Every record matching the owner filter, unbounded. Used by bulk deletion.
    async fn list_all(&self, user_id: Option<Uuid>) -> Result<Vec<AssetRecord>, AppError>;

    /// Delete one record. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Delete a set of records in one statement. Returns the number of rows removed.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError>;
}

/// Repository for asset records
#[derive(Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetStore for AssetRepository {
    #[tracing::instrument(
        skip(self, asset),
        fields(db.table = "images", db.operation = "insert", bucket = %asset.bucket_name, key = %asset.storage_path)
    )]
    async fn insert(&self, asset: NewAsset) -> Result<AssetRecord, AppError> {
        let record = sqlx::query_as::<Postgres, AssetRecord>(&format!(
            r#"
            INSERT INTO images (filename, file_size, file_type, bucket_name, storage_path, public_url, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ASSET_COLUMNS}
            "#
        ))
        .bind(&asset.filename)
        .bind(asset.file_size)
        .bind(&asset.file_type)
        .bind(&asset.bucket_name)
        .bind(&asset.storage_path)
        .bind(&asset.public_url)
        .bind(asset.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<AssetRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, AssetRecord>(&format!(
            "SELECT {ASSET_COLUMNS} FROM images WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "select"))]
    async fn list(&self, filter: &AssetFilter) -> Result<Vec<AssetRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, AssetRecord>(&format!(
            r#"
            SELECT {ASSET_COLUMNS} FROM images
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#
        ))
        .bind(filter.user_id)
        .bind(filter.effective_limit())
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "select"))]
    async fn list_all(&self, user_id: Option<Uuid>) -> Result<Vec<AssetRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, AssetRecord>(&format!(
            r#"
            SELECT {ASSET_COLUMNS} FROM images
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, ids), fields(db.table = "images", db.operation = "delete", db.record_count = ids.len()))]
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM images WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
