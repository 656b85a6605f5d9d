use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::constants::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

/// Metadata row describing one stored object (table `images`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct AssetRecord {
    pub id: Uuid,
    /// Original client filename
    pub filename: String,
    pub file_size: i64,
    /// Resolved MIME type
    pub file_type: String,
    pub bucket_name: String,
    pub storage_path: String,
    pub public_url: String,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Values supplied when inserting an asset record. `id` and `created_at` are server-assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAsset {
    pub filename: String,
    pub file_size: i64,
    pub file_type: String,
    pub bucket_name: String,
    pub storage_path: String,
    pub public_url: String,
    pub user_id: Option<Uuid>,
}

impl NewAsset {
    /// Materialize the record a store would return for this insert.
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> AssetRecord {
        AssetRecord {
            id,
            filename: self.filename,
            file_size: self.file_size,
            file_type: self.file_type,
            bucket_name: self.bucket_name,
            storage_path: self.storage_path,
            public_url: self.public_url,
            user_id: self.user_id,
            created_at,
        }
    }
}

/// Listing filter: optional owner and a page size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct AssetFilter {
    /// Only return assets owned by this user
    pub user_id: Option<Uuid>,
    /// Maximum number of records (default 50, at most 1000)
    #[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
    pub limit: Option<i64>,
}

impl AssetFilter {
    pub fn for_user(user_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            limit: None,
        }
    }

    /// Limit clamped into `1..=MAX_LIST_LIMIT`, defaulting when absent.
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_limit_defaults_and_clamps() {
        assert_eq!(AssetFilter::default().effective_limit(), 50);
        let filter = AssetFilter {
            user_id: None,
            limit: Some(5000),
        };
        assert_eq!(filter.effective_limit(), 1000);
        let filter = AssetFilter {
            user_id: None,
            limit: Some(0),
        };
        assert_eq!(filter.effective_limit(), 1);
    }

    #[test]
    fn limit_range_is_validated() {
        assert!(AssetFilter::default().validate().is_ok());
        let filter = AssetFilter {
            user_id: None,
            limit: Some(1000),
        };
        assert!(filter.validate().is_ok());
        let filter = AssetFilter {
            user_id: None,
            limit: Some(1001),
        };
        assert!(filter.validate().is_err());
    }
}
