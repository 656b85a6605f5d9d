//! Mock repository implementations for testing
//!
//! These mocks allow testing the upload and deletion services without database dependencies.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use mediadrop_core::models::{AssetFilter, AssetRecord, NewAsset};
use mediadrop_core::AppError;
use mediadrop_db::{AssetStore, UserDirectory};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Mock asset store for testing without database
///
/// `created_at` values are strictly increasing in insertion order, so listings are
/// deterministic.
#[derive(Clone)]
pub struct MockAssetStore {
    records: Arc<Mutex<HashMap<Uuid, AssetRecord>>>,
    fail_inserts: Arc<AtomicBool>,
    inserted: Arc<AtomicUsize>,
    delete_many_calls: Arc<AtomicUsize>,
}

impl Default for MockAssetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAssetStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            fail_inserts: Arc::new(AtomicBool::new(false)),
            inserted: Arc::new(AtomicUsize::new(0)),
            delete_many_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn records(&self) -> MutexGuard<'_, HashMap<Uuid, AssetRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_created_at(&self) -> DateTime<Utc> {
        let n = self.inserted.fetch_add(1, Ordering::SeqCst) as i64;
        let epoch = Utc
            .timestamp_millis_opt(1_700_000_000_000)
            .single()
            .unwrap_or_else(Utc::now);
        epoch + Duration::milliseconds(n)
    }

    /// Make every subsequent insert fail with a database-style error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Seed a record directly, bypassing the failure switch.
    pub fn seed(&self, asset: NewAsset) -> AssetRecord {
        let record = asset.into_record(Uuid::new_v4(), self.next_created_at());
        self.records().insert(record.id, record.clone());
        record
    }

    pub fn all(&self) -> Vec<AssetRecord> {
        let mut records: Vec<AssetRecord> = self.records().values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn delete_many_calls(&self) -> usize {
        self.delete_many_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetStore for MockAssetStore {
    async fn insert(&self, asset: NewAsset) -> Result<AssetRecord, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Internal("connection refused".to_string()));
        }
        Ok(self.seed(asset))
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetRecord>, AppError> {
        Ok(self.records().get(&id).cloned())
    }

    async fn list(&self, filter: &AssetFilter) -> Result<Vec<AssetRecord>, AppError> {
        let limit = filter.effective_limit() as usize;
        Ok(self
            .all()
            .into_iter()
            .filter(|r| filter.user_id.is_none() || r.user_id == filter.user_id)
            .take(limit)
            .collect())
    }

    async fn list_all(&self, user_id: Option<Uuid>) -> Result<Vec<AssetRecord>, AppError> {
        Ok(self
            .all()
            .into_iter()
            .filter(|r| user_id.is_none() || r.user_id == user_id)
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.records().remove(&id).is_some())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        self.delete_many_calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records();
        let removed = ids.iter().filter(|id| records.remove(*id).is_some()).count();
        Ok(removed as u64)
    }
}

/// Mock user directory with a fixed set of known users
#[derive(Clone, Default)]
pub struct MockUserDirectory {
    known: Arc<Mutex<HashSet<Uuid>>>,
    fail: Arc<AtomicBool>,
}

impl MockUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, id: Uuid) -> Self {
        self.add_user(id);
        self
    }

    pub fn add_user(&self, id: Uuid) {
        self.known
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
    }

    /// Make every lookup fail.
    pub fn fail_lookups(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserDirectory for MockUserDirectory {
    async fn user_exists(&self, id: Uuid) -> Result<bool, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("user lookup unavailable".to_string()));
        }
        Ok(self
            .known
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id))
    }
}
