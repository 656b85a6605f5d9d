//! Mock storage sink
//!
//! Keeps objects in memory, records every call, and can be scripted to fail specific
//! `put` calls or every `remove`.

use async_trait::async_trait;
use mediadrop_core::StorageBackend;
use mediadrop_storage::{BucketConfig, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Scripted failure returned by the mock.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Backend answered with an HTTP status
    Status(u16, String),
    /// Backend answered with a body that is not JSON
    Malformed(String),
    Backend(String),
}

impl MockFailure {
    fn to_error(&self) -> StorageError {
        match self {
            MockFailure::Status(status, message) => StorageError::Rejected {
                status: *status,
                message: message.clone(),
            },
            MockFailure::Malformed(body) => StorageError::MalformedResponse(body.clone()),
            MockFailure::Backend(message) => StorageError::BackendError(message.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutCall {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveCall {
    pub bucket: String,
    pub keys: Vec<String>,
}

#[derive(Default)]
struct Inner {
    objects: HashMap<(String, String), Vec<u8>>,
    buckets: HashMap<String, BucketConfig>,
    put_calls: Vec<PutCall>,
    remove_calls: Vec<RemoveCall>,
    put_failures: HashMap<usize, MockFailure>,
    remove_failure: Option<MockFailure>,
}

/// In-memory storage sink for tests
#[derive(Clone, Default)]
pub struct MockStorage {
    inner: Arc<Mutex<Inner>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail the `index`-th (zero-based) call to `put`.
    pub fn fail_put_at(&self, index: usize, failure: MockFailure) {
        self.lock().put_failures.insert(index, failure);
    }

    /// Fail every subsequent call to `remove`.
    pub fn fail_removes(&self, failure: MockFailure) {
        self.lock().remove_failure = Some(failure);
    }

    /// Pre-populate an object.
    pub fn insert_object(&self, bucket: &str, key: &str, data: Vec<u8>) {
        self.lock()
            .objects
            .insert((bucket.to_string(), key.to_string()), data);
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.lock()
            .objects
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    pub fn object_count(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn put_calls(&self) -> Vec<PutCall> {
        self.lock().put_calls.clone()
    }

    pub fn remove_calls(&self) -> Vec<RemoveCall> {
        self.lock().remove_calls.clone()
    }

    pub fn bucket_config(&self, name: &str) -> Option<BucketConfig> {
        self.lock().buckets.get(name).cloned()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let mut inner = self.lock();
        let index = inner.put_calls.len();
        inner.put_calls.push(PutCall {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: content_type.to_string(),
            size: data.len(),
        });

        if let Some(failure) = inner.put_failures.get(&index) {
            return Err(failure.to_error());
        }

        inner
            .objects
            .insert((bucket.to_string(), key.to_string()), data);
        drop(inner);
        Ok(self.public_url(bucket, key))
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> StorageResult<()> {
        let mut inner = self.lock();
        inner.remove_calls.push(RemoveCall {
            bucket: bucket.to_string(),
            keys: keys.to_vec(),
        });

        if let Some(failure) = &inner.remove_failure {
            return Err(failure.to_error());
        }

        for key in keys {
            inner.objects.remove(&(bucket.to_string(), key.clone()));
        }
        Ok(())
    }

    async fn ensure_bucket(&self, name: &str, config: &BucketConfig) -> StorageResult<()> {
        self.lock().buckets.insert(name.to_string(), config.clone());
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("https://storage.test/{}/{}", bucket, key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
