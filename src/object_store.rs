//! Object store collaborator interface
//!
//! The cache is backed by an external object store. Absence of a key is
//! signaled through `exists`, distinctly from all other failures.

use crate::error::{Result, SisError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::RwLock;

/// Object storage operations used by the cache-aside pipeline
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether an object exists under `key`
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool>;

    /// Fetch the full object under `key`
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes>;

    /// Store `body` under `key` with the given content type.
    /// Writes to the same key are idempotent overwrites.
    async fn put(&self, bucket: &str, key: &str, body: Bytes, content_type: &str) -> Result<()>;
}

/// Stored object bytes plus content type
#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: String,
}

/// In-memory object store for tests and local debugging
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects across all buckets
    pub fn len(&self) -> usize {
        self.objects.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content type recorded for a stored object, if present
    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        self.objects
            .read()
            .ok()?
            .get(&(bucket.to_string(), key.to_string()))
            .map(|object| object.content_type.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        let objects = self
            .objects
            .read()
            .map_err(|_| SisError::InternalError("object store lock poisoned".to_string()))?;
        Ok(objects.contains_key(&(bucket.to_string(), key.to_string())))
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let objects = self
            .objects
            .read()
            .map_err(|_| SisError::InternalError("object store lock poisoned".to_string()))?;
        objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|object| object.body.clone())
            .ok_or_else(|| SisError::CacheStoreError(format!("no object under {}/{}", bucket, key)))
    }

    async fn put(&self, bucket: &str, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| SisError::InternalError("object store lock poisoned".to_string()))?;
        objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}
