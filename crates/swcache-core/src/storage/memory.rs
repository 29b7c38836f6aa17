//! In-process bucket storage.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{validate_bucket_name, Bucket, CacheStorage, CachedEntry};
use crate::error::Result;
use crate::models::RequestKey;

type Buckets = BTreeMap<String, BTreeMap<RequestKey, CachedEntry>>;

/// Buckets held in memory and shared between clones.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    buckets: Arc<RwLock<Buckets>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    type Bucket = MemoryBucket;

    async fn open(&self, name: &str) -> Result<MemoryBucket> {
        validate_bucket_name(name)?;
        self.buckets
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(MemoryBucket {
            name: name.to_string(),
            buckets: Arc::clone(&self.buckets),
        })
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.buckets.read().await.keys().cloned().collect())
    }

    async fn has(&self, name: &str) -> Result<bool> {
        Ok(self.buckets.read().await.contains_key(name))
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.buckets.write().await.remove(name).is_some())
    }
}

pub struct MemoryBucket {
    name: String,
    buckets: Arc<RwLock<Buckets>>,
}

#[async_trait]
impl Bucket for MemoryBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put_entry(&self, entry: CachedEntry) -> Result<()> {
        self.buckets
            .write()
            .await
            .entry(self.name.clone())
            .or_default()
            .insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn get(&self, key: &RequestKey) -> Result<Option<CachedEntry>> {
        Ok(self
            .buckets
            .read()
            .await
            .get(&self.name)
            .and_then(|bucket| bucket.get(key))
            .cloned())
    }

    async fn delete_entry(&self, key: &RequestKey) -> Result<bool> {
        Ok(self
            .buckets
            .write()
            .await
            .get_mut(&self.name)
            .map(|bucket| bucket.remove(key).is_some())
            .unwrap_or(false))
    }

    async fn entries(&self) -> Result<Vec<CachedEntry>> {
        Ok(self
            .buckets
            .read()
            .await
            .get(&self.name)
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default())
    }
}
