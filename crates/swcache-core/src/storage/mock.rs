//! Storage that fails on demand, for exercising error paths in tests.

use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::memory::MemoryBucket;
use super::{Bucket, CacheStorage, CachedEntry, MemoryStorage};
use crate::error::{CacheError, Result};
use crate::models::RequestKey;

#[derive(Default)]
struct Faults {
    put: HashSet<String>,
    get: HashSet<String>,
}

/// `MemoryStorage` whose buckets fail reads or writes for chosen URLs.
#[derive(Clone, Default)]
pub(crate) struct FaultyStorage {
    inner: MemoryStorage,
    faults: Arc<Mutex<Faults>>,
}

impl FaultyStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_put(&self, url: &str) {
        self.faults.lock().expect("faults lock").put.insert(url.to_string());
    }

    pub(crate) fn fail_get(&self, url: &str) {
        self.faults.lock().expect("faults lock").get.insert(url.to_string());
    }
}

fn disk_full(key: &RequestKey) -> CacheError {
    CacheError::Io(io::Error::new(io::ErrorKind::Other, format!("disk full: {}", key)))
}

#[async_trait]
impl CacheStorage for FaultyStorage {
    type Bucket = FaultyBucket;

    async fn open(&self, name: &str) -> Result<FaultyBucket> {
        Ok(FaultyBucket {
            inner: self.inner.open(name).await?,
            faults: Arc::clone(&self.faults),
        })
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys().await
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        self.inner.delete(name).await
    }
}

pub(crate) struct FaultyBucket {
    inner: MemoryBucket,
    faults: Arc<Mutex<Faults>>,
}

#[async_trait]
impl Bucket for FaultyBucket {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn put_entry(&self, entry: CachedEntry) -> Result<()> {
        let fail = self.faults.lock().expect("faults lock").put.contains(&entry.key.url);
        if fail {
            return Err(disk_full(&entry.key));
        }
        self.inner.put_entry(entry).await
    }

    async fn get(&self, key: &RequestKey) -> Result<Option<CachedEntry>> {
        let fail = self.faults.lock().expect("faults lock").get.contains(&key.url);
        if fail {
            return Err(disk_full(key));
        }
        self.inner.get(key).await
    }

    async fn delete_entry(&self, key: &RequestKey) -> Result<bool> {
        self.inner.delete_entry(key).await
    }

    async fn entries(&self) -> Result<Vec<CachedEntry>> {
        self.inner.entries().await
    }
}
