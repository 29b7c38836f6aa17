//! Named cache buckets.
//!
//! A `CacheStorage` holds any number of buckets keyed by name (the cache
//! version tag); each `Bucket` maps a `RequestKey` to a stored response.
//! Per-key `put` and `delete_entry` are atomic in every backend.

pub mod disk;
pub mod entry;
pub mod memory;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::error::{CacheError, Result};
use crate::models::{RequestKey, Response};

pub use disk::DiskStorage;
pub use entry::CachedEntry;
pub use memory::MemoryStorage;

#[async_trait]
pub trait CacheStorage: Send + Sync {
    type Bucket: Bucket;

    /// Open the named bucket, creating it if absent
    async fn open(&self, name: &str) -> Result<Self::Bucket>;

    /// Names of all existing buckets
    async fn keys(&self) -> Result<Vec<String>>;

    async fn has(&self, name: &str) -> Result<bool> {
        Ok(self.keys().await?.iter().any(|k| k == name))
    }

    /// Delete a bucket and everything in it. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool>;
}

#[async_trait]
pub trait Bucket: Send + Sync {
    fn name(&self) -> &str;

    /// Store a response, replacing any previous entry for the key
    async fn put(&self, key: &RequestKey, response: &Response) -> Result<()> {
        self.put_entry(CachedEntry::new(key.clone(), response.clone()))
            .await
    }

    /// Store an entry as-is, keeping its `cached_at`
    async fn put_entry(&self, entry: CachedEntry) -> Result<()>;

    async fn get(&self, key: &RequestKey) -> Result<Option<CachedEntry>>;

    async fn delete_entry(&self, key: &RequestKey) -> Result<bool>;

    async fn entries(&self) -> Result<Vec<CachedEntry>>;

    async fn len(&self) -> Result<usize> {
        Ok(self.entries().await?.len())
    }
}

/// Bucket names end up as directory names, so keep them to a single
/// plain path component.
pub(crate) fn validate_bucket_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(|c: char| matches!(c, '/' | '\\' | '\0'));
    if invalid {
        return Err(CacheError::InvalidBucketName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bucket_name() {
        assert!(validate_bucket_name("portfolio-v1").is_ok());
        assert!(validate_bucket_name("v2.1").is_ok());
        assert!(validate_bucket_name("").is_err());
        assert!(validate_bucket_name("..").is_err());
        assert!(validate_bucket_name("a/b").is_err());
        assert!(validate_bucket_name("a\\b").is_err());
    }
}
