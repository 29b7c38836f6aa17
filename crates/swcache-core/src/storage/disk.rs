//! On-disk bucket storage.
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/<bucket name>/<sha256 of request key>.entry
//! ```
//!
//! Each entry file is one line of JSON metadata (`CachedEntry` without the
//! body), a newline, then the raw body bytes. Entries are written to a
//! temporary file and renamed into place, so a reader never sees a
//! half-written entry.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use super::{validate_bucket_name, Bucket, CacheStorage, CachedEntry};
use crate::error::{CacheError, Result};
use crate::models::RequestKey;

const ENTRY_EXTENSION: &str = "entry";

/// Distinguishes concurrent temporary files within this process
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, name: &str) -> Result<PathBuf> {
        validate_bucket_name(name)?;
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    type Bucket = DiskBucket;

    async fn open(&self, name: &str) -> Result<DiskBucket> {
        let dir = self.bucket_dir(name)?;
        fs::create_dir_all(&dir).await?;
        Ok(DiskBucket {
            name: name.to_string(),
            dir,
        })
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut read_dir = match fs::read_dir(&self.root).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(dirent) = read_dir.next_entry().await? {
            if !dirent.file_type().await?.is_dir() {
                continue;
            }
            match dirent.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => warn!(name = ?raw, "Skipping bucket with non UTF-8 name"),
            }
        }
        names.sort();
        Ok(names)
    }

    async fn has(&self, name: &str) -> Result<bool> {
        Ok(fs::metadata(self.bucket_dir(name)?)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let dir = self.bucket_dir(name)?;
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!(bucket = name, "Deleted bucket directory");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

pub struct DiskBucket {
    name: String,
    dir: PathBuf,
}

impl DiskBucket {
    fn entry_path(&self, key: &RequestKey) -> PathBuf {
        self.dir
            .join(format!("{}.{}", key.digest(), ENTRY_EXTENSION))
    }

    fn encode(entry: &CachedEntry) -> Result<Vec<u8>> {
        let mut contents = serde_json::to_vec(entry)?;
        contents.push(b'\n');
        contents.extend_from_slice(&entry.response.body);
        Ok(contents)
    }

    fn decode(path: &Path, contents: &[u8]) -> Result<CachedEntry> {
        let split = contents
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| CacheError::CorruptEntry(path.display().to_string()))?;
        let mut entry: CachedEntry = serde_json::from_slice(&contents[..split])?;
        entry.response.body = contents[split + 1..].to_vec();
        Ok(entry)
    }

    async fn read_entry(path: &Path) -> Result<Option<CachedEntry>> {
        match fs::read(path).await {
            Ok(contents) => Self::decode(path, &contents).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Bucket for DiskBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put_entry(&self, entry: CachedEntry) -> Result<()> {
        let key = &entry.key;
        let contents = Self::encode(&entry)?;

        // The bucket may have been deleted since it was opened
        fs::create_dir_all(&self.dir).await?;

        let path = self.entry_path(key);
        let temp = self.dir.join(format!(
            "{}.{}.{}.tmp",
            key.digest(),
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&temp, contents).await?;
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        debug!(bucket = %self.name, key = %key, "Stored entry");
        Ok(())
    }

    async fn get(&self, key: &RequestKey) -> Result<Option<CachedEntry>> {
        let entry = Self::read_entry(&self.entry_path(key)).await?;
        // A digest collision would hand back another request's response
        Ok(entry.filter(|e| &e.key == key))
    }

    async fn delete_entry(&self, key: &RequestKey) -> Result<bool> {
        match fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn entries(&self) -> Result<Vec<CachedEntry>> {
        let mut read_dir = match fs::read_dir(&self.dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(dirent) = read_dir.next_entry().await? {
            let path = dirent.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            match Self::read_entry(&path).await {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable entry"),
            }
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}
