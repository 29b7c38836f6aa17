use std::sync::Arc;

use futures::future::try_join_all;
use reqwest::Method;
use tracing::{debug, info, warn};

use super::route::Route;
use crate::config::{CacheConfig, ResolvedConfig};
use crate::error::{CacheError, Result};
use crate::models::{Request, RequestKey, Response};
use crate::net::Network;
use crate::storage::{Bucket, CacheStorage, CachedEntry};

/// Result of the fetch handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted; the host performs the request itself
    Passthrough,
    /// Answer the request with this response
    Respond(Response),
    /// Intercepted, but neither network nor cache could answer
    NoResponse,
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Respond(response) => Some(response),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub bucket: String,
    pub stored: usize,
}

/// Network-first cache for one site origin and one cache generation.
///
/// The futures returned by `install`, `activate` and `fetch` must be
/// driven to completion by the host; dropping one early abandons the
/// work (an install may be left rolled back, a fetch may not be cached).
pub struct OfflineCacheManager<S, N> {
    config: Arc<ResolvedConfig>,
    storage: Arc<S>,
    network: Arc<N>,
}

impl<S, N> Clone for OfflineCacheManager<S, N> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            storage: Arc::clone(&self.storage),
            network: Arc::clone(&self.network),
        }
    }
}

impl<S: CacheStorage, N: Network> OfflineCacheManager<S, N> {
    pub fn new(config: &CacheConfig, storage: S, network: N) -> Result<Self> {
        Ok(Self::with_resolved(config.resolve()?, storage, network))
    }

    pub fn with_resolved(config: ResolvedConfig, storage: S, network: N) -> Self {
        Self {
            config: Arc::new(config),
            storage: Arc::new(storage),
            network: Arc::new(network),
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Open the bucket for the current version tag
    pub async fn bucket(&self) -> Result<S::Bucket> {
        self.storage.open(&self.config.version_tag).await
    }

    /// Prefetch every manifest asset into the current bucket.
    ///
    /// All or nothing: if any asset fails to fetch or returns a non-OK
    /// status, nothing is stored and the install fails. If storing fails
    /// part-way, the bucket is put back as it was before the install.
    pub async fn install(&self) -> Result<InstallReport> {
        let bucket = self.bucket().await?;
        info!(
            bucket = bucket.name(),
            assets = self.config.manifest.len(),
            "Installing offline cache"
        );

        let fetches = self.config.manifest.iter().map(|url| async move {
            let request = Request::get(url.clone());
            match self.network.fetch(&request).await {
                Ok(response) if response.is_ok() => Ok((request.cache_key(), response)),
                Ok(response) => Err(CacheError::ManifestFetch {
                    url: url.to_string(),
                    reason: format!("status {}", response.status),
                }),
                Err(e) => Err(CacheError::ManifestFetch {
                    url: url.to_string(),
                    reason: e.to_string(),
                }),
            }
        });
        let fetched = match try_join_all(fetches).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(error = %e, "Install failed, nothing cached");
                return Err(e);
            }
        };

        // Entries replaced by this install, restored if a later write fails
        let mut written: Vec<(&RequestKey, Option<CachedEntry>)> = Vec::with_capacity(fetched.len());
        for (key, response) in &fetched {
            let stored = match bucket.get(key).await {
                Ok(prior) => bucket.put(key, response).await.map(|()| prior),
                Err(e) => Err(e),
            };
            match stored {
                Ok(prior) => written.push((key, prior)),
                Err(e) => {
                    warn!(key = %key, error = %e, "Install failed while storing, rolling back");
                    Self::roll_back(&bucket, written).await;
                    return Err(e);
                }
            }
        }

        info!(bucket = bucket.name(), stored = fetched.len(), "Offline cache installed");
        Ok(InstallReport {
            bucket: bucket.name().to_string(),
            stored: fetched.len(),
        })
    }

    async fn roll_back(bucket: &S::Bucket, written: Vec<(&RequestKey, Option<CachedEntry>)>) {
        for (key, prior) in written.into_iter().rev() {
            let result = match prior {
                Some(entry) => bucket.put_entry(entry).await,
                None => bucket.delete_entry(key).await.map(|_| ()),
            };
            if let Err(e) = result {
                warn!(key = %key, error = %e, "Failed to roll back entry");
            }
        }
    }

    /// Delete every bucket other than the current one. Returns the deleted
    /// bucket names, sorted.
    pub async fn activate(&self) -> Result<Vec<String>> {
        let current = &self.config.version_tag;
        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| name != current)
            .collect();

        let deletions = stale.iter().map(|name| async move {
            let deleted = self.storage.delete(name).await?;
            Ok::<_, CacheError>(deleted.then(|| name.clone()))
        });
        let mut deleted: Vec<String> = try_join_all(deletions).await?.into_iter().flatten().collect();
        deleted.sort();

        if !deleted.is_empty() {
            info!(current = %current, deleted = ?deleted, "Deleted stale cache buckets");
        }
        Ok(deleted)
    }

    /// Handle an intercepted request. Never fails: network errors fall back
    /// to the cache, then to the offline page for navigations.
    pub async fn fetch(&self, request: &Request) -> FetchOutcome {
        if let Route::Passthrough(reason) = Route::for_request(request, &self.config) {
            debug!(url = %request.url, method = %request.method, reason = ?reason, "Not intercepted");
            return FetchOutcome::Passthrough;
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.store(request, &response).await;
                } else {
                    debug!(
                        url = %request.url,
                        status = response.status,
                        response_type = ?response.response_type,
                        "Response not cacheable"
                    );
                }
                FetchOutcome::Respond(response)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Network failed, falling back to cache");
                self.fallback(request).await
            }
        }
    }

    /// Best effort: a failed write is logged and the response still served
    async fn store(&self, request: &Request, response: &Response) {
        let key = request.cache_key();
        let result = match self.bucket().await {
            Ok(bucket) => bucket.put(&key, response).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(key = %key, error = %e, "Failed to cache response");
        }
    }

    async fn lookup(&self, key: &RequestKey) -> Option<Response> {
        let result = match self.bucket().await {
            Ok(bucket) => bucket.get(key).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(entry) => entry.map(|e| e.response),
            Err(e) => {
                warn!(key = %key, error = %e, "Cache lookup failed, treating as miss");
                None
            }
        }
    }

    async fn fallback(&self, request: &Request) -> FetchOutcome {
        if let Some(response) = self.lookup(&request.cache_key()).await {
            debug!(url = %request.url, "Served from cache");
            return FetchOutcome::Respond(response);
        }

        if request.is_navigation() {
            let offline_key = RequestKey::new(&Method::GET, &self.config.offline_page);
            if let Some(response) = self.lookup(&offline_key).await {
                debug!(url = %request.url, "Served offline page");
                return FetchOutcome::Respond(response);
            }
        }

        debug!(url = %request.url, "No cached response");
        FetchOutcome::NoResponse
    }
}
