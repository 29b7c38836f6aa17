//! swcache core library.
//!
//! An offline asset cache for a static site: the network-first,
//! cache-fallback policy of the site's service worker, with pluggable
//! network and storage backends.
//!
//! - `cache`: the `OfflineCacheManager` lifecycle handlers and routing
//! - `config`: cache configuration and its resolved form
//! - `models`: request/response snapshots
//! - `net`: the `Network` trait and its `reqwest` implementation
//! - `storage`: named buckets in memory or on disk

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod net;
pub mod storage;

pub use cache::{FetchOutcome, InstallReport, OfflineCacheManager, PassReason, Route};
pub use config::{AllowlistMatch, CacheConfig, ResolvedConfig};
pub use error::{CacheError, Result};
pub use models::{Request, RequestKey, RequestMode, Response, ResponseType};
pub use net::{HttpNetwork, Network, NetworkError};
pub use storage::{Bucket, CacheStorage, CachedEntry, DiskStorage, MemoryStorage};

// Re-exported so hosts can build requests without depending on reqwest
pub use reqwest::{Method, Url};
