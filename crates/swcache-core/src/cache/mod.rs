//! Offline cache manager.
//!
//! The `OfflineCacheManager` implements the three lifecycle handlers of
//! the site's offline cache:
//! - `install`: prefetch the asset manifest into the current bucket
//! - `activate`: delete buckets left over from earlier versions
//! - `fetch`: network first, falling back to the cache and then to the
//!   offline page

pub mod manager;
pub mod route;

pub use manager::{FetchOutcome, InstallReport, OfflineCacheManager};
pub use route::{PassReason, Route};
