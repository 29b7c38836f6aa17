use thiserror::Error;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize cache entry: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid bucket name: {0:?}")]
    InvalidBucketName(String),

    #[error("Corrupt cache entry: {0}")]
    CorruptEntry(String),

    #[error("Failed to fetch manifest asset {url}: {reason}")]
    ManifestFetch { url: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    pub(crate) fn invalid_url(url: &str, err: impl std::fmt::Display) -> Self {
        CacheError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}
