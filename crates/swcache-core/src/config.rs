//! Cache configuration.
//!
//! `CacheConfig` is the on-disk JSON form, stored by default at
//! `~/.config/swcache/config.json`. It is resolved once into a
//! `ResolvedConfig` with parsed URLs when a manager is built, and is
//! immutable after that.

use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CacheError, Result};
use crate::storage::validate_bucket_name;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "swcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_ORIGIN: &str = "http://localhost:5000";
const DEFAULT_VERSION_TAG: &str = "portfolio-v1";
const DEFAULT_OFFLINE_PAGE: &str = "/offline.html";

const DEFAULT_MANIFEST: &[&str] = &[
    "/",
    "/static/css/digital_alchemy.css",
    "/static/manifest.json",
    "/offline.html",
    "https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700;800&family=JetBrains+Mono:wght@400;500&display=swap",
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
];

const DEFAULT_ALLOWLIST: &[&str] = &["cdnjs", "fonts"];

/// How allow-list fragments are matched against a cross-origin URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowlistMatch {
    /// Fragment must appear in the URL host
    #[default]
    Host,
    /// Fragment may appear anywhere in the URL
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Site origin, e.g. `https://example.com`
    pub origin: String,
    /// Bucket name for the current cache generation
    pub version_tag: String,
    /// Assets prefetched at install; relative entries resolve against `origin`
    pub manifest: Vec<String>,
    pub offline_page_url: String,
    /// Host fragments of cross-origin CDNs whose responses are cached
    pub allowlist: Vec<String>,
    pub allowlist_match: AllowlistMatch,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            version_tag: DEFAULT_VERSION_TAG.to_string(),
            manifest: DEFAULT_MANIFEST.iter().map(|s| s.to_string()).collect(),
            offline_page_url: DEFAULT_OFFLINE_PAGE.to_string(),
            allowlist: DEFAULT_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
            allowlist_match: AllowlistMatch::default(),
        }
    }
}

impl CacheConfig {
    /// Load from the default config path, or defaults if no file exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CacheError::Config("Could not find config directory".to_string()))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Per-origin storage root, e.g. `~/.cache/swcache/localhost_5000`
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| CacheError::Config("Could not find cache directory".to_string()))?;
        let origin = parse_origin(&self.origin)?;
        Ok(cache_dir.join(APP_NAME).join(origin_dir_name(&origin)))
    }

    /// Parse every URL and collapse duplicate manifest entries.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let origin = parse_origin(&self.origin)?;

        if self.version_tag.trim().is_empty() {
            return Err(CacheError::Config("version_tag must not be empty".to_string()));
        }
        validate_bucket_name(&self.version_tag)?;

        let mut manifest: Vec<Url> = Vec::with_capacity(self.manifest.len());
        for entry in &self.manifest {
            let url = origin
                .join(entry)
                .map_err(|e| CacheError::invalid_url(entry, e))?;
            if manifest.contains(&url) {
                warn!(url = %url, "Duplicate manifest entry ignored");
                continue;
            }
            manifest.push(url);
        }

        let offline_page = origin
            .join(&self.offline_page_url)
            .map_err(|e| CacheError::invalid_url(&self.offline_page_url, e))?;

        let allowlist = self
            .allowlist
            .iter()
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(ResolvedConfig {
            origin,
            version_tag: self.version_tag.clone(),
            manifest,
            offline_page,
            allowlist,
            allowlist_match: self.allowlist_match,
        })
    }
}

fn parse_origin(origin: &str) -> Result<Url> {
    let url = Url::parse(origin).map_err(|e| CacheError::invalid_url(origin, e))?;
    if url.host_str().is_none() {
        return Err(CacheError::invalid_url(origin, "origin has no host"));
    }
    Ok(url)
}

fn origin_dir_name(origin: &Url) -> String {
    let host = origin.host_str().unwrap_or("local");
    match origin.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host.to_string(),
    }
}

/// Validated configuration handed to the cache manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub origin: Url,
    pub version_tag: String,
    pub manifest: Vec<Url>,
    pub offline_page: Url,
    pub allowlist: Vec<String>,
    pub allowlist_match: AllowlistMatch,
}

impl ResolvedConfig {
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }

    pub fn is_allowlisted(&self, url: &Url) -> bool {
        match self.allowlist_match {
            AllowlistMatch::Host => {
                let Some(host) = url.host_str() else {
                    return false;
                };
                let host = host.to_ascii_lowercase();
                self.allowlist.iter().any(|fragment| host.contains(fragment.as_str()))
            }
            AllowlistMatch::Substring => {
                let url = url.as_str().to_ascii_lowercase();
                self.allowlist.iter().any(|fragment| url.contains(fragment.as_str()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("valid test URL")
    }

    #[test]
    fn test_default_resolves_portfolio_manifest() {
        let resolved = CacheConfig::default().resolve().unwrap();
        assert_eq!(resolved.version_tag, "portfolio-v1");
        assert_eq!(resolved.manifest.len(), 6);
        assert_eq!(resolved.manifest[0].as_str(), "http://localhost:5000/");
        assert_eq!(
            resolved.offline_page.as_str(),
            "http://localhost:5000/offline.html"
        );
        assert!(resolved.manifest.contains(&resolved.offline_page));
    }

    #[test]
    fn test_duplicate_manifest_entries_collapsed() {
        let config = CacheConfig {
            manifest: vec![
                "/".to_string(),
                "/offline.html".to_string(),
                "http://localhost:5000/offline.html".to_string(),
            ],
            ..CacheConfig::default()
        };
        assert_eq!(config.resolve().unwrap().manifest.len(), 2);
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let config = CacheConfig {
            origin: "not a url".to_string(),
            ..CacheConfig::default()
        };
        assert!(matches!(config.resolve(), Err(CacheError::InvalidUrl { .. })));
    }

    #[test]
    fn test_empty_version_tag_rejected() {
        let config = CacheConfig {
            version_tag: " ".to_string(),
            ..CacheConfig::default()
        };
        assert!(matches!(config.resolve(), Err(CacheError::Config(_))));
    }

    #[test]
    fn test_version_tag_must_be_a_bucket_name() {
        for tag in ["a/b", "..", "v1\\old"] {
            let config = CacheConfig {
                version_tag: tag.to_string(),
                ..CacheConfig::default()
            };
            assert!(
                matches!(config.resolve(), Err(CacheError::InvalidBucketName(ref name)) if name == tag),
                "tag {:?} accepted",
                tag
            );
        }
    }

    #[test]
    fn test_host_allowlist_ignores_path_matches() {
        let resolved = CacheConfig::default().resolve().unwrap();
        assert!(resolved.is_allowlisted(&url("https://fonts.googleapis.com/css2?family=Inter")));
        assert!(resolved.is_allowlisted(&url("https://cdnjs.cloudflare.com/ajax/libs/x.css")));
        assert!(!resolved.is_allowlisted(&url("https://evil.example/fonts/x.woff2")));
    }

    #[test]
    fn test_substring_allowlist_matches_anywhere() {
        let config = CacheConfig {
            allowlist_match: AllowlistMatch::Substring,
            ..CacheConfig::default()
        };
        let resolved = config.resolve().unwrap();
        assert!(resolved.is_allowlisted(&url("https://evil.example/fonts/x.woff2")));
        assert!(!resolved.is_allowlisted(&url("https://www.google-analytics.com/collect")));
    }

    #[test]
    fn test_same_origin_requires_scheme_host_and_port() {
        let resolved = CacheConfig::default().resolve().unwrap();
        assert!(resolved.is_same_origin(&url("http://localhost:5000/about")));
        assert!(!resolved.is_same_origin(&url("https://localhost:5000/about")));
        assert!(!resolved.is_same_origin(&url("http://localhost:5001/about")));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = CacheConfig::load_from(&tmp.path().join("config.json")).unwrap();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"version_tag": "portfolio-v2", "allowlist_match": "substring"}"#)
            .unwrap();
        let config = CacheConfig::load_from(&path).unwrap();
        assert_eq!(config.version_tag, "portfolio-v2");
        assert_eq!(config.allowlist_match, AllowlistMatch::Substring);
        assert_eq!(config.offline_page_url, "/offline.html");
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.json");
        let config = CacheConfig {
            origin: "https://portfolio.example".to_string(),
            ..CacheConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(CacheConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_origin_dir_name() {
        assert_eq!(origin_dir_name(&url("http://localhost:5000")), "localhost_5000");
        assert_eq!(origin_dir_name(&url("https://portfolio.example")), "portfolio.example");
    }
}
