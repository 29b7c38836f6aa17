//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Offline asset cache for a static site
#[derive(Parser, Debug)]
#[command(name = "swcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SWCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Site origin, overriding the config file
    #[arg(long, global = true, env = "SWCACHE_ORIGIN")]
    pub origin: Option<String>,

    /// Cache version tag, overriding the config file
    #[arg(long, global = true)]
    pub version_tag: Option<String>,

    /// Storage root, instead of the per-origin user cache directory
    #[arg(long, global = true, env = "SWCACHE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prefetch the asset manifest into the current bucket
    Install,

    /// Delete buckets from earlier cache versions
    Activate,

    /// Fetch a URL through the cache (network first, cache fallback)
    Fetch(FetchArgs),

    /// List buckets and their entries
    List,

    /// Delete every bucket
    Clear,
}

#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Absolute URL, or a path relative to the origin
    pub url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Treat the request as a page navigation
    #[arg(short, long)]
    pub navigate: bool,

    /// Write the response body to this file instead of printing a summary
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
