//! swcache - command-line host for the offline asset cache.
//!
//! Runs the install/activate/fetch handlers against an on-disk cache so a
//! site's offline behavior can be exercised and inspected from a shell.

mod cli;
mod commands;

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use swcache_core::{CacheConfig, DiskStorage, HttpNetwork, OfflineCacheManager};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

/// Initialize the tracing subscriber for logging.
/// The returned guard must live until exit so file logs are flushed.
fn init_tracing(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // RUST_LOG wins over -v
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    Ok(guard)
}

fn load_config(cli: &Cli) -> Result<CacheConfig> {
    let mut config = match &cli.config {
        Some(path) => CacheConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CacheConfig::load().context("Failed to load config")?,
    };
    if let Some(origin) = &cli.origin {
        config.origin = origin.clone();
    }
    if let Some(tag) = &cli.version_tag {
        config.version_tag = tag.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.verbose, cli.log_file.as_deref())?;

    let config = load_config(&cli)?;
    let cache_dir = match &cli.cache_dir {
        Some(dir) => dir.clone(),
        None => config.cache_dir()?,
    };
    debug!(cache_dir = %cache_dir.display(), version = %config.version_tag, "Using cache");

    let resolved = config.resolve().context("Invalid configuration")?;
    let network = HttpNetwork::new(resolved.origin.clone()).context("Failed to build HTTP client")?;
    let manager = OfflineCacheManager::with_resolved(
        resolved,
        DiskStorage::new(cache_dir),
        network.clone(),
    );

    info!(origin = %manager.config().origin, "swcache starting");

    match &cli.command {
        Commands::Install => commands::install(&manager).await,
        Commands::Activate => commands::activate(&manager).await,
        Commands::Fetch(args) => commands::fetch(&manager, &network, args).await,
        Commands::List => commands::list(&manager).await,
        Commands::Clear => commands::clear(&manager).await,
    }
}
