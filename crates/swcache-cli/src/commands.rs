//! Subcommand implementations.

use anyhow::{Context, Result};
use swcache_core::{
    Bucket, CacheStorage, DiskStorage, FetchOutcome, HttpNetwork, Method, Network,
    OfflineCacheManager, Request, RequestMode, Response, Url,
};
use tracing::info;

use crate::cli::FetchArgs;

pub type Manager = OfflineCacheManager<DiskStorage, HttpNetwork>;

pub async fn install(manager: &Manager) -> Result<()> {
    let report = manager
        .install()
        .await
        .context("Install failed; the previous cache is untouched")?;
    println!("Installed {} assets into {}", report.stored, report.bucket);
    Ok(())
}

pub async fn activate(manager: &Manager) -> Result<()> {
    let deleted = manager.activate().await.context("Activation failed")?;
    if deleted.is_empty() {
        println!("No stale buckets");
    } else {
        for name in &deleted {
            println!("Deleted {}", name);
        }
    }
    Ok(())
}

pub async fn fetch(manager: &Manager, network: &HttpNetwork, args: &FetchArgs) -> Result<()> {
    let url = manager
        .config()
        .origin
        .join(&args.url)
        .with_context(|| format!("Invalid URL: {}", args.url))?;
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid method: {}", args.method))?;
    let mode = if args.navigate {
        RequestMode::Navigate
    } else {
        RequestMode::default()
    };
    let request = Request::new(method, url, mode);

    let response = match manager.fetch(&request).await {
        FetchOutcome::Respond(response) => response,
        FetchOutcome::Passthrough => {
            info!(url = %request.url, "Not intercepted, fetching directly");
            network
                .fetch(&request)
                .await
                .with_context(|| format!("Failed to fetch {}", request.url))?
        }
        FetchOutcome::NoResponse => {
            anyhow::bail!("Offline and no cached response for {}", request.url)
        }
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &response.body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} bytes written to {}", response.body.len(), path.display());
        }
        None => print_summary(&request.url, &response),
    }
    Ok(())
}

fn print_summary(url: &Url, response: &Response) {
    println!("{}", url);
    println!("  status: {}", response.status);
    println!("  type:   {:?}", response.response_type);
    if let Some(content_type) = response.content_type() {
        println!("  content-type: {}", content_type);
    }
    println!("  bytes:  {}", response.body.len());
}

pub async fn list(manager: &Manager) -> Result<()> {
    let storage = manager.storage();
    let names = storage.keys().await.context("Failed to list buckets")?;
    if names.is_empty() {
        println!("No buckets in {}", storage.root().display());
        return Ok(());
    }

    let current = &manager.config().version_tag;
    for name in names {
        let bucket = storage.open(&name).await?;
        let entries = bucket.entries().await?;
        let marker = if &name == current { " (current)" } else { "" };
        println!("{}{}: {} entries", name, marker, entries.len());
        for entry in entries {
            println!(
                "  {:<8} {:>8} bytes  {}",
                entry.age_display(),
                entry.response.body.len(),
                entry.key
            );
        }
    }
    Ok(())
}

pub async fn clear(manager: &Manager) -> Result<()> {
    let storage = manager.storage();
    for name in storage.keys().await? {
        storage
            .delete(&name)
            .await
            .with_context(|| format!("Failed to delete bucket {}", name))?;
        println!("Deleted {}", name);
    }
    Ok(())
}
