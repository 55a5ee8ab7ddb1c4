pub mod config;
pub mod core;
pub mod log;
pub mod mcp;
pub mod providers;
pub mod store;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::cache::KeyValueCollection;
use crate::core::store::{FundStore, StoreSnapshot};
use crate::providers::file::{FileProvider, SnapshotFile};
use crate::providers::sec_api::SecApiProvider;
use crate::providers::FundDataProvider;
use crate::store::{DiskCollection, MemoryCollection};

pub fn load_config(config_path: Option<&str>) -> Result<config::AppConfig> {
    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

/// Fetches the catalog and NAV history from the SEC and writes the snapshot
/// file the serve path reads.
pub async fn refresh(config: &config::AppConfig) -> Result<()> {
    let api_key = config.providers.sec.resolve_api_key()?;
    let provider = SecApiProvider::new(
        &config.providers.sec.base_url,
        &api_key,
        config.history_days,
        open_cache(config),
    );

    let data = provider.fetch_snapshot().await?;
    info!(
        "Fetched {} funds, NAV history for {}",
        data.funds.len(),
        data.nav_history.len()
    );

    let path = config.snapshot_path()?;
    SnapshotFile {
        funds: data.funds,
        nav_history: data.nav_history,
    }
    .write(&path)
    .await?;
    info!("Snapshot written to {}", path.display());
    Ok(())
}

/// Loads the snapshot file into a store ready to serve.
pub async fn load_store(config: &config::AppConfig) -> Result<Arc<FundStore>> {
    let path = config.snapshot_path()?;
    let provider = FileProvider::new(&path);
    let data = provider
        .fetch_snapshot()
        .await
        .with_context(|| format!("No usable snapshot at {} (run `rmfx refresh`)", path.display()))?;

    let snapshot: StoreSnapshot = data.into();
    info!("Serving {} funds from {}", snapshot.len(), path.display());
    Ok(Arc::new(FundStore::new(snapshot)))
}

/// Disk-backed provider cache, falling back to memory when the data dir is
/// unavailable.
fn open_cache(config: &config::AppConfig) -> Arc<dyn KeyValueCollection> {
    let cache_dir = match config.default_data_path() {
        Ok(dir) => dir.join("cache"),
        Err(e) => {
            warn!("Could not determine data directory: {}. Cache is in-memory", e);
            return Arc::new(MemoryCollection::new());
        }
    };
    match DiskCollection::open(&cache_dir, "sec") {
        Ok(collection) => Arc::new(collection),
        Err(e) => {
            warn!(
                "Could not open cache at {}: {}. Cache is in-memory",
                cache_dir.display(),
                e
            );
            Arc::new(MemoryCollection::new())
        }
    }
}
