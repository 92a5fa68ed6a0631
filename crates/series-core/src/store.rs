//! Durable catalog and stats persistence
//!
//! The catalog is read once at the start of a merge and written once at the
//! end. Writes go to a uniquely named sibling file first and are renamed over
//! the target, so readers never observe a half-written catalog.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::Result;
use crate::types::{Catalog, RunStats};

/// Loads and saves the catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Current catalog; an empty one when nothing usable is stored.
    async fn load(&self) -> Catalog;

    async fn save(&self, catalog: &Catalog) -> Result<()>;
}

/// Receives the per-run summary.
#[async_trait]
pub trait StatsSink: Send + Sync {
    async fn publish(&self, stats: &RunStats) -> Result<()>;
}

/// Catalog stored as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonCatalogStore {
    path: PathBuf,
}

impl JsonCatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogStore for JsonCatalogStore {
    async fn load(&self) -> Catalog {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no catalog yet, starting empty");
                return Catalog::default();
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "catalog unreadable, starting empty");
                return Catalog::default();
            }
        };

        match serde_json::from_slice::<Catalog>(&bytes) {
            Ok(catalog) => {
                tracing::info!(
                    path = %self.path.display(),
                    series = catalog.series.len(),
                    "loaded catalog"
                );
                catalog
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "catalog corrupt, starting empty");
                Catalog::default()
            }
        }
    }

    async fn save(&self, catalog: &Catalog) -> Result<()> {
        write_json_atomic(&self.path, catalog).await?;
        tracing::info!(
            path = %self.path.display(),
            series = catalog.series.len(),
            "saved catalog"
        );
        Ok(())
    }
}

/// Stats written as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonStatsSink {
    path: PathBuf,
}

impl JsonStatsSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StatsSink for JsonStatsSink {
    async fn publish(&self, stats: &RunStats) -> Result<()> {
        write_json_atomic(&self.path, stats).await?;
        tracing::info!(path = %self.path.display(), "saved stats");
        Ok(())
    }
}

async fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    remove_stale_temp_files(path).await;

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let data = serde_json::to_vec_pretty(value)?;
    if let Err(err) = fs::write(&tmp_path, &data).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(err.into());
    }
    if let Err(err) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(err.into());
    }
    Ok(())
}

/// Remove temp siblings left by writes that were interrupted before the rename.
async fn remove_stale_temp_files(path: &Path) {
    let Some(stem) = path.file_stem() else {
        return;
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = format!("{}.tmp.", stem.to_string_lossy());

    let Ok(mut entries) = fs::read_dir(dir).await else {
        return;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        if !entry.file_name().to_string_lossy().starts_with(&prefix) {
            continue;
        }
        let stale = entry.path();
        match fs::remove_file(&stale).await {
            Ok(()) => tracing::debug!(path = %stale.display(), "removed stale temp file"),
            Err(e) => tracing::warn!(path = %stale.display(), error = %e, "failed to remove stale temp file"),
        }
    }
}
