//! JSON file cache storage
//!
//! One file per username under a fixed directory. Writes go through a temp
//! file and a rename so readers never see a half-written entry.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::freshness::now_millis;
use super::key::cache_file_name;
use super::{CacheEntry, CacheInfo, CacheStore, ClearStats, Lookup, evaluate, validate_write};
use crate::client::models::{ContributionDay, FetchResult};
use crate::error::{ConfigError, FetchError};

/// Per-process sequence for temp file names
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Disk-backed cache store
#[derive(Debug, Clone)]
pub struct DiskCacheStore {
    dir: PathBuf,
}

impl DiskCacheStore {
    /// Get the cache base directory path (~/.cache/gitpulse on Linux)
    pub fn base_dir() -> Result<PathBuf, ConfigError> {
        let cache_base = dirs::cache_dir().ok_or(ConfigError::Invalid(
            "Could not determine cache directory".to_string(),
        ))?;
        Ok(cache_base.join("gitpulse"))
    }

    /// Open the store under `<base_dir>/<namespace>`
    pub fn open(namespace: &str) -> Result<Self, ConfigError> {
        Ok(Self::open_at(Self::base_dir()?.join(namespace)))
    }

    /// Open the store at a specific directory (for testing)
    ///
    /// The directory is created lazily on first write.
    pub fn open_at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cache file for `username`, always directly inside `dir`.
    pub fn path_for(&self, username: &str) -> Option<PathBuf> {
        cache_file_name(username).map(|name| self.dir.join(name))
    }

    /// Load an entry; missing or unreadable files are `None`.
    async fn load(path: &Path) -> Option<(CacheEntry, u64)> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Failed to read cache file {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) => Some((entry, bytes.len() as u64)),
            Err(e) => {
                log::warn!("Ignoring corrupt cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Sibling temp path unique to this write, so overlapping writers never share one.
    fn temp_path_for(path: &Path) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
    }

    /// Remove `path` only if it still holds the entry stamped `generated_at`.
    ///
    /// A concurrent writer may have replaced it since the stale read; that
    /// newer entry is kept. The check and the unlink are not atomic, so a write
    /// landing between them can still be lost (last write wins).
    async fn evict_if_unchanged(
        path: &Path,
        generated_at: Option<i64>,
    ) -> Result<(), FetchError> {
        match Self::load(path).await {
            Some((current, _)) if current.generated_at == generated_at => {
                Self::remove(path).await
            }
            Some(_) => {
                log::debug!("Keeping {}: rewritten since stale read", path.display());
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn remove(path: &Path) -> Result<(), FetchError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FetchError::Storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl CacheStore for DiskCacheStore {
    async fn read(&self, username: &str, ttl: Duration) -> FetchResult {
        let path = self.path_for(username).ok_or(FetchError::CacheMiss)?;
        let (entry, _) = Self::load(&path).await.ok_or(FetchError::CacheMiss)?;
        let generated_at = entry.generated_at;

        match evaluate(entry, ttl, now_millis()) {
            Lookup::Fresh(days) => {
                log::debug!("Cache hit: {}", path.display());
                Ok(days)
            }
            Lookup::Stale(err) => {
                log::debug!("Evicting {}: {}", path.display(), err);
                if let Err(e) = Self::evict_if_unchanged(&path, generated_at).await {
                    log::warn!("{}", e);
                }
                Err(err)
            }
        }
    }

    async fn write(&self, username: &str, days: &[ContributionDay]) -> Result<(), FetchError> {
        validate_write(username, days)?;
        let path = self
            .path_for(username)
            .ok_or_else(|| FetchError::Validation("unusable username".to_string()))?;

        fs::create_dir_all(&self.dir).await.map_err(|e| {
            FetchError::Storage(format!("Failed to create cache dir: {}", e))
        })?;

        let entry = CacheEntry {
            username: username.trim().to_string(),
            generated_at: Some(now_millis()),
            days: days.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&entry)
            .map_err(|e| FetchError::Storage(e.to_string()))?;

        let temp_path = Self::temp_path_for(&path);
        let storage_err = |e: std::io::Error| {
            FetchError::Storage(format!("Failed to write {}: {}", path.display(), e))
        };
        let mut file = fs::File::create(&temp_path).await.map_err(storage_err)?;
        file.write_all(&json).await.map_err(storage_err)?;
        file.sync_all().await.map_err(storage_err)?;
        drop(file);
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(storage_err(e));
        }

        Ok(())
    }

    async fn clear(&self, username: &str) -> Result<(), FetchError> {
        match self.path_for(username) {
            Some(path) => Self::remove(&path).await,
            None => Ok(()),
        }
    }

    async fn clear_all(&self) -> Result<ClearStats, FetchError> {
        let mut entries_removed = 0;
        match fs::read_dir(&self.dir).await {
            Ok(mut dir) => {
                while let Ok(Some(entry)) = dir.next_entry().await {
                    if entry.path().extension().is_some_and(|ext| ext == "json") {
                        entries_removed += 1;
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ClearStats::default());
            }
            Err(e) => return Err(FetchError::Storage(e.to_string())),
        }

        fs::remove_dir_all(&self.dir)
            .await
            .map_err(|e| FetchError::Storage(format!("Failed to clear cache dir: {}", e)))?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| FetchError::Storage(format!("Failed to recreate cache dir: {}", e)))?;

        log::debug!(
            "Cleared {} entries from {}",
            entries_removed,
            self.dir().display()
        );
        Ok(ClearStats { entries_removed })
    }

    async fn info(&self, username: &str, ttl: Duration) -> CacheInfo {
        let Some(path) = self.path_for(username) else {
            return CacheInfo::default();
        };
        match Self::load(&path).await {
            Some((entry, size)) => CacheInfo::describe(&entry, size, ttl, now_millis()),
            None => CacheInfo::default(),
        }
    }
}
