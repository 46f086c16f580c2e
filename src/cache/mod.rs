//! Local cache for contribution data
//!
//! Two interchangeable stores sit behind [`CacheStore`]: a JSON file per user
//! on disk and a process-local map. Entries are replaced wholesale on every
//! write and evicted lazily when a read finds them stale.

pub mod freshness;
pub mod key;
pub mod memory;
pub mod storage;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::models::{ContributionDay, ContributionSet, FetchResult, is_chronological};
use crate::error::FetchError;

/// Cache TTL configuration per pipeline
pub struct CacheTtl;

impl CacheTtl {
    // Backend pipeline polls the authenticated API, so it can refresh often
    pub const BACKEND: Duration = Duration::from_secs(5 * 60); // 5 min

    // Widget fallback may be scraping, keep it around longer
    pub const FALLBACK: Duration = Duration::from_secs(60 * 60); // 1 hr
}

/// Stored payload for one username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub username: String,

    /// Epoch milliseconds when the entry was written
    #[serde(default)]
    pub generated_at: Option<i64>,

    pub days: ContributionSet,
}

/// Diagnostic view of an entry, produced without touching it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub exists: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_ms: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fresh: Option<bool>,
}

impl CacheInfo {
    fn describe(entry: &CacheEntry, size_bytes: u64, ttl: Duration, now: i64) -> Self {
        Self {
            exists: true,
            age_ms: entry.generated_at.map(|g| now.saturating_sub(g)),
            size_bytes: Some(size_bytes),
            days_count: Some(entry.days.len()),
            is_fresh: Some(freshness::is_fresh_at(entry.generated_at, ttl, now)),
        }
    }
}

/// Statistics about cache clear operation
#[derive(Debug, Default)]
pub struct ClearStats {
    pub entries_removed: usize,
}

/// Key-value persistence of `username -> CacheEntry`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Return the cached days if present and fresh; stale entries are evicted.
    async fn read(&self, username: &str, ttl: Duration) -> FetchResult;

    /// Replace the entry for `username` with `days` stamped now.
    async fn write(&self, username: &str, days: &[ContributionDay]) -> Result<(), FetchError>;

    /// Remove the entry for `username`. Absent entries are fine.
    async fn clear(&self, username: &str) -> Result<(), FetchError>;

    /// Remove every entry.
    async fn clear_all(&self) -> Result<ClearStats, FetchError>;

    /// Describe the entry for `username` without mutating anything.
    async fn info(&self, username: &str, ttl: Duration) -> CacheInfo;
}

/// Reject writes that would corrupt the store's invariants.
pub(crate) fn validate_write(username: &str, days: &[ContributionDay]) -> Result<(), FetchError> {
    if username.trim().is_empty() {
        return Err(FetchError::Validation("username must not be empty".to_string()));
    }
    if key::cache_file_name(username).is_none() {
        return Err(FetchError::Validation(format!(
            "username {:?} has no usable characters",
            username
        )));
    }
    if !is_chronological(days) {
        return Err(FetchError::Validation(
            "days must be in ascending date order without duplicates".to_string(),
        ));
    }
    Ok(())
}

/// Outcome of checking a stored entry against a TTL.
pub(crate) enum Lookup {
    Fresh(ContributionSet),
    Stale(FetchError),
}

pub(crate) fn evaluate(entry: CacheEntry, ttl: Duration, now: i64) -> Lookup {
    match entry.generated_at {
        Some(generated_at) if freshness::is_fresh_at(Some(generated_at), ttl, now) => {
            Lookup::Fresh(entry.days)
        }
        Some(generated_at) => Lookup::Stale(FetchError::Expired {
            age_minutes: freshness::age_minutes(generated_at, now),
        }),
        // No usable timestamp: same as never having cached it
        None => Lookup::Stale(FetchError::CacheMiss),
    }
}

pub use memory::MemoryCacheStore;
pub use storage::DiskCacheStore;
