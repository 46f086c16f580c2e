//! Process-local cache store

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::freshness::now_millis;
use super::{CacheEntry, CacheInfo, CacheStore, ClearStats, Lookup, evaluate, validate_write};
use crate::client::models::{ContributionDay, FetchResult};
use crate::error::FetchError;

/// In-memory cache keyed by lowercased username.
///
/// Constructed explicitly and handed to whoever needs it; each test gets its
/// own instance.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(username: &str) -> String {
        username.trim().to_lowercase()
    }

    /// Drop `key` unless a write replaced the entry after it was judged stale.
    async fn evict_if_unchanged(&self, key: &str, generated_at: Option<i64>) {
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|current| current.generated_at == generated_at)
        {
            entries.remove(key);
        }
    }

    /// Insert a raw entry, bypassing validation and timestamping.
    #[cfg(test)]
    pub async fn insert_entry(&self, entry: CacheEntry) {
        self.entries
            .write()
            .await
            .insert(Self::key(&entry.username), entry);
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn read(&self, username: &str, ttl: Duration) -> FetchResult {
        let key = Self::key(username);
        let entry = {
            let entries = self.entries.read().await;
            entries.get(&key).cloned()
        };
        let Some(entry) = entry else {
            return Err(FetchError::CacheMiss);
        };
        let generated_at = entry.generated_at;

        match evaluate(entry, ttl, now_millis()) {
            Lookup::Fresh(days) => Ok(days),
            Lookup::Stale(err) => {
                log::debug!("Evicting stale cache entry for {}: {}", key, err);
                self.evict_if_unchanged(&key, generated_at).await;
                Err(err)
            }
        }
    }

    async fn write(&self, username: &str, days: &[ContributionDay]) -> Result<(), FetchError> {
        validate_write(username, days)?;

        let entry = CacheEntry {
            username: username.trim().to_string(),
            generated_at: Some(now_millis()),
            days: days.to_vec(),
        };
        self.entries.write().await.insert(Self::key(username), entry);
        Ok(())
    }

    async fn clear(&self, username: &str) -> Result<(), FetchError> {
        self.entries.write().await.remove(&Self::key(username));
        Ok(())
    }

    async fn clear_all(&self) -> Result<ClearStats, FetchError> {
        let mut entries = self.entries.write().await;
        let entries_removed = entries.len();
        entries.clear();
        Ok(ClearStats { entries_removed })
    }

    async fn info(&self, username: &str, ttl: Duration) -> CacheInfo {
        let entries = self.entries.read().await;
        match entries.get(&Self::key(username)) {
            Some(entry) => {
                let size = serde_json::to_vec(entry)
                    .map(|bytes| bytes.len() as u64)
                    .unwrap_or(0);
                CacheInfo::describe(entry, size, ttl, now_millis())
            }
            None => CacheInfo::default(),
        }
    }
}
