//! Backend command surface
//!
//! The backend owns its own disk cache and only talks to the GraphQL API.
//! Callers see plain [`FetchResponse`] values, never errors.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::Orchestrator;
use crate::cache::{CacheStore, DiskCacheStore};
use crate::client::{ContributionSource, Credential, FetchResponse, GraphQlFetcher};
use crate::error::{FetchError, Result};

/// Namespace of the backend cache under the cache base directory
pub const BACKEND_CACHE: &str = "backend";

/// Commands the widget service invokes on the backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Cached-or-live GraphQL fetch for `username`
    async fn fetch_contributions(&self, username: &str, token: Option<&str>) -> FetchResponse;

    /// Drop every backend cache entry
    async fn clear_cache(&self) -> std::result::Result<String, FetchError>;
}

/// In-process backend built on an [`Orchestrator`].
pub struct LocalBackend {
    pipeline: Orchestrator,
}

impl LocalBackend {
    pub fn new(pipeline: Orchestrator) -> Self {
        Self { pipeline }
    }

    /// Disk-cached GraphQL pipeline under `<cache_dir>/gitpulse/backend`.
    pub fn open(api_host: Option<&str>, ttl: Duration, skip_cache_read: bool) -> Result<Self> {
        let cache: Arc<dyn CacheStore> = Arc::new(DiskCacheStore::open(BACKEND_CACHE)?);
        let sources: Vec<Box<dyn ContributionSource>> =
            vec![Box::new(GraphQlFetcher::with_host(api_host)?)];

        Ok(Self::new(
            Orchestrator::new(cache, ttl, sources).skip_cache_read(skip_cache_read),
        ))
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        self.pipeline.cache()
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn fetch_contributions(&self, username: &str, token: Option<&str>) -> FetchResponse {
        if username.trim().is_empty() {
            return FetchResponse::failure(
                FetchError::Validation("username must not be empty".to_string()).to_string(),
            );
        }

        let credential = Credential::new(username, token.map(str::to_string));
        self.pipeline
            .run(&credential)
            .await
            .map(|outcome| outcome.days)
            .into()
    }

    async fn clear_cache(&self) -> std::result::Result<String, FetchError> {
        let stats = self.pipeline.cache().clear_all().await?;
        log::debug!("Cleared {} backend cache entries", stats.entries_removed);
        Ok("Cache cleared successfully".to_string())
    }
}
