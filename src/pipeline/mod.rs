//! Fetch orchestration
//!
//! An [`Orchestrator`] reads its cache, then walks an ordered list of
//! [`ContributionSource`]s until one succeeds, writing live results back to
//! the cache. The backend and the widget fallback are two instances of it
//! with different sources, caches and TTLs.

pub mod backend;
pub mod service;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::CacheStore;
use crate::client::{ContributionSet, ContributionSource, Credential, SourceKind};
use crate::error::FetchError;

pub use backend::{Backend, LocalBackend};
pub use service::{ContributionService, FetchOutcome};

/// Result of one successful chain run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainOutcome {
    pub days: ContributionSet,

    /// Strategy that produced `days`
    pub source: SourceKind,

    /// `"<source>: <message>"` for every strategy that failed first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,

    /// Non-fatal problems, such as a rejected cache write
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Cache-first fallback chain over a list of sources.
pub struct Orchestrator {
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
    sources: Vec<Box<dyn ContributionSource>>,
    read_cache: bool,
}

impl Orchestrator {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        ttl: Duration,
        sources: Vec<Box<dyn ContributionSource>>,
    ) -> Self {
        Self {
            cache,
            ttl,
            sources,
            read_cache: true,
        }
    }

    /// Skip the cache read (for `--no-cache`); successful fetches are still written.
    pub fn skip_cache_read(mut self, skip: bool) -> Self {
        self.read_cache = !skip;
        self
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Run one cycle for `credential`.
    ///
    /// Returns `Exhausted` only when every source failed; a chain ending in
    /// the mock generator therefore always succeeds.
    pub async fn run(&self, credential: &Credential) -> Result<ChainOutcome, FetchError> {
        let username = credential.username.trim();

        if self.read_cache {
            match self.cache.read(username, self.ttl).await {
                Ok(days) => {
                    log::debug!("Cache hit for {} ({} days)", username, days.len());
                    return Ok(ChainOutcome {
                        days,
                        source: SourceKind::Cache,
                        failures: Vec::new(),
                        warnings: Vec::new(),
                    });
                }
                Err(e) => log::debug!("Cache lookup for {}: {}", username, e),
            }
        }

        let token = credential.usable_token();
        let mut failures = Vec::new();

        for source in &self.sources {
            let kind = source.kind();

            if source.requires_token() && token.is_none() {
                log::debug!("Skipping {}: no usable token", kind);
                failures.push(format!("{}: {}", kind, FetchError::MissingToken(kind.as_str())));
                continue;
            }

            if kind == SourceKind::Mock && !failures.is_empty() {
                log::warn!(
                    "All live sources failed for {}, using mock data: {}",
                    username,
                    failures.join("; ")
                );
            }

            log::debug!("Trying {} for {}", kind, username);
            match source.fetch(username, token).await {
                Ok(days) => {
                    let mut warnings = Vec::new();
                    if source.cacheable()
                        && let Err(e) = self.cache.write(username, &days).await
                    {
                        log::warn!("Not caching {} result for {}: {}", kind, username, e);
                        warnings.push(e.to_string());
                    }
                    return Ok(ChainOutcome {
                        days,
                        source: kind,
                        failures,
                        warnings,
                    });
                }
                Err(e) => {
                    log::warn!("{} fetch failed for {}: {}", kind, username, e);
                    failures.push(format!("{}: {}", kind, e));
                }
            }
        }

        Err(FetchError::Exhausted(failures))
    }
}
