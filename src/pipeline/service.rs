//! Widget-side contribution service
//!
//! Resolves the tracked account, asks the backend first and falls back to
//! its own chain (GraphQL, scrape, mock) on any backend failure.

use std::sync::Arc;

use serde::Serialize;

use super::{Backend, ChainOutcome, Orchestrator};
use crate::client::{
    ContributionSet, ContributionSource, Credential, GraphQlFetcher, MockGenerator,
    ScrapeFetcher, SourceKind,
};
use crate::credentials::CredentialStore;
use crate::error::{FetchError, Result};

/// Namespace of the widget fallback cache under the cache base directory
pub const WIDGET_CACHE: &str = "widget";

/// Result of one service cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// No username configured; nothing was fetched
    NotAuthenticated,

    Ready(Contributions),
}

/// Contribution data for the tracked account plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributions {
    pub username: String,
    pub source: SourceKind,
    pub days: ContributionSet,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Contributions {
    fn from_chain(username: &str, mut outcome: ChainOutcome, earlier: Vec<String>) -> Self {
        let mut failures = earlier;
        failures.append(&mut outcome.failures);
        Self {
            username: username.to_string(),
            source: outcome.source,
            days: outcome.days,
            failures,
            warnings: outcome.warnings,
        }
    }

    /// True when the data is synthetic rather than fetched
    pub fn is_mock(&self) -> bool {
        self.source == SourceKind::Mock
    }
}

/// GraphQL, then scrape, then mock.
pub fn fallback_sources(
    api_host: Option<&str>,
    web_host: Option<&str>,
) -> Result<Vec<Box<dyn ContributionSource>>> {
    let sources: Vec<Box<dyn ContributionSource>> = vec![
        Box::new(GraphQlFetcher::with_host(api_host)?),
        Box::new(ScrapeFetcher::with_host(web_host)?),
        Box::new(MockGenerator::new()),
    ];
    Ok(sources)
}

/// Entry point for every fetch cycle.
pub struct ContributionService {
    username: Option<String>,
    credentials: Arc<dyn CredentialStore>,
    backend: Option<Arc<dyn Backend>>,
    fallback: Orchestrator,
}

impl ContributionService {
    pub fn new(
        username: Option<String>,
        credentials: Arc<dyn CredentialStore>,
        fallback: Orchestrator,
    ) -> Self {
        Self {
            username: username
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
            credentials,
            backend: None,
            fallback,
        }
    }

    /// Try `backend` before the fallback chain.
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn backend(&self) -> Option<&Arc<dyn Backend>> {
        self.backend.as_ref()
    }

    /// Username plus keyring token, or `None` when no username is configured.
    ///
    /// A keyring failure is logged and treated as "no token".
    pub fn resolve_credential(&self) -> Option<Credential> {
        let username = self.username.as_deref()?;
        let token = match self.credentials.get_token() {
            Ok(token) => token,
            Err(e) => {
                log::warn!("Could not read token, continuing without it: {}", e);
                None
            }
        };
        Some(Credential::new(username, token))
    }

    /// Run one cycle.
    pub async fn fetch(&self) -> std::result::Result<FetchOutcome, FetchError> {
        let Some(credential) = self.resolve_credential() else {
            log::debug!("No username configured, skipping fetch");
            return Ok(FetchOutcome::NotAuthenticated);
        };
        let username = credential.username.as_str();

        let mut failures = Vec::new();
        if let Some(backend) = &self.backend {
            let response = backend
                .fetch_contributions(username, credential.usable_token())
                .await;
            match (response.ok, response.data) {
                (true, Some(days)) => {
                    log::debug!("Backend returned {} days for {}", days.len(), username);
                    return Ok(FetchOutcome::Ready(Contributions {
                        username: username.to_string(),
                        source: SourceKind::Backend,
                        days,
                        failures,
                        warnings: Vec::new(),
                    }));
                }
                _ => {
                    let message = response
                        .error
                        .unwrap_or_else(|| FetchError::Unavailable("empty response".to_string()).to_string());
                    log::warn!("Backend fetch failed, using fallback chain: {}", message);
                    failures.push(format!("{}: {}", SourceKind::Backend, message));
                }
            }
        }

        let outcome = self.fallback.run(&credential).await?;
        Ok(FetchOutcome::Ready(Contributions::from_chain(
            username, outcome, failures,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, CacheTtl, MemoryCacheStore};
    use crate::client::FetchResponse;
    use crate::client::fixtures::{StubBackend, StubSource, days_ending};
    use crate::client::models::is_chronological;
    use crate::credentials::MemoryCredentialStore;
    use crate::error::CredentialError;

    struct BrokenKeyring;

    impl CredentialStore for BrokenKeyring {
        fn save_token(&self, _token: &str) -> std::result::Result<(), CredentialError> {
            Err(CredentialError::Keyring("locked".to_string()))
        }
        fn get_token(&self) -> std::result::Result<Option<String>, CredentialError> {
            Err(CredentialError::Keyring("locked".to_string()))
        }
        fn delete_token(&self) -> std::result::Result<(), CredentialError> {
            Err(CredentialError::Keyring("locked".to_string()))
        }
    }

    struct Harness {
        cache: Arc<MemoryCacheStore>,
        backend: StubBackend,
        graphql: StubSource,
        scrape: StubSource,
    }

    impl Harness {
        fn new(graphql: StubSource, scrape: StubSource) -> Self {
            Self {
                cache: Arc::new(MemoryCacheStore::new()),
                backend: StubBackend::unavailable(),
                graphql,
                scrape,
            }
        }

        fn service(
            &self,
            username: Option<&str>,
            credentials: Arc<dyn CredentialStore>,
        ) -> ContributionService {
            let fallback = Orchestrator::new(
                self.cache.clone(),
                CacheTtl::FALLBACK,
                vec![
                    self.graphql.boxed(),
                    self.scrape.boxed(),
                    Box::new(MockGenerator::new()),
                ],
            );
            ContributionService::new(username.map(str::to_string), credentials, fallback)
                .with_backend(Arc::new(self.backend.clone()))
        }
    }

    fn ready(outcome: FetchOutcome) -> Contributions {
        match outcome {
            FetchOutcome::Ready(c) => c,
            FetchOutcome::NotAuthenticated => panic!("expected data"),
        }
    }

    #[tokio::test]
    async fn test_no_username_makes_no_calls() {
        let h = Harness::new(
            StubSource::succeeding(SourceKind::GraphQl, days_ending("2025-01-15", 3)),
            StubSource::succeeding(SourceKind::Scrape, days_ending("2025-01-15", 3)),
        );
        let service = h.service(None, Arc::new(MemoryCredentialStore::with_token("ghp_real")));

        assert_eq!(service.fetch().await, Ok(FetchOutcome::NotAuthenticated));
        assert_eq!(h.backend.fetch_calls().await, 0);
        assert_eq!(h.graphql.call_count().await, 0);
        assert_eq!(h.scrape.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_blank_username_is_not_authenticated() {
        let h = Harness::new(
            StubSource::succeeding(SourceKind::GraphQl, vec![]),
            StubSource::succeeding(SourceKind::Scrape, vec![]),
        );
        let service = h.service(Some("   "), Arc::new(MemoryCredentialStore::default()));
        assert_eq!(service.fetch().await, Ok(FetchOutcome::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_backend_success_adopted() {
        let days = days_ending("2025-01-15", 4);
        let mut h = Harness::new(
            StubSource::succeeding(SourceKind::GraphQl, vec![]),
            StubSource::succeeding(SourceKind::Scrape, vec![]),
        );
        h.backend = StubBackend::responding(FetchResponse::success(days.clone()));
        let service = h.service(Some("octocat"), Arc::new(MemoryCredentialStore::default()));

        let data = ready(service.fetch().await.unwrap());
        assert_eq!(data.source, SourceKind::Backend);
        assert_eq!(data.days, days);
        assert_eq!(h.graphql.call_count().await, 0);
        assert!(!h.cache.info("octocat", CacheTtl::FALLBACK).await.exists);
    }

    #[tokio::test]
    async fn test_backend_down_graphql_succeeds_and_caches() {
        let days = days_ending("2025-01-15", 30);
        let h = Harness::new(
            StubSource::succeeding(SourceKind::GraphQl, days.clone()),
            StubSource::failing(SourceKind::Scrape, FetchError::PrivateProfile),
        );
        let service = h.service(
            Some("octocat"),
            Arc::new(MemoryCredentialStore::with_token("ghp_real")),
        );

        let data = ready(service.fetch().await.unwrap());
        assert_eq!(data.source, SourceKind::GraphQl);
        assert_eq!(data.days, days);
        assert_eq!(h.backend.fetch_calls().await, 1);
        assert_eq!(h.scrape.call_count().await, 0);
        assert!(data.failures[0].starts_with("backend: "));
        assert_eq!(
            h.cache.read("octocat", CacheTtl::FALLBACK).await,
            Ok(days)
        );
    }

    #[tokio::test]
    async fn test_no_token_private_profile_falls_back_to_mock() {
        let h = Harness::new(
            StubSource::succeeding(SourceKind::GraphQl, days_ending("2025-01-15", 3)),
            StubSource::failing(SourceKind::Scrape, FetchError::PrivateProfile),
        );
        let service = h.service(Some("octocat"), Arc::new(MemoryCredentialStore::default()));

        let data = ready(service.fetch().await.unwrap());
        assert!(data.is_mock());
        assert_eq!(data.days.len(), 365);
        assert!(is_chronological(&data.days));
        assert_eq!(h.graphql.call_count().await, 0);
        assert_eq!(h.scrape.call_count().await, 1);
        assert!(!h.cache.info("octocat", CacheTtl::FALLBACK).await.exists);
        assert_eq!(data.failures.len(), 3);
    }

    #[tokio::test]
    async fn test_fallback_cache_hit_skips_sources() {
        let h = Harness::new(
            StubSource::succeeding(SourceKind::GraphQl, vec![]),
            StubSource::succeeding(SourceKind::Scrape, vec![]),
        );
        let cached = days_ending("2025-01-15", 2);
        h.cache.write("octocat", &cached).await.unwrap();
        let service = h.service(Some("octocat"), Arc::new(MemoryCredentialStore::default()));

        let data = ready(service.fetch().await.unwrap());
        assert_eq!(data.source, SourceKind::Cache);
        assert_eq!(data.days, cached);
        assert_eq!(h.scrape.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_keyring_failure_treated_as_no_token() {
        let h = Harness::new(
            StubSource::succeeding(SourceKind::GraphQl, days_ending("2025-01-15", 3)),
            StubSource::succeeding(SourceKind::Scrape, days_ending("2025-01-15", 2)),
        );
        let service = h.service(Some("octocat"), Arc::new(BrokenKeyring));

        let data = ready(service.fetch().await.unwrap());
        assert_eq!(data.source, SourceKind::Scrape);
        assert_eq!(h.graphql.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_without_backend_goes_straight_to_fallback() {
        let cache = Arc::new(MemoryCacheStore::new());
        let scrape = StubSource::succeeding(SourceKind::Scrape, days_ending("2025-01-15", 2));
        let service = ContributionService::new(
            Some("octocat".to_string()),
            Arc::new(MemoryCredentialStore::default()),
            Orchestrator::new(cache, CacheTtl::FALLBACK, vec![scrape.boxed()]),
        );

        let data = ready(service.fetch().await.unwrap());
        assert_eq!(data.source, SourceKind::Scrape);
        assert!(data.failures.is_empty());
    }
}
