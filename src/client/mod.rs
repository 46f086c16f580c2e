//! Contribution sources: GitHub GraphQL, profile scraping, synthetic data

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::FetchError;

#[cfg(test)]
pub mod fixtures;
pub mod graphql;
pub mod mock;
pub mod models;
pub mod scrape;

pub use graphql::GraphQlFetcher;
pub use mock::MockGenerator;
pub use models::{ContributionDay, ContributionSet, Credential, FetchResponse, FetchResult};
pub use scrape::ScrapeFetcher;

/// GitHub API base URL
pub const DEFAULT_API_HOST: &str = "https://api.github.com";

/// GitHub web base URL
pub const DEFAULT_WEB_HOST: &str = "https://github.com";

/// Per-request timeout for remote sources
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("gitpulse/", env!("CARGO_PKG_VERSION"));

/// Where a contribution set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Backend,
    Cache,
    #[serde(rename = "graphql")]
    GraphQl,
    Scrape,
    Mock,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Backend => "backend",
            SourceKind::Cache => "cache",
            SourceKind::GraphQl => "graphql",
            SourceKind::Scrape => "scrape",
            SourceKind::Mock => "mock",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of the fallback chain.
#[async_trait]
pub trait ContributionSource: Send + Sync {
    /// Identifies the strategy in logs and outcomes
    fn kind(&self) -> SourceKind;

    /// Sources that need a token are skipped when none is usable
    fn requires_token(&self) -> bool {
        false
    }

    /// Whether successful output may be written to the cache
    fn cacheable(&self) -> bool {
        true
    }

    /// Fetch contributions for `username`. Never retries internally.
    async fn fetch(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<ContributionSet, FetchError>;
}

/// Shared HTTP client settings for the remote sources.
pub(crate) fn http_client() -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| FetchError::Network(e.to_string()))
}

/// `"<code> <reason>"` pieces for status-line errors.
pub(crate) fn status_parts(status: reqwest::StatusCode) -> (u16, String) {
    (
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown").to_string(),
    )
}
