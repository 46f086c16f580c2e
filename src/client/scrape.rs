//! Public profile scraping fallback
//!
//! Reads the contributions fragment GitHub serves for profile pages. No token
//! is sent; private profiles simply render no day cells.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use reqwest::{Client as HttpClient, Url};

use super::models::{ContributionDay, ContributionSet};
use super::{ContributionSource, DEFAULT_WEB_HOST, SourceKind, http_client, status_parts};
use crate::error::FetchError;

/// Opening tags that carry a `data-date` attribute
static DAY_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[A-Za-z][\w-]*\b[^>]*\bdata-date\s*=\s*["']([^"']*)["'][^>]*>"#)
        .expect("day cell pattern is valid")
});

static COUNT_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bdata-count\s*=\s*["'](\d+)["']"#).expect("count pattern is valid")
});

static LEVEL_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bdata-level\s*=\s*["'](\d+)["']"#).expect("level pattern is valid")
});

/// Scraping source backed by `GET /users/<login>/contributions`.
pub struct ScrapeFetcher {
    http: HttpClient,
    base_url: Url,
}

impl ScrapeFetcher {
    /// Create a scraper against a custom web host
    pub fn with_host(web_host: Option<&str>) -> Result<Self, FetchError> {
        let host = web_host.unwrap_or(DEFAULT_WEB_HOST);
        let base_url = Url::parse(host)
            .map_err(|e| FetchError::Scrape(format!("invalid web host {:?}: {}", host, e)))?;
        Ok(Self {
            http: http_client()?,
            base_url,
        })
    }

    /// `<base>/users/<username>/contributions` with the username as one encoded segment.
    fn profile_url(&self, username: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Scrape(format!("invalid web host {}", self.base_url)))?
            .pop_if_empty()
            .extend(["users", username, "contributions"]);
        Ok(url)
    }

    async fn scrape(&self, username: &str) -> Result<ContributionSet, FetchError> {
        let url = self.profile_url(username)?;
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html")
            .send()
            .await
            .map_err(|e| FetchError::Scrape(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let (status, reason) = status_parts(status);
            return Err(FetchError::Profile { status, reason });
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::Scrape(e.to_string()))?;

        let days = parse_contributions(&html);
        if days.is_empty() {
            return Err(FetchError::PrivateProfile);
        }
        Ok(days)
    }
}

#[async_trait]
impl ContributionSource for ScrapeFetcher {
    fn kind(&self) -> SourceKind {
        SourceKind::Scrape
    }

    async fn fetch(
        &self,
        username: &str,
        _token: Option<&str>,
    ) -> Result<ContributionSet, FetchError> {
        self.scrape(username).await
    }
}

/// Extract day cells from contribution calendar markup.
///
/// The count comes from `data-count`; when only `data-level` is present the
/// 0-4 intensity bucket stands in for the count. Cells whose date is missing
/// or malformed are dropped. The calendar lays cells out weekday-major, so the
/// result is re-sorted by date, keeping the first cell seen for each date.
pub fn parse_contributions(html: &str) -> ContributionSet {
    let mut by_date: BTreeMap<NaiveDate, u32> = BTreeMap::new();

    for cell in DAY_CELL.captures_iter(html) {
        let Ok(date) = NaiveDate::parse_from_str(cell[1].trim(), "%Y-%m-%d") else {
            continue;
        };
        let tag = &cell[0];
        let count = attr_number(&COUNT_ATTR, tag)
            .or_else(|| attr_number(&LEVEL_ATTR, tag))
            .unwrap_or(0);

        by_date.entry(date).or_insert(count);
    }

    by_date
        .into_iter()
        .map(|(date, count)| ContributionDay::new(date, count))
        .collect()
}

fn attr_number(pattern: &Regex, tag: &str) -> Option<u32> {
    pattern
        .captures(tag)
        .and_then(|c| c[1].parse::<u32>().ok())
}
