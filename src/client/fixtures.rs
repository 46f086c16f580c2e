//! Test fixtures: canned payloads and stub sources
//!
//! Import via `use crate::client::fixtures::*` in test modules.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::models::{ContributionDay, ContributionSet, FetchResponse};
use super::{ContributionSource, SourceKind};
use crate::error::FetchError;
use crate::pipeline::backend::Backend;

/// Shorthand for a single day.
pub fn day(date: &str, count: u32) -> ContributionDay {
    ContributionDay::new(date.parse().expect("valid test date"), count)
}

/// `n` contiguous days ending on `end`, each with count `i % 5`.
pub fn days_ending(end: &str, n: u32) -> ContributionSet {
    let end: NaiveDate = end.parse().expect("valid test date");
    (0..n)
        .rev()
        .map(|back| {
            let date = end - chrono::Duration::days(i64::from(back));
            ContributionDay::new(date, (n - 1 - back) % 5)
        })
        .collect()
}

// ============================================================================
// HTTP payloads
// ============================================================================

/// GraphQL success body with the given weeks of `(date, count)` pairs.
pub fn graphql_body(weeks: &[&[(&str, u32)]]) -> String {
    let weeks: Vec<serde_json::Value> = weeks
        .iter()
        .map(|days| {
            let days: Vec<serde_json::Value> = days
                .iter()
                .map(|(date, count)| {
                    serde_json::json!({ "date": date, "contributionCount": count })
                })
                .collect();
            serde_json::json!({ "contributionDays": days })
        })
        .collect();

    serde_json::json!({
        "data": {
            "user": {
                "contributionsCollection": {
                    "contributionCalendar": {
                        "totalContributions": 0,
                        "weeks": weeks
                    }
                }
            }
        }
    })
    .to_string()
}

/// GraphQL body carrying only an `errors` array.
pub fn graphql_errors(messages: &[&str]) -> String {
    let errors: Vec<serde_json::Value> = messages
        .iter()
        .map(|m| serde_json::json!({ "message": m }))
        .collect();
    serde_json::json!({ "data": null, "errors": errors }).to_string()
}

/// Contributions fragment markup with one `<td>` per `(date, count)` cell.
pub fn calendar_html(cells: &[(&str, u32)]) -> String {
    let mut html = String::from(
        "<div class=\"js-calendar-graph\"><table class=\"ContributionCalendar-grid\"><tbody>\n",
    );
    for (date, count) in cells {
        let level = match count {
            0 => 0,
            1..=2 => 1,
            3..=5 => 2,
            6..=9 => 3,
            _ => 4,
        };
        html.push_str(&format!(
            "<tr><td tabindex=\"0\" data-ix=\"0\" aria-selected=\"false\" \
             data-date=\"{date}\" data-count=\"{count}\" data-level=\"{level}\" \
             class=\"ContributionCalendar-day\"></td></tr>\n"
        ));
    }
    html.push_str("</tbody></table></div>");
    html
}

// ============================================================================
// StubSource
// ============================================================================

/// Scripted `ContributionSource` that records every call.
///
/// Clones share the call log, so a test can keep one handle and box another
/// into an orchestrator.
#[derive(Clone)]
pub struct StubSource {
    kind: SourceKind,
    requires_token: bool,
    cacheable: bool,
    result: Arc<Mutex<Result<ContributionSet, FetchError>>>,
    calls: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl StubSource {
    fn new(kind: SourceKind, result: Result<ContributionSet, FetchError>) -> Self {
        Self {
            kind,
            requires_token: kind == SourceKind::GraphQl,
            cacheable: kind != SourceKind::Mock,
            result: Arc::new(Mutex::new(result)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Source of `kind` that returns `days`.
    pub fn succeeding(kind: SourceKind, days: ContributionSet) -> Self {
        Self::new(kind, Ok(days))
    }

    /// Source of `kind` that returns `error`.
    pub fn failing(kind: SourceKind, error: FetchError) -> Self {
        Self::new(kind, Err(error))
    }

    pub fn requiring_token(mut self, requires: bool) -> Self {
        self.requires_token = requires;
        self
    }

    pub fn boxed(&self) -> Box<dyn ContributionSource> {
        Box::new(self.clone())
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Token passed on each call, in order.
    pub async fn tokens_seen(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|(_, token)| token.clone())
            .collect()
    }
}

#[async_trait]
impl ContributionSource for StubSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn requires_token(&self) -> bool {
        self.requires_token
    }

    fn cacheable(&self) -> bool {
        self.cacheable
    }

    async fn fetch(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<ContributionSet, FetchError> {
        self.calls
            .lock()
            .await
            .push((username.to_string(), token.map(str::to_string)));
        self.result.lock().await.clone()
    }
}

// ============================================================================
// StubBackend
// ============================================================================

/// Scripted backend command surface.
#[derive(Clone)]
pub struct StubBackend {
    response: Arc<Mutex<FetchResponse>>,
    fetch_calls: Arc<Mutex<usize>>,
    clear_calls: Arc<Mutex<usize>>,
}

impl StubBackend {
    pub fn responding(response: FetchResponse) -> Self {
        Self {
            response: Arc::new(Mutex::new(response)),
            fetch_calls: Arc::new(Mutex::new(0)),
            clear_calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Backend that reports `Unavailable` for every fetch.
    pub fn unavailable() -> Self {
        Self::responding(FetchResponse::failure(
            FetchError::Unavailable("connection refused".to_string()).to_string(),
        ))
    }

    pub async fn fetch_calls(&self) -> usize {
        *self.fetch_calls.lock().await
    }

    pub async fn clear_calls(&self) -> usize {
        *self.clear_calls.lock().await
    }
}

#[async_trait]
impl Backend for StubBackend {
    async fn fetch_contributions(&self, _username: &str, _token: Option<&str>) -> FetchResponse {
        *self.fetch_calls.lock().await += 1;
        self.response.lock().await.clone()
    }

    async fn clear_cache(&self) -> Result<String, FetchError> {
        *self.clear_calls.lock().await += 1;
        Ok("Cache cleared successfully".to_string())
    }
}
