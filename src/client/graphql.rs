//! GitHub GraphQL contribution calendar fetcher

use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::header::HeaderMap;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;

use super::models::{ContributionDay, ContributionSet};
use super::{ContributionSource, DEFAULT_API_HOST, SourceKind, http_client, status_parts};
use crate::error::FetchError;

const CONTRIBUTIONS_QUERY: &str = r#"
query($login: String!) {
  user(login: $login) {
    contributionsCollection {
      contributionCalendar {
        weeks {
          contributionDays {
            date
            contributionCount
          }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize)]
struct ContributionCalendar {
    weeks: Vec<Week>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Week {
    contribution_days: Vec<ContributionDay>,
}

/// Structured-query source backed by `POST /graphql`.
pub struct GraphQlFetcher {
    http: HttpClient,
    endpoint: String,
}

impl GraphQlFetcher {
    /// Create a fetcher against a custom API host (GitHub Enterprise, tests)
    pub fn with_host(api_host: Option<&str>) -> Result<Self, FetchError> {
        let host = api_host.unwrap_or(DEFAULT_API_HOST).trim_end_matches('/');
        Ok(Self {
            http: http_client()?,
            endpoint: format!("{}/graphql", host),
        })
    }

    async fn query(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<ContributionSet, FetchError> {
        let body = serde_json::json!({
            "query": CONTRIBUTIONS_QUERY,
            "variables": { "login": username },
        });

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(FetchError::from)?;
        let status = response.status();

        if !status.is_success() {
            if let Some(reset_at) = rate_limit_reset(status, response.headers()) {
                return Err(FetchError::RateLimited { reset_at });
            }
            let (status, reason) = status_parts(status);
            return Err(FetchError::Api { status, reason });
        }

        let parsed: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Network(format!("failed to parse response: {}", e)))?;

        flatten(parsed)
    }
}

#[async_trait]
impl ContributionSource for GraphQlFetcher {
    fn kind(&self) -> SourceKind {
        SourceKind::GraphQl
    }

    fn requires_token(&self) -> bool {
        true
    }

    async fn fetch(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<ContributionSet, FetchError> {
        self.query(username, token).await
    }
}

/// Turn the nested week/day calendar into one chronological sequence.
fn flatten(response: GraphQlResponse) -> Result<ContributionSet, FetchError> {
    if !response.errors.is_empty() {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(FetchError::Query(messages.join("; ")));
    }

    let user = response
        .data
        .and_then(|data| data.user)
        .ok_or_else(|| FetchError::Query("user not found".to_string()))?;

    Ok(user
        .contributions_collection
        .contribution_calendar
        .weeks
        .into_iter()
        .flat_map(|week| week.contribution_days)
        .collect())
}

/// Wall-clock reset time when the response is a rate-limit rejection.
fn rate_limit_reset(status: StatusCode, headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    let exhausted = header("x-ratelimit-remaining") == Some(0);
    let retry_after = header("retry-after");
    let limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && (exhausted || retry_after.is_some()));
    if !limited {
        return None;
    }

    let reset = header("x-ratelimit-reset")
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .or_else(|| {
            retry_after.and_then(|secs| {
                chrono::Utc::now().checked_add_signed(chrono::Duration::seconds(secs))
            })
        });

    Some(
        reset
            .map(|dt| format_reset(&dt.with_timezone(&Local)))
            .unwrap_or_else(|| "unknown".to_string()),
    )
}

fn format_reset(at: &DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}
