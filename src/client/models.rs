//! Contribution data model shared by every fetch strategy and cache store

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// One calendar day and its contribution count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionDay {
    /// Calendar date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,

    /// Number of contributions on that day
    pub contribution_count: u32,
}

impl ContributionDay {
    pub fn new(date: NaiveDate, contribution_count: u32) -> Self {
        Self {
            date,
            contribution_count,
        }
    }
}

/// Ordered sequence of days for a single user.
pub type ContributionSet = Vec<ContributionDay>;

/// Uniform result of every fetch strategy and cache read.
pub type FetchResult = std::result::Result<ContributionSet, FetchError>;

/// Check that dates are strictly ascending (which also rules out duplicates).
pub fn is_chronological(days: &[ContributionDay]) -> bool {
    days.windows(2).all(|pair| pair[0].date < pair[1].date)
}

/// Wire shape of the backend `fetch_contributions` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ContributionSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchResponse {
    pub fn success(data: ContributionSet) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl From<FetchResult> for FetchResponse {
    fn from(result: FetchResult) -> Self {
        match result {
            Ok(days) => FetchResponse::success(days),
            Err(e) => FetchResponse::failure(e.to_string()),
        }
    }
}

/// Tracked account: the username is ordinary config, the token is a secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub token: Option<String>,
}

/// Values that ship in sample configs and docs, never real tokens.
const PLACEHOLDER_TOKENS: &[&str] = &[
    "YOUR_GITHUB_TOKEN",
    "YOUR_TOKEN",
    "<token>",
    "changeme",
];

impl Credential {
    pub fn new(username: impl Into<String>, token: Option<String>) -> Self {
        Self {
            username: username.into(),
            token,
        }
    }

    /// The token, unless it is blank or an obvious placeholder.
    pub fn usable_token(&self) -> Option<&str> {
        let token = self.token.as_deref()?.trim();
        if token.is_empty() || is_placeholder(token) {
            return None;
        }
        Some(token)
    }
}

fn is_placeholder(token: &str) -> bool {
    if PLACEHOLDER_TOKENS
        .iter()
        .any(|p| p.eq_ignore_ascii_case(token))
    {
        return true;
    }
    // ghp_xxxx... style examples
    token
        .split_once('_')
        .is_some_and(|(_, rest)| !rest.is_empty() && rest.chars().all(|c| c == 'x' || c == 'X'))
}
