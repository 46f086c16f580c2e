//! Error types for the GitPulse CLI

use thiserror::Error;

/// Result type alias for GitPulse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Failures of the contribution fetch pipeline.
///
/// Every strategy and cache operation reports its expected failures through
/// this type; the messages are what the widget and `--format json` show.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("cache miss")]
    CacheMiss,

    #[error("expired, age={age_minutes}m")]
    Expired { age_minutes: i64 },

    #[error("rate limited, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("api error: {status} {reason}")]
    Api { status: u16, reason: String },

    #[error("query errors: {0}")]
    Query(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to fetch profile: {status} {reason}")]
    Profile { status: u16, reason: String },

    #[error("no contribution data found, profile might be private")]
    PrivateProfile,

    #[error("scraping error: {0}")]
    Scrape(String),

    #[error("invalid cache write: {0}")]
    Validation(String),

    #[error("cache storage error: {0}")]
    Storage(String),

    #[error("no usable token for {0}")]
    MissingToken(&'static str),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("all sources failed: {}", .0.join("; "))]
    Exhausted(Vec<String>),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Network("request timed out".to_string())
        } else if err.is_connect() {
            FetchError::Network("failed to connect".to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `gitpulse login` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("GitHub username not configured. Run `gitpulse login` to set it.")]
    MissingUsername,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Secret store errors
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Keyring error: {0}")]
    Keyring(String),
}

impl From<keyring::Error> for CredentialError {
    fn from(err: keyring::Error) -> Self {
        CredentialError::Keyring(err.to_string())
    }
}
