//! Configuration management for GitPulse

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "GITPULSE_CONFIG";

/// Environment variable overriding the GraphQL API host
pub const API_HOST_ENV: &str = "GITPULSE_API_HOST";

/// Environment variable overriding the profile web host
pub const WEB_HOST_ENV: &str = "GITPULSE_WEB_HOST";

/// Environment variable supplying the token instead of the keyring
pub const TOKEN_ENV: &str = "GITPULSE_TOKEN";

/// Application configuration
///
/// Only the username lives here; the token is kept in the OS keyring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// GitHub login whose contributions are tracked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// Where the widget fallback chain keeps its cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackCache {
    #[default]
    Disk,
    Memory,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Seconds between cycles in `watch`
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Freshness window of the backend cache
    #[serde(default = "default_backend_ttl")]
    pub backend_ttl_secs: u64,

    /// Freshness window of the widget fallback cache
    #[serde(default = "default_fallback_ttl")]
    pub fallback_ttl_secs: u64,

    /// Try the backend pipeline before the fallback chain
    #[serde(default = "default_true")]
    pub use_backend: bool,

    #[serde(default)]
    pub fallback_cache: FallbackCache,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_host: Option<String>,
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_backend_ttl() -> u64 {
    5 * 60
}

fn default_fallback_ttl() -> u64 {
    60 * 60
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            format: None,
            refresh_interval_secs: default_refresh_interval(),
            backend_ttl_secs: default_backend_ttl(),
            fallback_ttl_secs: default_fallback_ttl(),
            use_backend: true,
            fallback_cache: FallbackCache::default(),
            api_host: None,
            web_host: None,
        }
    }
}

impl Preferences {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn backend_ttl(&self) -> Duration {
        Duration::from_secs(self.backend_ttl_secs)
    }

    pub fn fallback_ttl(&self) -> Duration {
        Duration::from_secs(self.fallback_ttl_secs)
    }

    /// GraphQL host, `GITPULSE_API_HOST` taking precedence over the file
    pub fn api_host(&self) -> Option<String> {
        env_or(API_HOST_ENV, self.api_host.as_deref())
    }

    /// Profile host, `GITPULSE_WEB_HOST` taking precedence over the file
    pub fn web_host(&self) -> Option<String> {
        env_or(WEB_HOST_ENV, self.web_host.as_deref())
    }
}

fn env_or(var: &str, configured: Option<&str>) -> Option<String> {
    pick_host(std::env::var(var).ok().as_deref(), configured)
}

fn pick_host(from_env: Option<&str>, configured: Option<&str>) -> Option<String> {
    from_env
        .or(configured)
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.trim().is_empty()
        {
            return Ok(PathBuf::from(path));
        }

        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".gitpulse").join("config.yaml"))
    }

    /// `--config` path if given, otherwise [`Config::default_path`]
    pub fn resolve_path(config_path: Option<&str>) -> Result<PathBuf> {
        match config_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Load configuration, treating a missing file as an empty config
    pub fn load_or_default(path: PathBuf) -> Result<Self> {
        match Self::load_from(path) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // Set file permissions to 600 on Unix systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// The configured username, if it is set and not blank
    pub fn username(&self) -> Option<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// Validate that a username is configured
    pub fn require_username(&self) -> Result<&str> {
        self.username()
            .ok_or_else(|| ConfigError::MissingUsername.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.username.is_none());
        assert_eq!(config.preferences.refresh_interval_secs, 60);
        assert_eq!(config.preferences.backend_ttl(), Duration::from_secs(300));
        assert_eq!(config.preferences.fallback_ttl(), Duration::from_secs(3600));
        assert!(config.preferences.use_backend);
        assert_eq!(config.preferences.fallback_cache, FallbackCache::Disk);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_yaml::from_str(
            "username: octocat\npreferences:\n  fallback_cache: memory\n  use_backend: false\n",
        )
        .unwrap();

        assert_eq!(config.username(), Some("octocat"));
        assert_eq!(config.preferences.fallback_cache, FallbackCache::Memory);
        assert!(!config.preferences.use_backend);
        assert_eq!(config.preferences.fallback_ttl_secs, 3600);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config {
            username: Some("octocat".to_string()),
            ..Default::default()
        };
        config.save_to(path.clone()).unwrap();

        let loaded = Config::load_from(path.clone()).unwrap();
        assert_eq!(loaded.username(), Some("octocat"));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("token"));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        Config::default().save_to(path.clone()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");

        assert!(matches!(
            Config::load_from(path.clone()),
            Err(crate::error::Error::Config(ConfigError::NotFound))
        ));
        assert!(Config::load_or_default(path).unwrap().username.is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "username: [unclosed").unwrap();

        assert!(matches!(
            Config::load_or_default(path),
            Err(crate::error::Error::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_blank_username_is_missing() {
        let config = Config {
            username: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(config.username().is_none());
        assert!(config.require_username().is_err());
    }

    #[test]
    fn test_host_precedence() {
        assert_eq!(
            pick_host(Some("http://env"), Some("http://file")),
            Some("http://env".to_string())
        );
        assert_eq!(
            pick_host(None, Some("http://file")),
            Some("http://file".to_string())
        );
        assert_eq!(pick_host(None, Some("  ")), None);
        assert_eq!(pick_host(None, None), None);
    }
}
