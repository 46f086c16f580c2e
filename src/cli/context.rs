//! Command execution context
//!
//! Loads the config once and wires the backend, the fallback chain and the
//! credential store into a [`ContributionService`].

use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;

use crate::cache::{CacheStore, DiskCacheStore, MemoryCacheStore};
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::config::{Config, FallbackCache, TOKEN_ENV};
use crate::credentials::{CredentialStore, KeyringStore, MemoryCredentialStore};
use crate::error::Result;
use crate::pipeline::service::{WIDGET_CACHE, fallback_sources};
use crate::pipeline::{ContributionService, LocalBackend, Orchestrator};

/// Context for command execution containing config and runtime options.
pub struct CommandContext {
    /// Loaded configuration (empty when the file does not exist yet)
    pub config: Config,

    /// Where `config` was loaded from and will be saved to
    pub config_path: PathBuf,

    /// Resolved output format
    pub format: OutputFormat,

    /// Skip cache reads
    pub no_cache: bool,

    credentials: Arc<dyn CredentialStore>,
}

impl CommandContext {
    /// Load config from `--config` or the default location.
    ///
    /// The token comes from `GITPULSE_TOKEN` when set, otherwise the OS keyring.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config_path = Config::resolve_path(opts.config_ref())?;
        let config = Config::load_or_default(config_path.clone())?;
        let credentials: Arc<dyn CredentialStore> = match std::env::var(TOKEN_ENV) {
            Ok(token) => {
                log::debug!("Using token from {}", TOKEN_ENV);
                Arc::new(MemoryCredentialStore::with_token(token))
            }
            Err(_) => Arc::new(KeyringStore::default()),
        };
        Ok(Self::with_credentials(config, config_path, opts, credentials))
    }

    pub fn with_credentials(
        config: Config,
        config_path: PathBuf,
        opts: &GlobalOptions,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let format = resolve_format(opts.format, config.preferences.format.as_deref());
        Self {
            config,
            config_path,
            format,
            no_cache: opts.no_cache,
            credentials,
        }
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Persist `config` to the path it was loaded from.
    pub fn save_config(&self) -> Result<()> {
        self.config.save_to(self.config_path.clone())
    }

    /// Widget fallback cache, on disk or in memory per preferences.
    pub fn widget_cache(&self) -> Result<Arc<dyn CacheStore>> {
        let cache: Arc<dyn CacheStore> = match self.config.preferences.fallback_cache {
            FallbackCache::Disk => Arc::new(DiskCacheStore::open(WIDGET_CACHE)?),
            FallbackCache::Memory => Arc::new(MemoryCacheStore::new()),
        };
        Ok(cache)
    }

    /// Backend pipeline with its own disk cache.
    pub fn backend(&self) -> Result<LocalBackend> {
        let prefs = &self.config.preferences;
        LocalBackend::open(
            prefs.api_host().as_deref(),
            prefs.backend_ttl(),
            self.no_cache,
        )
    }

    /// Full service: backend first (if enabled), then GraphQL, scrape, mock.
    pub fn service(&self) -> Result<ContributionService> {
        let prefs = &self.config.preferences;
        let api_host = prefs.api_host();
        let web_host = prefs.web_host();

        let fallback = Orchestrator::new(
            self.widget_cache()?,
            prefs.fallback_ttl(),
            fallback_sources(api_host.as_deref(), web_host.as_deref())?,
        )
        .skip_cache_read(self.no_cache);

        let service = ContributionService::new(
            self.config.username().map(str::to_string),
            self.credentials.clone(),
            fallback,
        );

        if prefs.use_backend {
            Ok(service.with_backend(Arc::new(self.backend()?)))
        } else {
            Ok(service)
        }
    }
}

/// Flag wins, then a valid config value, then pretty.
fn resolve_format(flag: Option<OutputFormat>, configured: Option<&str>) -> OutputFormat {
    if let Some(format) = flag {
        return format;
    }
    match configured.map(|f| OutputFormat::from_str(f.trim(), true)) {
        Some(Ok(format)) => format,
        Some(Err(_)) => {
            log::warn!("Ignoring unknown output format in config");
            OutputFormat::default()
        }
        None => OutputFormat::default(),
    }
}
