//! Global CLI options shared across all commands

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// Precedence is CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; config file values are merged in
/// `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format flag; `None` defers to the config file
    pub format: Option<OutputFormat>,

    /// Custom config file path (defaults to ~/.gitpulse/config.yaml)
    pub config: Option<String>,

    /// Verbose logging
    pub debug: bool,

    /// Skip cache reads; successful fetches are still cached
    pub no_cache: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            debug: cli.debug,
            no_cache: cli.no_cache,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_cli() {
        let cli = Cli::parse_from([
            "gitpulse",
            "--format",
            "json",
            "--config",
            "/custom/path",
            "--no-cache",
            "fetch",
        ]);
        let opts = GlobalOptions::from_cli(&cli);

        assert_eq!(opts.format, Some(OutputFormat::Json));
        assert_eq!(opts.config_ref(), Some("/custom/path"));
        assert!(opts.no_cache);
    }

    #[test]
    fn test_defaults() {
        let opts = GlobalOptions::default();
        assert_eq!(opts.format, None);
        assert_eq!(opts.config_ref(), None);
        assert!(!opts.no_cache);
        assert!(!opts.debug);
    }
}
