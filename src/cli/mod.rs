//! CLI command definitions and handlers

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod cache;
pub mod context;
pub mod fetch;
pub mod login;
pub mod logout;
pub mod status;
pub mod watch;

pub use args::OutputFormat;
pub use context::CommandContext;

/// GitPulse - GitHub contribution heatmap in your terminal
#[derive(Parser, Debug)]
#[command(name = "gitpulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json) [default: pretty]
    #[arg(
        long,
        global = true,
        env = "GITPULSE_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "GITPULSE_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "GITPULSE_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Skip cache reads and fetch fresh data
    #[arg(long, global = true, env = "GITPULSE_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set the tracked GitHub account and store a token
    Login {
        /// GitHub username (prompted if omitted)
        #[arg(long, short)]
        username: Option<String>,

        /// Do not prompt for a token; public data only
        #[arg(long)]
        no_token: bool,
    },

    /// Forget the tracked account and delete the stored token
    Logout,

    /// Show account, token and cache status
    Status,

    /// Fetch contributions once and display them
    Fetch {
        /// Print every day instead of the summary (table format)
        #[arg(long)]
        days: bool,
    },

    /// Refresh periodically until interrupted
    Watch {
        /// Seconds between refreshes (defaults to the configured interval)
        #[arg(long, short)]
        interval: Option<u64>,
    },

    /// Manage local contribution caches
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   gitpulse completion bash > /etc/bash_completion.d/gitpulse
  zsh:    gitpulse completion zsh > \"${fpath[1]}/_gitpulse\"
  fish:   gitpulse completion fish > ~/.config/fish/completions/gitpulse.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Cache management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache entries for the tracked account
    Info,
    /// Clear backend and widget caches
    Clear,
    /// Print cache directory path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_login_flags() {
        let cli = Cli::parse_from(["gitpulse", "login", "--username", "octocat", "--no-token"]);
        match cli.command {
            Commands::Login { username, no_token } => {
                assert_eq!(username.as_deref(), Some("octocat"));
                assert!(no_token);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_watch_interval() {
        let cli = Cli::parse_from(["gitpulse", "watch", "--interval", "30"]);
        assert!(matches!(cli.command, Commands::Watch { interval: Some(30) }));
    }

    #[test]
    fn test_parse_cache_subcommand() {
        let cli = Cli::parse_from(["gitpulse", "cache", "clear"]);
        assert!(matches!(cli.command, Commands::Cache(CacheCommands::Clear)));
    }
}
