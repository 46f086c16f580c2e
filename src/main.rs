//! GitPulse CLI - GitHub contribution heatmap that stays fresh in your terminal

use std::io;

use clap::{CommandFactory, Parser};

mod cache;
mod cli;
mod client;
mod config;
mod credentials;
mod error;
mod models;
mod output;
mod pipeline;
mod stats;

use cli::args::GlobalOptions;
use cli::{CacheCommands, Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let opts = GlobalOptions::from_cli(&cli);
    init_logging(opts.debug);

    match cli.command {
        Commands::Login { username, no_token } => cli::login::run(&opts, username, no_token).await,
        Commands::Logout => cli::logout::run(&opts),
        Commands::Status => cli::status::run(&opts).await,
        Commands::Fetch { days } => cli::fetch::run(&opts, days).await,
        Commands::Watch { interval } => cli::watch::run(&opts, interval).await,
        Commands::Cache(cache_cmd) => match cache_cmd {
            CacheCommands::Info => cli::cache::info(&opts).await,
            CacheCommands::Clear => cli::cache::clear(&opts).await,
            CacheCommands::Path => cli::cache::path(),
        },
        Commands::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "gitpulse", &mut io::stdout());
            Ok(())
        }
    }
}

/// `warn` by default, `debug` with `--debug`; `RUST_LOG` overrides both.
fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
    log::debug!("Debug logging enabled");
}
