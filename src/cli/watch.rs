//! Watch command implementation
//!
//! Each tick spawns a fresh cycle even if the previous one is still running.
//! Overlapping cycles replace whole cache entries, so the last write wins.

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::{ConfigError, Result};
use crate::output::Formattable;
use crate::output::formatters::format_timestamp_millis;
use crate::pipeline::{ContributionService, FetchOutcome};

use super::fetch::ContributionReport;

/// Run cycles every `interval` seconds (or the configured interval) until Ctrl-C.
pub async fn run(opts: &GlobalOptions, interval: Option<u64>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    ctx.config.require_username()?;

    let period = interval
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| ctx.config.preferences.refresh_interval());
    let format = ctx.format;
    let service = Arc::new(ctx.service()?);

    if format != OutputFormat::Json {
        println!(
            "{} every {}s, press Ctrl-C to stop",
            "Watching".bold().cyan(),
            period.as_secs()
        );
    }

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let service = Arc::clone(&service);
                tokio::spawn(async move { run_cycle(&service, format).await });
            }
            _ = &mut shutdown => {
                log::debug!("Interrupted, stopping refresh timer");
                break;
            }
        }
    }

    Ok(())
}

/// One background cycle; errors are printed, never propagated.
async fn run_cycle(service: &ContributionService, format: OutputFormat) {
    let rendered = match service.fetch().await {
        Ok(FetchOutcome::Ready(data)) => ContributionReport::new(data, false).format(format),
        Ok(FetchOutcome::NotAuthenticated) => Err(ConfigError::MissingUsername.into()),
        Err(e) => Err(e.into()),
    };

    match rendered {
        Ok(out) => {
            if format != OutputFormat::Json {
                let stamp = format_timestamp_millis(chrono::Utc::now().timestamp_millis());
                println!("\n{}", format!("── {} ──", stamp).dimmed());
            }
            println!("{}", out);
        }
        Err(e) => {
            log::warn!("Refresh cycle failed: {}", e);
            eprintln!("{} {}", "⚠".yellow(), e);
        }
    }
}
