//! Cache management commands

use colored::Colorize;
use serde::Serialize;

use crate::cache::{CacheStore, DiskCacheStore};
use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::models::CacheDisplay;
use crate::output::formatters::format_size;
use crate::output::json::format_json;
use crate::output::table::format_table;
use crate::pipeline::Backend;
use crate::pipeline::backend::BACKEND_CACHE;
use crate::pipeline::service::WIDGET_CACHE;

/// Show the backend and widget entries for the tracked account
pub async fn info(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let username = ctx.config.require_username()?;
    let prefs = &ctx.config.preferences;

    let backend = ctx.backend()?;
    let backend_info = backend.cache().info(username, prefs.backend_ttl()).await;
    let widget_info = ctx.widget_cache()?.info(username, prefs.fallback_ttl()).await;

    match ctx.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "username": username,
                "path": DiskCacheStore::base_dir()?.display().to_string(),
                "backend": backend_info,
                "widget": widget_info,
            });
            println!("{}", format_json(&json)?);
        }
        _ => {
            let rows = vec![
                CacheDisplay::new(BACKEND_CACHE, &backend_info),
                CacheDisplay::new(WIDGET_CACHE, &widget_info),
            ];
            println!("Cache entries for {}", username.bold());
            println!("{}", format_table(&rows));

            let total: u64 = [&backend_info, &widget_info]
                .iter()
                .filter_map(|i| i.size_bytes)
                .sum();
            println!("Total size: {}", format_size(total));
        }
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClearJson {
    success: bool,
    message: String,
    widget_entries_removed: usize,
}

/// Clear both caches
pub async fn clear(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    let message = ctx.backend()?.clear_cache().await?;
    let widget = ctx.widget_cache()?.clear_all().await?;

    match ctx.format {
        OutputFormat::Json => println!(
            "{}",
            format_json(&ClearJson {
                success: true,
                message,
                widget_entries_removed: widget.entries_removed,
            })?
        ),
        _ => {
            println!("{} Backend: {}", "✓".green(), message);
            if widget.entries_removed > 0 {
                println!(
                    "{} Widget: cleared {} cache entries",
                    "✓".green(),
                    widget.entries_removed
                );
            } else {
                println!("{} Widget: cache was already empty", "○".dimmed());
            }
        }
    }

    Ok(())
}

/// Show cache path
pub fn path() -> Result<()> {
    let path = DiskCacheStore::base_dir()?;
    println!("{}", path.display());
    Ok(())
}
