//! Status command implementation

use colored::Colorize;
use serde::Serialize;

use crate::cache::{CacheInfo, CacheStore};
use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::models::CacheDisplay;
use crate::output::json::format_json;
use crate::output::table::format_table;
use crate::pipeline::backend::BACKEND_CACHE;
use crate::pipeline::service::WIDGET_CACHE;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusJson<'a> {
    config_path: String,
    username: Option<&'a str>,
    token_stored: bool,
    use_backend: bool,
    caches: Vec<NamedCache>,
}

#[derive(Serialize)]
struct NamedCache {
    name: &'static str,
    #[serde(flatten)]
    info: CacheInfo,
}

/// Run the status command to display account, token and cache state
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let prefs = &ctx.config.preferences;
    let username = ctx.config.username();

    let token_stored = match ctx.credentials().get_token() {
        Ok(token) => token.is_some_and(|t| !t.trim().is_empty()),
        Err(e) => {
            log::warn!("Could not read token from keyring: {}", e);
            false
        }
    };

    let mut caches = Vec::new();
    if let Some(name) = username {
        if prefs.use_backend {
            let backend = ctx.backend()?;
            let info = backend.cache().info(name, prefs.backend_ttl()).await;
            caches.push(NamedCache {
                name: BACKEND_CACHE,
                info,
            });
        }
        let info = ctx.widget_cache()?.info(name, prefs.fallback_ttl()).await;
        caches.push(NamedCache {
            name: WIDGET_CACHE,
            info,
        });
    }

    if ctx.format == OutputFormat::Json {
        println!(
            "{}",
            format_json(&StatusJson {
                config_path: ctx.config_path.display().to_string(),
                username,
                token_stored,
                use_backend: prefs.use_backend,
                caches,
            })?
        );
        return Ok(());
    }

    println!("{}\n", "GitPulse Status".bold());
    println!(
        "Config file: {}",
        ctx.config_path.display().to_string().cyan()
    );
    println!();

    match username {
        Some(name) => println!("{} Tracking GitHub user {}", "✓".green(), name.bold()),
        None => {
            println!("{} No GitHub username configured", "✗".red());
            println!("  → Run 'gitpulse login' to configure");
            println!();
            return Ok(());
        }
    }

    if token_stored {
        println!("{} Token stored in keyring", "✓".green());
    } else {
        println!(
            "{} No token stored (public contributions only)",
            "○".dimmed()
        );
    }

    if !prefs.use_backend {
        println!("{} Backend disabled, using fallback chain only", "○".dimmed());
    }
    if let Some(host) = prefs.api_host() {
        println!("{} Custom API host: {}", "○".dimmed(), host.cyan());
    }
    if let Some(host) = prefs.web_host() {
        println!("{} Custom web host: {}", "○".dimmed(), host.cyan());
    }

    let rows: Vec<CacheDisplay> = caches
        .iter()
        .map(|c| CacheDisplay::new(c.name, &c.info))
        .collect();
    println!("\n{}", format_table(&rows));

    Ok(())
}
