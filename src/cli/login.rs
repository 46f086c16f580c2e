//! Login command implementation

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::cli::fetch;
use crate::error::{ConfigError, Result};

/// Run the login command
///
/// Stores the username in the config file and the token (if any) in the OS
/// keyring, then runs one fetch so the caches start warm.
pub async fn run(opts: &GlobalOptions, username: Option<String>, no_token: bool) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;

    println!("{}", "Welcome to GitPulse!".bold().green());
    println!("Let's connect your GitHub account.\n");

    let username = match username {
        Some(name) => name,
        None => Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("GitHub username")
            .with_initial_text(ctx.config.username().unwrap_or_default())
            .interact_text()?,
    };
    let username = normalize_username(&username)?;

    let token = if no_token {
        None
    } else {
        let token: String = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("GitHub token (leave empty for public data only)")
            .allow_empty_password(true)
            .interact()?;
        Some(token)
    };

    ctx.config.username = Some(username.clone());
    ctx.save_config()?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        ctx.config_path.display()
    );

    match token.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => {
            ctx.credentials().save_token(t)?;
            println!("{} Token stored in the system keyring", "✓".green());
        }
        Some(_) => {
            ctx.credentials().delete_token()?;
            println!(
                "{} No token stored, only public contributions will be shown",
                "○".dimmed()
            );
        }
        None => {}
    }

    println!("\n{}", "Fetching contributions...".cyan());
    let service = ctx.service()?;
    let outcome = fetch::cycle(&service, ctx.format).await?;
    fetch::report(outcome, ctx.format, false)?;

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show account and cache status", "gitpulse status".cyan());
    println!("  {} - Keep the heatmap refreshed", "gitpulse watch".cyan());

    Ok(())
}

/// Trimmed, non-empty username with any leading `@` removed.
fn normalize_username(raw: &str) -> Result<String> {
    let name = raw.trim().trim_start_matches('@').trim();
    if name.is_empty() {
        return Err(ConfigError::Invalid("username must not be empty".to_string()).into());
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  octocat ").unwrap(), "octocat");
        assert_eq!(normalize_username("@octocat").unwrap(), "octocat");
        assert!(normalize_username("   ").is_err());
        assert!(normalize_username("@").is_err());
    }
}
