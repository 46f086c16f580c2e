//! Logout command implementation

use colored::Colorize;

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::error::Result;

/// Forget the tracked account and remove the stored token.
///
/// Cached contributions are left in place; `gitpulse cache clear` drops them.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;

    ctx.credentials().delete_token()?;

    match ctx.config.username.take() {
        Some(name) => {
            ctx.save_config()?;
            println!("{} Logged out {}", "✓".green(), name.bold());
        }
        None => println!("{} No account configured", "○".dimmed()),
    }

    Ok(())
}
