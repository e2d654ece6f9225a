//! Status command implementation

use colored::Colorize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::cli::context::CommandContext;
use crate::config::Config;
use crate::error::Result;
use crate::output::json::format_json;

/// Display configuration, session and local data status
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let config_path = Config::resolve_path(opts.config_ref())?;
    let config_exists = config_path.exists();
    let local = ctx.store.local();

    if ctx.format == OutputFormat::Json {
        let status = json!({
            "config_path": config_path.display().to_string(),
            "config_found": config_exists,
            "supabase_configured": ctx.config.supabase().is_ok(),
            "signed_in": ctx.store.is_signed_in(),
            "user_id": ctx.store.user_id(),
            "email": ctx.config.session.as_ref().and_then(|s| s.email.clone()),
            "token_expired": ctx.config.session.as_ref().map(|s| s.is_expired()),
            "default_airport": ctx.config.default_airport(),
            "local_searches": local.searches()?.len(),
            "local_favorites": local.favorites()?.len(),
            "auto_export": local.auto_export_enabled()?,
            "dev_mode": local.dev_mode()?,
        });
        println!("{}", format_json(&status)?);
        return Ok(());
    }

    println!("{}\n", "FlightWatcher Status".bold());

    if config_exists {
        println!("Config file: {}", config_path.display().to_string().cyan());
    } else {
        println!("{} Configuration not found", "✗".red());
        println!("  → Run {} to connect your account", "flightwatcher init".cyan());
    }
    println!();

    if ctx.config.supabase().is_ok() {
        println!("{} Supabase project configured", "✓".green());
    } else {
        println!("{} Supabase project not configured", "✗".red());
    }

    match &ctx.config.session {
        Some(session) if session.is_expired() => {
            println!(
                "{} Session expired (will refresh on next command)",
                "⚠".yellow()
            );
        }
        Some(session) => {
            let remaining = session.expires_at.signed_duration_since(chrono::Utc::now());
            println!(
                "{} Signed in as {} (token expires in {}h {}m)",
                "✓".green(),
                session.email.as_deref().unwrap_or(&session.user_id).bold(),
                remaining.num_hours(),
                remaining.num_minutes() % 60
            );
        }
        None => {
            println!("{} Not signed in, records are kept on this machine", "○".dimmed());
            println!("  → Run 'flightwatcher login' to sync them");
        }
    }

    println!("{} Default airport: {}", "○".dimmed(), ctx.config.default_airport());

    let searches = local.searches()?.len();
    let favorites = local.favorites()?.len();
    if searches + favorites > 0 {
        println!(
            "{} Local records: {} searches, {} favorites",
            "○".dimmed(),
            searches,
            favorites
        );
        if ctx.store.is_signed_in() {
            println!("  → Run 'flightwatcher migrate' to upload them");
        }
    }

    if local.auto_export_enabled()? {
        println!("{} Auto-export enabled", "✓".green());
    }
    if local.dev_mode()? {
        println!("{} Developer mode", "⚠".yellow());
    }

    println!();
    Ok(())
}
