//! Login and logout commands

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::cli::context::CommandContext;
use crate::client::{AuthApi, SupabaseClient};
use crate::config::Config;
use crate::error::Result;

/// Sign in and store the session in the config file
pub async fn login(opts: &GlobalOptions, email: Option<String>) -> Result<()> {
    let mut config = Config::load_at(opts.config_ref())?;
    let (url, key) = config.supabase()?;
    let client = SupabaseClient::new(url, key)?;

    let email = match email {
        Some(email) => email,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Email")
            .interact_text()?,
    };
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .interact()?;

    println!("{}", "Signing in...".cyan());
    let session = client.sign_in(&email, &password).await?;
    let user_id = session.user_id.clone();
    config.session = Some(session);
    config.save_at(opts.config_ref())?;

    println!("{} Signed in as {}", "✓".green(), email.bold());

    let ctx = CommandContext::new(opts).await?;
    if ctx.store.local().has_records()? && ctx.store.needs_migration().await {
        println!(
            "{} Records saved on this machine can be uploaded with {}",
            "⚠".yellow(),
            "flightwatcher migrate".cyan()
        );
    }
    log::debug!("Session stored for {}", user_id);
    ctx.finish().await
}

/// Drop the session and the user's cached records
pub async fn logout(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    if !ctx.config.is_signed_in() {
        println!("{} Not signed in", "○".dimmed());
        return Ok(());
    }

    ctx.store.logout();
    let mut config = ctx.config;
    config.session = None;
    config.save_at(opts.config_ref())?;

    println!("{} Signed out", "✓".green());
    Ok(())
}
