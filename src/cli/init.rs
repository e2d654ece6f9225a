//! Init command implementation

use colored::Colorize;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::client::models::DEFAULT_AIRPORT;
use crate::config::Config;
use crate::error::Result;

/// Run the init command
///
/// Prompts for the Supabase project, keeping current values as defaults,
/// then offers to sign in.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}", "Welcome to FlightWatcher!".bold().green());
    println!("Let's connect to your Supabase project.\n");

    let mut config = Config::load_or_default_at(opts.config_ref())?;
    let theme = ColorfulTheme::default();

    let mut url_prompt = Input::<String>::with_theme(&theme).with_prompt("Supabase project URL");
    if let Some(url) = &config.supabase_url {
        url_prompt = url_prompt.default(url.clone());
    }
    let url = url_prompt.interact_text()?;

    let mut key_prompt = Input::<String>::with_theme(&theme).with_prompt("Supabase anon key");
    if let Some(key) = &config.supabase_anon_key {
        key_prompt = key_prompt.default(key.clone());
    }
    let anon_key = key_prompt.interact_text()?;

    let airport: String = Input::with_theme(&theme)
        .with_prompt("Default departure airport")
        .default(config.default_airport().to_string())
        .interact_text()?;

    if config.supabase_url.as_deref() != Some(url.trim()) {
        // A session belongs to one project
        config.session = None;
    }
    config.supabase_url = Some(url.trim().to_string());
    config.supabase_anon_key = Some(anon_key.trim().to_string());
    let airport = airport.trim().to_uppercase();
    config.preferences.default_airport = (airport != DEFAULT_AIRPORT).then_some(airport);

    config.save_at(opts.config_ref())?;
    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    let sign_in = Confirm::with_theme(&theme)
        .with_prompt("Sign in now?")
        .default(true)
        .interact()?;
    if sign_in {
        crate::cli::auth::login(opts, None).await?;
    }

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "flightwatcher status".cyan());
    println!("  {} - List saved searches", "flightwatcher search list".cyan());

    Ok(())
}
