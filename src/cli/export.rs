//! Export, migration and developer mode commands

use std::path::Path;

use colored::Colorize;
use serde_json::json;

use crate::cli::args::{GlobalOptions, Toggle};
use crate::cli::context::CommandContext;
use crate::error::{ConfigError, Result};
use crate::output::print_result;

/// Write a backup, or toggle automatic backups when `auto` is given
pub async fn run(opts: &GlobalOptions, output: Option<&Path>, auto: Option<Toggle>) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;

    if let Some(state) = auto {
        ctx.store.set_auto_export_enabled(state.enabled())?;
        let dir = CommandContext::export_dir()?;
        let message = if state.enabled() {
            format!(
                "{} Automatic backups on, written to {}",
                "✓".green(),
                dir.display()
            )
        } else {
            format!("{} Automatic backups off", "○".dimmed())
        };
        return print_result(
            &json!({"auto_export": state.enabled(), "dir": dir.display().to_string()}),
            ctx.format,
            &message,
        );
    }

    let dir = match output {
        Some(dir) => dir.to_path_buf(),
        None => CommandContext::export_dir()?,
    };
    let path = ctx.store.write_export(&dir).await?;

    print_result(
        &json!({"path": path.display().to_string()}),
        ctx.format,
        &format!("{} Backup written to {}", "✓".green(), path.display()),
    )?;
    ctx.finish().await
}

/// Upload local records to the signed-in account
pub async fn migrate(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    if !ctx.store.is_signed_in() {
        return Err(ConfigError::NotSignedIn.into());
    }

    let report = ctx.store.migrate_local_to_remote().await?;
    let message = match &report.error {
        None if report.searches_migrated + report.favorites_migrated == 0 => {
            format!("{} Nothing to migrate", "○".dimmed())
        }
        None => format!(
            "{} Migrated {} searches and {} favorites",
            "✓".green(),
            report.searches_migrated,
            report.favorites_migrated
        ),
        Some(error) => format!("{} Migration incomplete: {}", "✗".red(), error),
    };
    print_result(&report, ctx.format, &message)?;
    ctx.finish().await
}

/// Show or set developer mode
pub async fn dev_mode(opts: &GlobalOptions, state: Option<Toggle>) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    if let Some(state) = state {
        ctx.store.set_dev_mode(state.enabled())?;
    }
    let enabled = ctx.store.get_dev_mode()?;

    print_result(
        &json!({"dev_mode": enabled}),
        ctx.format,
        &format!("Developer mode: {}", if enabled { "on".yellow() } else { "off".normal() }),
    )
}
