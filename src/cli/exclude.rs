//! Excluded destination commands

use colored::Colorize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::cli::context::CommandContext;
use crate::error::Result;
use crate::output::json::format_json;
use crate::output::print_result;

fn normalize(codes: &[String]) -> Vec<String> {
    let mut codes: Vec<String> = codes
        .iter()
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect();
    codes.sort();
    codes.dedup();
    codes
}

pub async fn set(opts: &GlobalOptions, airport: &str, codes: &[String]) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let airport = airport.to_uppercase();
    let codes = normalize(codes);
    ctx.store
        .save_excluded_destinations(&airport, codes.clone())
        .await?;

    let message = if codes.is_empty() {
        format!("{} No destinations excluded from {}", "✓".green(), airport)
    } else {
        format!(
            "{} Excluded from {}: {}",
            "✓".green(),
            airport.bold(),
            codes.join(", ")
        )
    };
    print_result(&json!({"airport": airport, "excluded": codes}), ctx.format, &message)
}

pub async fn get(opts: &GlobalOptions, airport: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let airport = airport.to_uppercase();
    let codes = ctx.store.get_excluded_destinations_for_airport(&airport)?;

    let message = if codes.is_empty() {
        format!("No destinations excluded from {}", airport)
    } else {
        codes.join(", ")
    };
    print_result(&json!({"airport": airport, "excluded": codes}), ctx.format, &message)
}

pub async fn list(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let all = ctx.store.get_excluded_destinations()?;

    if ctx.format == OutputFormat::Json {
        println!("{}", format_json(&all)?);
        return Ok(());
    }
    if all.is_empty() {
        println!("No excluded destinations");
    }
    for (airport, codes) in &all {
        println!("{}: {}", airport.bold(), codes.join(", "));
    }
    Ok(())
}
