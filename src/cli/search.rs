//! Saved search commands

use std::io::Read;
use std::path::Path;

use colored::Colorize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::cli::args::{GlobalOptions, RequestArgs, Toggle};
use crate::cli::context::CommandContext;
use crate::client::models::{SavedSearch, Trip};
use crate::error::{Error, Result};
use crate::models::{NewResultDisplay, SearchDisplay, TripDisplay};
use crate::output::formatters::format_timestamp_local;
use crate::output::json::format_json;
use crate::output::{Formattable, print_result};

/// Read a JSON document from a file, or stdin for `-`
pub fn read_json_input<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&raw)?)
}

/// Trips of `found` with no matching flights in `previous`
pub fn new_trips(found: &[Trip], previous: &[Trip]) -> Vec<Trip> {
    found
        .iter()
        .filter(|t| !previous.iter().any(|p| p.same_flights(t)))
        .cloned()
        .collect()
}

async fn require_search(ctx: &CommandContext, id: &str) -> Result<SavedSearch> {
    ctx.store
        .get_saved_search(id)
        .await?
        .ok_or_else(|| Error::Other(format!("No saved search with ID {}", id)))
}

pub async fn list(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let searches = ctx.store.get_saved_searches().await?;
    log::debug!("Listing {} searches", searches.len());

    let display: Vec<SearchDisplay> = searches.iter().map(SearchDisplay::from).collect();
    display.print(ctx.format)?;
    ctx.finish().await
}

pub async fn show(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let search = require_search(&ctx, id).await?;

    if ctx.format == OutputFormat::Json {
        println!("{}", format_json(&search)?);
        return ctx.finish().await;
    }

    println!("{} {}", search.name.bold(), format!("({})", search.id).dimmed());
    vec![SearchDisplay::from(&search)].print(ctx.format)?;
    println!("Created:   {}", format_timestamp_local(Some(search.created_at)));
    println!("Last used: {}", format_timestamp_local(search.last_used));
    if let Some(budget) = search.request.budget_max {
        println!("Budget:    {:.2} per flight", budget);
    }
    if !search.request.excluded_destinations.is_empty() {
        println!("Excluded:  {}", search.request.excluded_destinations.join(", "));
    }
    if let Some(included) = &search.request.included_destinations {
        println!("Only:      {}", included.join(", "));
    }

    if let Some(results) = &search.last_check_results {
        println!("\n{}", "Last check results".bold());
        let trips: Vec<TripDisplay> = results.iter().map(TripDisplay::from).collect();
        trips.print(ctx.format)?;
    }
    ctx.finish().await
}

pub async fn save(
    opts: &GlobalOptions,
    name: &str,
    request: &RequestArgs,
    auto_check: bool,
    interval: Option<u64>,
) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let request = request.to_request(ctx.config.default_airport())?;
    let saved = ctx
        .store
        .save_search(name, request, auto_check, interval)
        .await?;

    print_result(
        &saved,
        ctx.format,
        &format!("{} Saved search {} ({})", "✓".green(), saved.name.bold(), saved.id),
    )?;
    ctx.finish().await
}

pub async fn delete(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    ctx.store.delete_search(id).await?;

    print_result(
        &json!({"deleted": id}),
        ctx.format,
        &format!("{} Deleted search {}", "✓".green(), id),
    )?;
    ctx.finish().await
}

/// Bump usage and print the request for a search tool to consume
pub async fn use_search(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let search = require_search(&ctx, id).await?;
    ctx.store.update_search_last_used(id).await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&search.request)?),
        _ => println!("{}", serde_json::to_string_pretty(&search.request)?),
    }
    ctx.finish().await
}

pub async fn auto_check(
    opts: &GlobalOptions,
    id: &str,
    state: Toggle,
    interval: Option<u64>,
) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    require_search(&ctx, id).await?;
    ctx.store
        .update_search_auto_check(id, state.enabled(), interval)
        .await?;

    let message = if state.enabled() {
        format!("{} Automatic checks on for {}", "✓".green(), id)
    } else {
        format!("{} Automatic checks off for {}", "○".dimmed(), id)
    };
    print_result(
        &json!({"id": id, "auto_check_enabled": state.enabled()}),
        ctx.format,
        &message,
    )?;
    ctx.finish().await
}

/// Store the trips found by a check; trips not seen last time become new results
pub async fn record_check(opts: &GlobalOptions, id: &str, results: &Path, test: bool) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let search = require_search(&ctx, id).await?;
    let found: Vec<Trip> = read_json_input(results)?;

    let fresh = match &search.last_check_results {
        Some(previous) => new_trips(&found, previous),
        // First check: nothing to compare against
        None => Vec::new(),
    };

    ctx.store
        .update_search_last_check_results(id, found.clone())
        .await?;
    if !fresh.is_empty() {
        ctx.store
            .save_new_results(id, &search.name, fresh.clone(), test)
            .await?;
    }

    print_result(
        &json!({"id": id, "trips": found.len(), "new": fresh.len()}),
        ctx.format,
        &format!(
            "{} Recorded {} trips for {}, {} new",
            "✓".green(),
            found.len(),
            search.name.bold(),
            fresh.len()
        ),
    )?;
    ctx.finish().await
}

pub async fn due(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let due = ctx.store.get_due_auto_checks(chrono::Utc::now()).await?;

    let display: Vec<SearchDisplay> = due.iter().map(SearchDisplay::from).collect();
    display.print(ctx.format)?;
    ctx.finish().await
}

pub async fn new_results(opts: &GlobalOptions, clear: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;

    if let Some(id) = clear {
        ctx.store.clear_new_results(id)?;
        return print_result(
            &json!({"cleared": id}),
            ctx.format,
            &format!("{} Cleared new results for {}", "✓".green(), id),
        );
    }

    let results = ctx.store.get_new_results()?;
    let display: Vec<NewResultDisplay> = results.values().map(NewResultDisplay::from).collect();
    display.print(ctx.format)
}
