//! Favorite commands

use std::path::Path;

use colored::Colorize;
use serde_json::json;

use crate::cli::args::{GlobalOptions, Toggle};
use crate::cli::context::CommandContext;
use crate::cli::search::read_json_input;
use crate::client::models::{ScanRequest, Trip};
use crate::error::Result;
use crate::models::FavoriteDisplay;
use crate::output::{Formattable, print_result};

pub async fn list(opts: &GlobalOptions, archived: bool, all: bool) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let favorites = if all {
        ctx.store.get_favorites().await?
    } else if archived {
        ctx.store.get_archived_favorites().await?
    } else {
        ctx.store.get_active_favorites().await?
    };

    let display: Vec<FavoriteDisplay> = favorites.iter().map(FavoriteDisplay::from).collect();
    display.print(ctx.format)?;
    ctx.finish().await
}

pub async fn add(opts: &GlobalOptions, trip: &Path, search_id: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let trip: Trip = read_json_input(trip)?;

    if ctx.store.is_favorite(&trip).await? {
        println!("{} Trip is already a favorite", "○".dimmed());
        return ctx.finish().await;
    }

    let request = match search_id {
        Some(id) => ctx
            .store
            .get_saved_search(id)
            .await?
            .map(|s| s.request)
            .unwrap_or_default(),
        None => ScanRequest::default(),
    };
    let saved = ctx.store.save_favorite(trip, request).await?;

    print_result(
        &saved,
        ctx.format,
        &format!(
            "{} Added {} to favorites ({})",
            "✓".green(),
            saved.trip.destination_code.bold(),
            saved.id
        ),
    )?;
    ctx.finish().await
}

pub async fn delete(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    ctx.store.delete_favorite(id).await?;

    print_result(
        &json!({"deleted": id}),
        ctx.format,
        &format!("{} Deleted favorite {}", "✓".green(), id),
    )?;
    ctx.finish().await
}

pub async fn archive(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let archived = ctx.store.toggle_favorite_archived(id).await?;

    let message = if archived {
        format!("{} Archived favorite {}", "✓".green(), id)
    } else {
        format!("{} Restored favorite {}", "✓".green(), id)
    };
    print_result(&json!({"id": id, "archived": archived}), ctx.format, &message)?;
    ctx.finish().await
}

pub async fn status(opts: &GlobalOptions, id: &str, available: Toggle) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    ctx.store
        .update_favorite_status(id, available.enabled())
        .await?;

    let state = if available.enabled() {
        "available".green()
    } else {
        "unavailable".red()
    };
    print_result(
        &json!({"id": id, "is_still_valid": available.enabled()}),
        ctx.format,
        &format!("Favorite {} marked {}", id, state),
    )?;
    ctx.finish().await
}

pub async fn check(opts: &GlobalOptions, trip: &Path) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let trip: Trip = read_json_input(trip)?;
    let is_favorite = ctx.store.is_favorite(&trip).await?;

    let message = if is_favorite {
        format!("{} Trip is a favorite", "✓".green())
    } else {
        format!("{} Trip is not a favorite", "○".dimmed())
    };
    print_result(&json!({"is_favorite": is_favorite}), ctx.format, &message)?;
    ctx.finish().await
}
