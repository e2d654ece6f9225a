//! Cache management commands

use serde_json::json;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::cli::context::CommandContext;
use crate::error::Result;
use crate::output::formatters::{format_millis_local, format_size};
use crate::output::json::format_json;
use crate::output::print_result;

/// Show cache status/statistics
pub async fn status(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let stats = ctx.cache.stats();
    let path = ctx.cache.store().path().display().to_string();

    match ctx.format {
        OutputFormat::Json => {
            let status = json!({
                "total_entries": stats.total_entries,
                "valid_entries": stats.valid_entries,
                "expired_entries": stats.expired_entries,
                "corrupt_entries": stats.corrupt_entries,
                "total_size_bytes": stats.total_size_bytes,
                "total_size_human": format_size(stats.total_size_bytes),
                "oldest_entry_timestamp": stats.oldest_entry,
                "newest_entry_timestamp": stats.newest_entry,
                "path": path,
            });
            println!("{}", format_json(&status)?);
        }
        _ => {
            println!("Cache Status");
            println!("────────────────────────────────────────");
            println!("Location:       {}", path);
            println!("Valid entries:  {}", stats.valid_entries);
            println!("Expired:        {}", stats.expired_entries);
            if stats.corrupt_entries > 0 {
                println!("Corrupt:        {}", stats.corrupt_entries);
            }
            println!("Total size:     {}", format_size(stats.total_size_bytes));

            if let Some(oldest) = stats.oldest_entry {
                println!("Oldest entry:   {}", format_millis_local(oldest));
            }
            if let Some(newest) = stats.newest_entry {
                println!("Newest entry:   {}", format_millis_local(newest));
            }
        }
    }

    Ok(())
}

/// Clear all cached records of every user
pub async fn clear(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let removed = ctx.cache.clear_all();

    let message = if removed > 0 {
        format!("Cleared {} cache entries", removed)
    } else {
        "Cache was already empty".to_string()
    };
    print_result(
        &json!({"entries_removed": removed, "success": true}),
        ctx.format,
        &message,
    )
}

/// Remove cached records older than `hours`, whatever their TTL
pub async fn sweep(opts: &GlobalOptions, hours: u64) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let max_age = i64::try_from(hours.saturating_mul(3_600_000)).unwrap_or(i64::MAX);
    let removed = ctx.cache.sweep_older_than(max_age);

    print_result(
        &json!({"entries_removed": removed, "older_than_hours": hours}),
        ctx.format,
        &format!("Removed {} entries older than {}h", removed, hours),
    )
}

/// Show the local store path
pub fn path() -> Result<()> {
    let dir = crate::cache::SqliteKvStore::data_dir()?;
    println!("{}", dir.join("store.db").display());
    Ok(())
}
