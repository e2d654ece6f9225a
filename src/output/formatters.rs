//! Reusable formatting utilities for CLI output
//!
//! Timestamps, intervals, prices and sizes shared across commands.

use chrono::{DateTime, Local, Utc};

/// Format a timestamp in local time, or "N/A".
///
/// # Example output
/// `2025-01-15 14:30`
pub fn format_timestamp_local(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "N/A".to_string(),
    }
}

/// Format epoch milliseconds in local time, or "N/A" when invalid
pub fn format_millis_local(millis: i64) -> String {
    format_timestamp_local(DateTime::from_timestamp_millis(millis).filter(|_| millis > 0))
}

/// Format an interval in seconds as a short human string.
///
/// # Example output
/// - `2h 15m`
/// - `5m`
/// - `45s`
pub fn format_interval(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;

    match (hours, mins) {
        (0, 0) => format!("{}s", secs),
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Format a price with its currency, defaulting to euros
pub fn format_price(amount: f64, currency: &str) -> String {
    let currency = if currency.is_empty() { "EUR" } else { currency };
    format!("{:.2} {}", amount, currency)
}

/// Format bytes as human-readable size
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
