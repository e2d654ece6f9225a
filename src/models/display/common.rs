//! Common display utilities and helpers

use crate::client::models::{DateWindow, Flight};

/// Truncate string to max characters with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// `2025-03-01 06:00-12:00`, or just the date without a window
pub fn format_window(window: &DateWindow) -> String {
    match (&window.earliest, &window.latest) {
        (None, None) => window.date.clone(),
        (from, to) => format!(
            "{} {}-{}",
            window.date,
            from.as_deref().unwrap_or("00:00"),
            to.as_deref().unwrap_or("23:59")
        ),
    }
}

/// Comma-separated dates of a list of windows
pub fn format_dates(windows: &[DateWindow]) -> String {
    if windows.is_empty() {
        return "-".to_string();
    }
    windows
        .iter()
        .map(|w| w.date.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `FR1234 BVA→BCN 2025-03-01 07:00`
pub fn format_flight(flight: &Flight) -> String {
    let when = flight
        .departure_time
        .get(..16)
        .map(|t| t.replace('T', " "))
        .unwrap_or_else(|| flight.departure_time.clone());
    format!(
        "{} {}→{} {}",
        flight.flight_number, flight.origin, flight.destination, when
    )
}
