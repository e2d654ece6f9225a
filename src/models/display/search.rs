//! Saved search display models

use serde::Serialize;
use tabled::Tabled;

use super::common::{format_dates, truncate_string};
use crate::client::models::{DEFAULT_AIRPORT, NewResult, SavedSearch};
use crate::output::formatters::{format_interval, format_timestamp_local};

/// Saved search display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct SearchDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "FROM")]
    pub airport: String,

    #[tabled(rename = "OUTBOUND")]
    pub outbound: String,

    #[tabled(rename = "RETURN")]
    pub inbound: String,

    /// Check interval, or "off"
    #[tabled(rename = "AUTO-CHECK")]
    pub auto_check: String,

    #[tabled(rename = "LAST CHECKED")]
    pub last_checked: String,
}

impl From<&SavedSearch> for SearchDisplay {
    fn from(search: &SavedSearch) -> Self {
        let auto_check = match (search.auto_check_enabled, search.auto_check_interval_seconds) {
            (false, _) => "off".to_string(),
            (true, Some(secs)) => format!("every {}", format_interval(secs)),
            (true, None) => "on".to_string(),
        };
        Self {
            id: search.id.clone(),
            name: truncate_string(&search.name, 32),
            airport: search
                .request
                .departure_airport
                .clone()
                .unwrap_or_else(|| DEFAULT_AIRPORT.to_string()),
            outbound: format_dates(&search.request.outbound_dates),
            inbound: format_dates(&search.request.return_dates),
            auto_check,
            last_checked: format_timestamp_local(search.last_checked_at),
        }
    }
}

impl From<SavedSearch> for SearchDisplay {
    fn from(search: SavedSearch) -> Self {
        Self::from(&search)
    }
}

/// Pending new results of one search
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct NewResultDisplay {
    #[tabled(rename = "SEARCH ID")]
    pub search_id: String,

    #[tabled(rename = "SEARCH")]
    pub search_name: String,

    #[tabled(rename = "TRIPS")]
    pub trips: usize,

    /// Cheapest total price found
    #[tabled(rename = "FROM")]
    pub cheapest: String,

    #[tabled(rename = "FOUND")]
    pub found: String,
}

impl From<&NewResult> for NewResultDisplay {
    fn from(result: &NewResult) -> Self {
        let cheapest = result
            .trips
            .iter()
            .map(|t| t.total_price)
            .fold(None, |min: Option<f64>, p| Some(min.map_or(p, |m| m.min(p))))
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "-".to_string());
        let name = if result.is_test {
            format!("{} (test)", result.search_name)
        } else {
            result.search_name.clone()
        };
        Self {
            search_id: result.search_id.clone(),
            search_name: name,
            trips: result.trips.len(),
            cheapest,
            found: format_timestamp_local(Some(result.timestamp)),
        }
    }
}
