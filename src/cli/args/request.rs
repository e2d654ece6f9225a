//! Search request arguments

use clap::Args;

use crate::client::models::{DateWindow, ScanRequest};
use crate::error::{ConfigError, Result};

/// Flags describing a flight search
#[derive(Debug, Clone, Args)]
pub struct RequestArgs {
    /// Departure airport (IATA code); defaults to the configured airport
    #[arg(long, short = 'f')]
    pub from: Option<String>,

    /// Outbound date, optionally with a time window: 2025-03-01 or 2025-03-01@06:00-12:00
    #[arg(long = "out", short = 'o', required = true)]
    pub outbound: Vec<String>,

    /// Return date, same syntax as --out
    #[arg(long = "back", short = 'b')]
    pub inbound: Vec<String>,

    /// Maximum price per flight
    #[arg(long)]
    pub budget: Option<f64>,

    /// Maximum number of outbound flights to consider
    #[arg(long)]
    pub limit: Option<u32>,

    /// Destinations to skip, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Only consider these destinations, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub include: Option<Vec<String>>,
}

/// Parse `DATE` or `DATE@HH:MM-HH:MM`; either time may be empty
pub fn parse_window(raw: &str) -> Result<DateWindow> {
    let invalid = || ConfigError::Invalid(format!("Invalid date window: {}", raw));

    let (date, window) = match raw.split_once('@') {
        Some((date, window)) => (date, Some(window)),
        None => (raw, None),
    };
    if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return Err(invalid().into());
    }

    let time = |t: &str| -> Result<Option<String>> {
        if t.is_empty() {
            return Ok(None);
        }
        chrono::NaiveTime::parse_from_str(t, "%H:%M").map_err(|_| invalid())?;
        Ok(Some(t.to_string()))
    };

    let (earliest, latest) = match window {
        None => (None, None),
        Some(w) => {
            let (from, to) = w.split_once('-').ok_or_else(invalid)?;
            (time(from)?, time(to)?)
        }
    };

    Ok(DateWindow {
        date: date.to_string(),
        earliest,
        latest,
    })
}

fn upper(codes: &[String]) -> Vec<String> {
    codes.iter().map(|c| c.trim().to_uppercase()).collect()
}

impl RequestArgs {
    pub fn to_request(&self, default_airport: &str) -> Result<ScanRequest> {
        Ok(ScanRequest {
            departure_airport: Some(
                self.from
                    .as_deref()
                    .unwrap_or(default_airport)
                    .to_uppercase(),
            ),
            outbound_dates: self
                .outbound
                .iter()
                .map(|d| parse_window(d))
                .collect::<Result<_>>()?,
            return_dates: self
                .inbound
                .iter()
                .map(|d| parse_window(d))
                .collect::<Result<_>>()?,
            budget_max: self.budget,
            outbound_limit: self.limit,
            excluded_destinations: upper(&self.exclude),
            included_destinations: self.include.as_deref().map(upper),
        })
    }
}
