//! Flight, trip and search request models

use serde::{Deserialize, Serialize};

use super::{DEFAULT_AIRPORT, DEFAULT_BUDGET, DEFAULT_OUTBOUND_LIMIT};

/// One flight segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Flight {
    pub flight_number: String,
    /// Origin IATA code
    pub origin: String,
    pub origin_full: String,
    /// Destination IATA code
    pub destination: String,
    pub destination_full: String,
    /// ISO-8601 departure time
    pub departure_time: String,
    pub price: f64,
    pub currency: String,
}

/// A round trip: outbound and return flights to one destination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(rename = "aller")]
    pub outbound: Flight,
    #[serde(rename = "retour")]
    pub inbound: Flight,
    #[serde(rename = "prix_total")]
    pub total_price: f64,
    #[serde(rename = "destination_code")]
    pub destination_code: String,
}

impl Trip {
    /// Same flights on the same departures, whatever the price
    pub fn same_flights(&self, other: &Trip) -> bool {
        self.outbound.flight_number == other.outbound.flight_number
            && self.outbound.departure_time == other.outbound.departure_time
            && self.inbound.flight_number == other.inbound.flight_number
            && self.inbound.departure_time == other.inbound.departure_time
    }
}

/// A travel date with an optional departure time window (HH:MM)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateWindow {
    pub date: String,
    #[serde(rename = "heure_min", default, skip_serializing_if = "Option::is_none")]
    pub earliest: Option<String>,
    #[serde(rename = "heure_max", default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
}

/// Parameters of a flight search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    #[serde(rename = "aeroport_depart", default, skip_serializing_if = "Option::is_none")]
    pub departure_airport: Option<String>,
    #[serde(rename = "dates_depart", default)]
    pub outbound_dates: Vec<DateWindow>,
    #[serde(rename = "dates_retour", default)]
    pub return_dates: Vec<DateWindow>,
    /// Maximum price per segment
    #[serde(rename = "budget_max", default, skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<f64>,
    #[serde(rename = "limite_allers", default, skip_serializing_if = "Option::is_none")]
    pub outbound_limit: Option<u32>,
    #[serde(rename = "destinations_exclues", default)]
    pub excluded_destinations: Vec<String>,
    /// When set, only these destinations are considered
    #[serde(rename = "destinations_incluses", default)]
    pub included_destinations: Option<Vec<String>>,
}

impl ScanRequest {
    pub fn departure_airport_or_default(&self) -> &str {
        self.departure_airport.as_deref().unwrap_or(DEFAULT_AIRPORT)
    }

    pub fn budget_or_default(&self) -> f64 {
        self.budget_max.unwrap_or(DEFAULT_BUDGET)
    }

    pub fn outbound_limit_or_default(&self) -> u32 {
        self.outbound_limit.unwrap_or(DEFAULT_OUTBOUND_LIMIT)
    }
}
