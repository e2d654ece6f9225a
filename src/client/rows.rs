//! Mapping between database rows and local records
//!
//! Rows arrive as loosely typed JSON. Each field is validated explicitly so a
//! malformed row fails with a `MappingError` naming the table and field,
//! instead of leaking a half-filled record into the cache. Several legacy
//! column layouts are still accepted.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::models::{
    DEFAULT_CHECK_INTERVAL_SECS, DateWindow, Flight, SavedFavorite, SavedSearch, ScanRequest, Trip,
};
use crate::error::MappingError;

pub const SEARCHES_TABLE: &str = "saved_searches";
pub const FAVORITES_TABLE: &str = "favorites";
pub const PROFILES_TABLE: &str = "user_profiles";

type Result<T> = std::result::Result<T, MappingError>;

/// A field value, treating JSON `null` as absent
fn field<'a>(row: &'a Value, name: &str) -> Option<&'a Value> {
    row.get(name).filter(|v| !v.is_null())
}

/// First present field among `names`, with the name that matched
fn first_field<'a>(row: &'a Value, names: &[&'static str]) -> Option<(&'static str, &'a Value)> {
    names
        .iter()
        .find_map(|name| field(row, name).map(|v| (*name, v)))
}

/// Identifier column: text (uuid) or integer
fn id(row: &Value, table: &'static str, name: &'static str) -> Result<String> {
    match field(row, name) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(MappingError::invalid(
            table,
            name,
            format!("is not an identifier: {}", other),
        )),
        None => Err(MappingError::missing(table, name)),
    }
}

fn string(row: &Value, table: &'static str, name: &'static str) -> Result<Option<String>> {
    match field(row, name) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(MappingError::invalid(table, name, "is not a string")),
        None => Ok(None),
    }
}

fn boolean(row: &Value, table: &'static str, name: &'static str) -> Result<Option<bool>> {
    match field(row, name) {
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(MappingError::invalid(table, name, "is not a boolean")),
        None => Ok(None),
    }
}

/// Numeric column, accepting numeric strings (Postgres `numeric` arrives as text)
fn number(row: &Value, table: &'static str, name: &'static str) -> Result<Option<f64>> {
    match field(row, name) {
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| MappingError::invalid(table, name, "is out of range")),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            MappingError::invalid(table, name, format!("is not numeric: {:?}", s))
        }),
        Some(_) => Err(MappingError::invalid(table, name, "is not a number")),
        None => Ok(None),
    }
}

fn unsigned(row: &Value, table: &'static str, name: &'static str) -> Result<Option<u64>> {
    match number(row, table, name)? {
        Some(n) if n >= 0.0 && n.fract() == 0.0 => Ok(Some(n as u64)),
        Some(n) => Err(MappingError::invalid(
            table,
            name,
            format!("is not a non-negative integer: {}", n),
        )),
        None => Ok(None),
    }
}

/// JSONB column, stored either as a JSON value or as a JSON-encoded string
fn jsonb<T: DeserializeOwned>(
    row: &Value,
    table: &'static str,
    name: &'static str,
) -> Result<Option<T>> {
    let parsed = match field(row, name) {
        Some(Value::String(encoded)) => serde_json::from_str(encoded),
        Some(value) => serde_json::from_value(value.clone()),
        None => return Ok(None),
    };
    parsed
        .map(Some)
        .map_err(|e| MappingError::invalid(table, name, format!("has unexpected shape: {}", e)))
}

/// Parse a Postgres or JavaScript timestamp
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // timestamp without time zone
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn timestamp(
    row: &Value,
    table: &'static str,
    name: &'static str,
) -> Result<Option<DateTime<Utc>>> {
    match string(row, table, name)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| MappingError::invalid(table, name, format!("is not a timestamp: {}", raw))),
        None => Ok(None),
    }
}

/// Map a `saved_searches` row.
pub fn search_from_row(row: &Value) -> Result<SavedSearch> {
    let t = SEARCHES_TABLE;

    let departure_airport = match first_field(row, &["departure_airport", "aeroport_depart"]) {
        Some((_, Value::String(code))) => Some(code.clone()),
        Some((name, _)) => return Err(MappingError::invalid(t, name, "is not a string")),
        None => None,
    };

    let interval = match first_field(row, &["check_interval_seconds", "auto_check_interval_seconds"])
    {
        Some((name, _)) => unsigned(row, t, name)?.filter(|secs| *secs > 0),
        None => None,
    };

    let outbound_dates: Vec<DateWindow> =
        jsonb(row, t, "dates_depart")?.ok_or_else(|| MappingError::missing(t, "dates_depart"))?;

    let request = ScanRequest {
        departure_airport,
        outbound_dates,
        return_dates: jsonb(row, t, "dates_retour")?.unwrap_or_default(),
        budget_max: number(row, t, "budget_max")?,
        outbound_limit: unsigned(row, t, "limite_allers")?.map(|n| n as u32),
        excluded_destinations: jsonb(row, t, "destinations_exclues")?.unwrap_or_default(),
        included_destinations: jsonb(row, t, "destinations_incluses")?,
    };

    Ok(SavedSearch {
        id: id(row, t, "id")?,
        name: string(row, t, "name")?.ok_or_else(|| MappingError::missing(t, "name"))?,
        request,
        created_at: timestamp(row, t, "created_at")?
            .ok_or_else(|| MappingError::missing(t, "created_at"))?,
        last_used: timestamp(row, t, "last_used")?,
        auto_check_enabled: boolean(row, t, "auto_check_enabled")?.unwrap_or(false),
        auto_check_interval_seconds: Some(interval.unwrap_or(DEFAULT_CHECK_INTERVAL_SECS)),
        last_check_results: jsonb(row, t, "last_check_results")?,
        last_checked_at: timestamp(row, t, "last_checked_at")?,
    })
}

/// Map a `favorites` row.
pub fn favorite_from_row(row: &Value) -> Result<SavedFavorite> {
    let t = FAVORITES_TABLE;

    let outbound: Flight =
        jsonb(row, t, "outbound_flight")?.ok_or_else(|| MappingError::missing(t, "outbound_flight"))?;
    let inbound: Flight =
        jsonb(row, t, "return_flight")?.ok_or_else(|| MappingError::missing(t, "return_flight"))?;

    let destination_code = match string(row, t, "destination_code")? {
        Some(code) if !code.is_empty() => code,
        _ => outbound.destination.clone(),
    };

    Ok(SavedFavorite {
        id: id(row, t, "id")?,
        trip: Trip {
            total_price: number(row, t, "total_price")?.unwrap_or(0.0),
            destination_code,
            outbound,
            inbound,
        },
        search_request: jsonb(row, t, "search_request")?.unwrap_or_default(),
        created_at: timestamp(row, t, "created_at")?
            .ok_or_else(|| MappingError::missing(t, "created_at"))?,
        last_checked: timestamp(row, t, "last_availability_check")?,
        is_still_valid: boolean(row, t, "is_available")?.unwrap_or(true),
        archived: boolean(row, t, "is_archived")?.unwrap_or(false),
    })
}

/// UTC calendar date of a flight's departure, as `YYYY-MM-DD`
fn departure_date(flight: &Flight) -> Option<String> {
    parse_timestamp(&flight.departure_time).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Insert payload for a saved search owned by `user_id`.
///
/// The local id and creation time are dropped; the database assigns both.
pub fn search_to_row(user_id: &str, search: &SavedSearch) -> Value {
    let request = &search.request;
    json!({
        "user_id": user_id,
        "name": search.name,
        "departure_airport": request.departure_airport_or_default(),
        "dates_depart": request.outbound_dates,
        "dates_retour": request.return_dates,
        "budget_max": request.budget_or_default(),
        "limite_allers": request.outbound_limit_or_default(),
        "destinations_exclues": request.excluded_destinations,
        "destinations_incluses": request.included_destinations,
        "auto_check_enabled": search.auto_check_enabled,
        "check_interval_seconds": search
            .auto_check_interval_seconds
            .unwrap_or(DEFAULT_CHECK_INTERVAL_SECS),
        "last_check_results": search.last_check_results,
        "last_checked_at": search.last_checked_at,
        "last_used": search.last_used,
        "times_used": 0,
    })
}

/// Insert payload for a favorite owned by `user_id`
pub fn favorite_to_row(user_id: &str, favorite: &SavedFavorite) -> Value {
    let trip = &favorite.trip;
    json!({
        "user_id": user_id,
        "destination_code": trip.destination_code,
        "destination_name": trip.outbound.destination_full,
        "outbound_date": departure_date(&trip.outbound),
        "return_date": departure_date(&trip.inbound),
        "total_price": trip.total_price,
        "outbound_flight": trip.outbound,
        "return_flight": trip.inbound,
        "search_request": favorite.search_request,
        "is_archived": favorite.archived,
        "is_available": favorite.is_still_valid,
        "last_availability_check": favorite.last_checked,
    })
}
