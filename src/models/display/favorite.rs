//! Favorite and trip display models

use serde::Serialize;
use tabled::Tabled;

use super::common::format_flight;
use crate::client::models::{SavedFavorite, Trip};
use crate::output::formatters::{format_price, format_timestamp_local};

/// Favorite display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct FavoriteDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "DEST")]
    pub destination: String,

    #[tabled(rename = "OUTBOUND")]
    pub outbound: String,

    #[tabled(rename = "RETURN")]
    pub inbound: String,

    #[tabled(rename = "TOTAL")]
    pub total: String,

    /// available, unavailable or archived
    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "CHECKED")]
    pub last_checked: String,
}

impl From<&SavedFavorite> for FavoriteDisplay {
    fn from(favorite: &SavedFavorite) -> Self {
        let status = if favorite.archived {
            "archived"
        } else if favorite.is_still_valid {
            "available"
        } else {
            "unavailable"
        };
        Self {
            id: favorite.id.clone(),
            destination: favorite.trip.destination_code.clone(),
            outbound: format_flight(&favorite.trip.outbound),
            inbound: format_flight(&favorite.trip.inbound),
            total: format_price(favorite.trip.total_price, &favorite.trip.outbound.currency),
            status: status.to_string(),
            last_checked: format_timestamp_local(favorite.last_checked),
        }
    }
}

impl From<SavedFavorite> for FavoriteDisplay {
    fn from(favorite: SavedFavorite) -> Self {
        Self::from(&favorite)
    }
}

/// A trip from search results
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct TripDisplay {
    #[tabled(rename = "DEST")]
    pub destination: String,

    #[tabled(rename = "CITY")]
    pub city: String,

    #[tabled(rename = "OUTBOUND")]
    pub outbound: String,

    #[tabled(rename = "RETURN")]
    pub inbound: String,

    #[tabled(rename = "TOTAL")]
    pub total: String,
}

impl From<&Trip> for TripDisplay {
    fn from(trip: &Trip) -> Self {
        Self {
            destination: trip.destination_code.clone(),
            city: trip.outbound.destination_full.clone(),
            outbound: format_flight(&trip.outbound),
            inbound: format_flight(&trip.inbound),
            total: format_price(trip.total_price, &trip.outbound.currency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::{Flight, ScanRequest};
    use chrono::Utc;

    fn favorite() -> SavedFavorite {
        SavedFavorite {
            id: "f1".to_string(),
            trip: Trip {
                outbound: Flight {
                    flight_number: "FR1".to_string(),
                    origin: "BVA".to_string(),
                    destination: "LIS".to_string(),
                    destination_full: "Lisbon".to_string(),
                    departure_time: "2025-03-01T07:00:00Z".to_string(),
                    currency: "EUR".to_string(),
                    ..Default::default()
                },
                inbound: Flight {
                    flight_number: "FR2".to_string(),
                    origin: "LIS".to_string(),
                    destination: "BVA".to_string(),
                    departure_time: "2025-03-04T20:30:00Z".to_string(),
                    ..Default::default()
                },
                total_price: 58.0,
                destination_code: "LIS".to_string(),
            },
            search_request: ScanRequest::default(),
            created_at: Utc::now(),
            last_checked: None,
            is_still_valid: true,
            archived: false,
        }
    }

    #[test]
    fn test_favorite_display() {
        let display = FavoriteDisplay::from(favorite());

        assert_eq!(display.destination, "LIS");
        assert_eq!(display.outbound, "FR1 BVA→LIS 2025-03-01 07:00");
        assert_eq!(display.total, "58.00 EUR");
        assert_eq!(display.status, "available");
    }

    #[test]
    fn test_favorite_status() {
        let mut fav = favorite();
        fav.is_still_valid = false;
        assert_eq!(FavoriteDisplay::from(&fav).status, "unavailable");
        fav.archived = true;
        assert_eq!(FavoriteDisplay::from(&fav).status, "archived");
    }

    #[test]
    fn test_trip_display() {
        let display = TripDisplay::from(&favorite().trip);
        assert_eq!(display.city, "Lisbon");
        assert_eq!(display.inbound, "FR2 LIS→BVA 2025-03-04 20:30");
    }
}
