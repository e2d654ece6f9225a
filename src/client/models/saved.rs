//! Saved searches, favorites and their partial updates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ScanRequest, Trip};

/// A named, reusable search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    pub id: String,
    pub name: String,
    pub request: ScanRequest,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default)]
    pub auto_check_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_check_interval_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check_results: Option<Vec<Trip>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl SavedSearch {
    /// Whether an enabled auto-check should run at `now`.
    ///
    /// A search that was never checked is always due. An interval too large
    /// to represent is never due.
    pub fn is_due(&self, now: DateTime<Utc>, default_interval: u64) -> bool {
        if !self.auto_check_enabled {
            return false;
        }
        let interval = self.auto_check_interval_seconds.unwrap_or(default_interval);
        let Some(last) = self.last_checked_at else {
            return true;
        };
        i64::try_from(interval)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|interval| last.checked_add_signed(interval))
            .is_some_and(|next| next <= now)
    }
}

/// A trip the user marked as favorite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFavorite {
    pub id: String,
    pub trip: Trip,
    #[serde(default)]
    pub search_request: ScanRequest,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_still_valid: bool,
    #[serde(default)]
    pub archived: bool,
}

fn default_true() -> bool {
    true
}

/// Trips found by the latest check of a search, kept until dismissed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResult {
    pub search_id: String,
    pub search_name: String,
    pub trips: Vec<Trip>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_test: bool,
}

/// Partial update of a `saved_searches` row.
///
/// Serializes to database column names; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub times_used: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_check_enabled: Option<bool>,
    #[serde(rename = "check_interval_seconds", skip_serializing_if = "Option::is_none")]
    pub check_interval_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check_results: Option<Vec<Trip>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl SearchPatch {
    /// Apply the same change to a local copy
    pub fn apply(&self, search: &mut SavedSearch) {
        if let Some(at) = self.last_used {
            search.last_used = Some(at);
        }
        if let Some(enabled) = self.auto_check_enabled {
            search.auto_check_enabled = enabled;
        }
        if let Some(interval) = self.check_interval_seconds {
            search.auto_check_interval_seconds = Some(interval);
        }
        if let Some(results) = &self.last_check_results {
            search.last_check_results = Some(results.clone());
        }
        if let Some(at) = self.last_checked_at {
            search.last_checked_at = Some(at);
        }
    }
}

/// Partial update of a `favorites` row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FavoritePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_availability_check: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
}

impl FavoritePatch {
    pub fn apply(&self, favorite: &mut SavedFavorite) {
        if let Some(available) = self.is_available {
            favorite.is_still_valid = available;
        }
        if let Some(at) = self.last_availability_check {
            favorite.last_checked = Some(at);
        }
        if let Some(archived) = self.is_archived {
            favorite.archived = archived;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn search() -> SavedSearch {
        SavedSearch {
            id: "s1".to_string(),
            name: "Weekend".to_string(),
            request: ScanRequest::default(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            last_used: None,
            auto_check_enabled: true,
            auto_check_interval_seconds: Some(600),
            last_check_results: None,
            last_checked_at: None,
        }
    }

    #[test]
    fn test_search_wire_names() {
        let json = serde_json::to_value(search()).unwrap();
        assert_eq!(json["createdAt"], "2025-01-01T00:00:00Z");
        assert_eq!(json["autoCheckEnabled"], true);
        assert_eq!(json["autoCheckIntervalSeconds"], 600);
        assert!(json.get("lastUsed").is_none());
    }

    #[test]
    fn test_is_due() {
        let mut s = search();
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 12, 0, 0).unwrap();
        assert!(s.is_due(now, 3600), "never checked");

        s.last_checked_at = Some(now - chrono::Duration::seconds(599));
        assert!(!s.is_due(now, 3600));

        s.last_checked_at = Some(now - chrono::Duration::seconds(600));
        assert!(s.is_due(now, 3600));

        s.auto_check_enabled = false;
        assert!(!s.is_due(now, 3600));
    }

    #[test]
    fn test_is_due_with_huge_interval_is_never_due() {
        let mut s = search();
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 12, 0, 0).unwrap();
        s.last_checked_at = Some(now);

        for interval in [u64::MAX, u64::MAX / 2, i64::MAX as u64, 400_000_000_000] {
            s.auto_check_interval_seconds = Some(interval);
            assert!(!s.is_due(now, 3600), "interval {}", interval);
        }
    }

    #[test]
    fn test_search_patch_serializes_columns() {
        let patch = SearchPatch {
            auto_check_enabled: Some(true),
            check_interval_seconds: Some(900),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"auto_check_enabled": true, "check_interval_seconds": 900}));

        let mut s = search();
        s.auto_check_enabled = false;
        patch.apply(&mut s);
        assert!(s.auto_check_enabled);
        assert_eq!(s.auto_check_interval_seconds, Some(900));
    }

    #[test]
    fn test_favorite_defaults_when_flags_missing() {
        let json = r#"{
            "id": "1700000000000",
            "trip": {"aller": {}, "retour": {}, "prix_total": 0, "destination_code": "BCN"},
            "createdAt": "2025-01-01T00:00:00.000Z"
        }"#;
        let fav: SavedFavorite = serde_json::from_str(json).unwrap();
        assert!(fav.is_still_valid);
        assert!(!fav.archived);
        assert!(fav.search_request.outbound_dates.is_empty());
    }
}
