// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Weekly tracking record model for storage.

use serde::{Deserialize, Serialize};

/// Document-key prefix for tracking records ("sem-" + week number).
///
/// Kept from the original deployment so existing documents stay readable.
pub const WEEK_KEY_PREFIX: &str = "sem-";

/// One user's measurement for a given week, stored in Firestore at
/// `users/{uid}/tracking/{sem-week}`.
///
/// At most one record exists per week; re-submitting a week overwrites
/// the document in place. Records are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRecord {
    /// Week number, starting at 1, assigned as count-of-records + 1
    pub week: u32,
    /// Measured weight in kilograms
    pub weight_kg: f64,
    /// Measurement date (ISO 8601 `YYYY-MM-DD`)
    pub date: String,
    /// Derived BMI at the standard height, 2 decimals
    pub bmi: f64,
    /// Derived weekly dose in milligrams
    pub dose_mg: f64,
    /// Last write timestamp (RFC3339)
    pub updated_at: String,
}

impl TrackingRecord {
    /// Document ID for a given week.
    pub fn doc_id(week: u32) -> String {
        format!("{}{}", WEEK_KEY_PREFIX, week)
    }
}

/// Sort records ascending by week (history/chart order).
pub fn sort_history(records: &mut [TrackingRecord]) {
    records.sort_by_key(|r| r.week);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(week: u32) -> TrackingRecord {
        TrackingRecord {
            week,
            weight_kg: 90.0,
            date: "2026-01-05".to_string(),
            bmi: 33.06,
            dose_mg: 2.5,
            updated_at: "2026-01-05T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_doc_id_format() {
        assert_eq!(TrackingRecord::doc_id(1), "sem-1");
        assert_eq!(TrackingRecord::doc_id(12), "sem-12");
    }

    #[test]
    fn test_sort_history_ascending() {
        let mut records = vec![record(3), record(1), record(2)];
        sort_history(&mut records);
        let weeks: Vec<u32> = records.iter().map(|r| r.week).collect();
        assert_eq!(weeks, vec![1, 2, 3]);
    }

    #[test]
    fn test_serializes_with_camel_case_field_names() {
        let json = serde_json::to_value(record(1)).unwrap();
        assert!(json.get("weightKg").is_some());
        assert!(json.get("doseMg").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
