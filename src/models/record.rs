//! The patient visit record and its derived values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::age_group::AgeGroup;

/// One patient visit, as loaded from the CSV source
///
/// Derived values (`length_of_stay`, `age_group`) are methods, never stored
/// fields, so they can never drift out of sync with the fields they are
/// computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Unique identifier, format-preserving for export
    pub patient_id: String,
    /// Patient name; an empty field in the source loads as `None`
    pub name: Option<String>,
    /// Age in whole years
    pub age: u32,
    /// Hospital service the visit belongs to
    pub service: String,
    /// Date of arrival
    pub arrival_date: NaiveDate,
    /// Date of departure, never before `arrival_date`
    pub departure_date: NaiveDate,
    /// Satisfaction score in the 0-100 domain
    pub satisfaction: u32,
}

impl PatientRecord {
    /// Length of stay in whole days
    ///
    /// Non-negative for any record that passed loading, since the store
    /// rejects departures that precede arrivals.
    #[must_use]
    pub fn length_of_stay(&self) -> i64 {
        (self.departure_date - self.arrival_date).num_days()
    }

    /// Age bucket for the demographics views
    #[must_use]
    pub const fn age_group(&self) -> AgeGroup {
        AgeGroup::from_age(self.age)
    }

    /// Case-insensitive substring match against the patient name
    ///
    /// Records without a name never match a non-empty term.
    #[must_use]
    pub fn name_contains(&self, term: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(&term.to_lowercase()))
    }
}

/// Facts about a loaded dataset that the presentation layer needs to build
/// its filter widgets: the explicit full service set and the observed spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Total record count
    pub record_count: usize,
    /// Sorted distinct service values
    pub services: Vec<String>,
    /// Youngest observed age (0 for an empty dataset)
    pub age_min: u32,
    /// Oldest observed age (0 for an empty dataset)
    pub age_max: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(arrival: &str, departure: &str) -> PatientRecord {
        PatientRecord {
            patient_id: "P0001".to_string(),
            name: Some("Alice Larsen".to_string()),
            age: 34,
            service: "Cardiology".to_string(),
            arrival_date: arrival.parse().unwrap(),
            departure_date: departure.parse().unwrap(),
            satisfaction: 80,
        }
    }

    #[test]
    fn length_of_stay_is_day_difference() {
        assert_eq!(record("2024-03-01", "2024-03-06").length_of_stay(), 5);
        assert_eq!(record("2024-03-01", "2024-03-01").length_of_stay(), 0);
    }

    #[test]
    fn name_match_is_case_insensitive() {
        let rec = record("2024-03-01", "2024-03-02");
        assert!(rec.name_contains("larsen"));
        assert!(rec.name_contains("ALICE"));
        assert!(!rec.name_contains("bob"));
    }

    #[test]
    fn missing_name_never_matches() {
        let mut rec = record("2024-03-01", "2024-03-02");
        rec.name = None;
        assert!(!rec.name_contains("alice"));
    }
}
