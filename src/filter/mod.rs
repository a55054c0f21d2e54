//! Filtering of patient records by user-selected criteria.
//!
//! Criteria compile into a conjunction of small predicate objects, each
//! implementing [`RecordFilter`]. Filtering is pure, order-preserving and
//! idempotent; an empty result is a valid outcome, not an error.

use std::collections::HashSet;
use std::fmt::Debug;

use log::debug;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::models::{DatasetSummary, PatientRecord};

/// A predicate over a single patient record
pub trait RecordFilter: Debug {
    /// Whether the record passes this predicate
    fn matches(&self, record: &PatientRecord) -> bool;

    /// Record fields this predicate reads
    fn required_fields(&self) -> HashSet<String>;
}

/// Passes records whose service is in the allowed set
///
/// An empty set passes nothing; "all services" must be the explicit full
/// set, never an empty sentinel.
#[derive(Debug, Clone)]
pub struct ServiceFilter {
    allowed: FxHashSet<String>,
}

impl RecordFilter for ServiceFilter {
    fn matches(&self, record: &PatientRecord) -> bool {
        self.allowed.contains(&record.service)
    }

    fn required_fields(&self) -> HashSet<String> {
        HashSet::from(["service".to_string()])
    }
}

/// Passes records whose age lies within inclusive bounds
#[derive(Debug, Clone)]
pub struct AgeRangeFilter {
    min: u32,
    max: u32,
}

impl RecordFilter for AgeRangeFilter {
    fn matches(&self, record: &PatientRecord) -> bool {
        record.age >= self.min && record.age <= self.max
    }

    fn required_fields(&self) -> HashSet<String> {
        HashSet::from(["age".to_string()])
    }
}

/// Passes records at or above an inclusive satisfaction floor
///
/// A floor above 100 is valid criteria; it simply matches nothing.
#[derive(Debug, Clone)]
pub struct SatisfactionFloorFilter {
    floor: u32,
}

impl RecordFilter for SatisfactionFloorFilter {
    fn matches(&self, record: &PatientRecord) -> bool {
        record.satisfaction >= self.floor
    }

    fn required_fields(&self) -> HashSet<String> {
        HashSet::from(["satisfaction".to_string()])
    }
}

/// Passes records whose name contains a term, case-insensitively
///
/// Records without a name never pass.
#[derive(Debug, Clone)]
pub struct NameSearchFilter {
    term: String,
}

impl RecordFilter for NameSearchFilter {
    fn matches(&self, record: &PatientRecord) -> bool {
        record.name_contains(&self.term)
    }

    fn required_fields(&self) -> HashSet<String> {
        HashSet::from(["name".to_string()])
    }
}

/// Logical AND of a list of predicates
#[derive(Debug)]
pub struct AndFilter {
    filters: Vec<Box<dyn RecordFilter>>,
}

impl AndFilter {
    #[must_use]
    pub fn new(filters: Vec<Box<dyn RecordFilter>>) -> Self {
        Self { filters }
    }
}

impl RecordFilter for AndFilter {
    fn matches(&self, record: &PatientRecord) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }

    fn required_fields(&self) -> HashSet<String> {
        self.filters
            .iter()
            .flat_map(|f| f.required_fields())
            .collect()
    }
}

/// The set of active filter parameters for one interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Allowed service values; a record passes iff its service is a member
    pub services: FxHashSet<String>,
    /// Inclusive lower age bound
    pub age_min: u32,
    /// Inclusive upper age bound
    pub age_max: u32,
    /// Inclusive satisfaction floor
    pub min_satisfaction: u32,
    /// Optional case-insensitive name search term; `None` or empty means
    /// no name filtering
    pub name_substring: Option<String>,
}

impl FilterCriteria {
    /// Criteria that pass every record of the summarized dataset: the
    /// explicit full service set, the observed age span, a zero floor and
    /// no search term
    #[must_use]
    pub fn allowing_all(summary: &DatasetSummary) -> Self {
        Self {
            services: summary.services.iter().cloned().collect(),
            age_min: summary.age_min,
            age_max: summary.age_max,
            min_satisfaction: 0,
            name_substring: None,
        }
    }

    /// Create a builder for assembling criteria piece by piece
    #[must_use]
    pub fn builder() -> FilterCriteriaBuilder {
        FilterCriteriaBuilder::new()
    }

    /// Copy of these criteria narrowed by a name search term
    ///
    /// Search composes with the base criteria, it never replaces them.
    #[must_use]
    pub fn with_search(&self, term: impl Into<String>) -> Self {
        let mut criteria = self.clone();
        let term = term.into();
        criteria.name_substring = if term.is_empty() { None } else { Some(term) };
        criteria
    }

    /// Check bound consistency
    pub fn validate(&self) -> Result<()> {
        if self.age_min > self.age_max {
            return Err(AnalyticsError::InvalidFilter(format!(
                "age_min {} exceeds age_max {}",
                self.age_min, self.age_max
            )));
        }
        Ok(())
    }

    /// Compile the criteria into a conjunction of predicates
    pub fn compile(&self) -> Result<AndFilter> {
        self.validate()?;
        let mut filters: Vec<Box<dyn RecordFilter>> = vec![
            Box::new(ServiceFilter {
                allowed: self.services.clone(),
            }),
            Box::new(AgeRangeFilter {
                min: self.age_min,
                max: self.age_max,
            }),
            Box::new(SatisfactionFloorFilter {
                floor: self.min_satisfaction,
            }),
        ];
        if let Some(term) = self.name_substring.as_deref()
            && !term.is_empty()
        {
            filters.push(Box::new(NameSearchFilter {
                term: term.to_string(),
            }));
        }
        Ok(AndFilter::new(filters))
    }
}

/// Builder for constructing filter criteria
#[derive(Debug, Clone, Default)]
pub struct FilterCriteriaBuilder {
    services: FxHashSet<String>,
    age_min: u32,
    age_max: u32,
    min_satisfaction: u32,
    name_substring: Option<String>,
}

impl FilterCriteriaBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            age_max: u32::MAX,
            ..Self::default()
        }
    }

    /// Set the allowed service set
    #[must_use]
    pub fn services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services = services.into_iter().map(Into::into).collect();
        self
    }

    /// Set the inclusive age bounds
    #[must_use]
    pub fn age_range(mut self, min: u32, max: u32) -> Self {
        self.age_min = min;
        self.age_max = max;
        self
    }

    /// Set the inclusive satisfaction floor
    #[must_use]
    pub fn min_satisfaction(mut self, floor: u32) -> Self {
        self.min_satisfaction = floor;
        self
    }

    /// Set the name search term
    #[must_use]
    pub fn name_substring(mut self, term: impl Into<String>) -> Self {
        self.name_substring = Some(term.into());
        self
    }

    /// Build the criteria
    #[must_use]
    pub fn build(self) -> FilterCriteria {
        FilterCriteria {
            services: self.services,
            age_min: self.age_min,
            age_max: self.age_max,
            min_satisfaction: self.min_satisfaction,
            name_substring: self.name_substring,
        }
    }
}

/// Apply criteria to a record sequence
///
/// Pure and order-preserving; returns `Ok(vec![])` when nothing matches.
/// Fails only on invalid criteria (inverted age bounds).
pub fn apply(records: &[PatientRecord], criteria: &FilterCriteria) -> Result<Vec<PatientRecord>> {
    let conjunction = criteria.compile()?;
    let filtered: Vec<PatientRecord> = records
        .iter()
        .filter(|r| conjunction.matches(r))
        .cloned()
        .collect();
    debug!(
        "Filter pass kept {} of {} records",
        filtered.len(),
        records.len()
    );
    Ok(filtered)
}

/// Narrow an already-filtered view by a name search term
///
/// Case-insensitive; records without a name never match; an empty term
/// returns an unfiltered copy. This is the helper behind the detail table
/// and the download surface.
#[must_use]
pub fn search(records: &[PatientRecord], term: &str) -> Vec<PatientRecord> {
    if term.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| r.name_contains(term))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(service: &str, age: u32, satisfaction: u32) -> PatientRecord {
        PatientRecord {
            patient_id: "P0001".to_string(),
            name: Some("Test Patient".to_string()),
            age,
            service: service.to_string(),
            arrival_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            departure_date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            satisfaction,
        }
    }

    #[test]
    fn service_filter_requires_membership() {
        let filter = ServiceFilter {
            allowed: ["Cardiology".to_string()].into_iter().collect(),
        };
        assert!(filter.matches(&record("Cardiology", 40, 50)));
        assert!(!filter.matches(&record("Emergency", 40, 50)));
    }

    #[test]
    fn empty_service_set_passes_nothing() {
        let filter = ServiceFilter {
            allowed: FxHashSet::default(),
        };
        assert!(!filter.matches(&record("Cardiology", 40, 50)));
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let filter = AgeRangeFilter { min: 19, max: 35 };
        assert!(filter.matches(&record("A", 19, 50)));
        assert!(filter.matches(&record("A", 35, 50)));
        assert!(!filter.matches(&record("A", 18, 50)));
        assert!(!filter.matches(&record("A", 36, 50)));
    }

    #[test]
    fn conjunction_collects_required_fields() {
        let criteria = FilterCriteria::builder()
            .services(["Cardiology"])
            .age_range(0, 99)
            .name_substring("al")
            .build();
        let conjunction = criteria.compile().unwrap();
        let fields = conjunction.required_fields();
        for field in ["service", "age", "satisfaction", "name"] {
            assert!(fields.contains(field), "missing {field}");
        }
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let criteria = FilterCriteria::builder().age_range(50, 40).build();
        assert!(matches!(
            criteria.validate(),
            Err(AnalyticsError::InvalidFilter(_))
        ));
    }
}
