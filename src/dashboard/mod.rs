//! The dashboard pipeline: one full filter-then-aggregate pass per
//! interaction, producing the view model the presentation layer renders.
//!
//! `render` is the explicit entry point the presentation layer calls on
//! every state change. There is no incremental model; each call
//! recomputes everything from the immutable record snapshot. An empty
//! filtered view is a degraded-but-valid outcome (`None` metrics, empty
//! vectors), never an error.

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    self, CategoricalField, Describe, GroupMean, HistogramBin, NumericField, ValueCount,
};
use crate::error::Result;
use crate::filter::{self, FilterCriteria};
use crate::models::{AgeGroup, PatientRecord};

/// Number of bins in the demographics age histogram
const AGE_HISTOGRAM_BINS: usize = 20;

/// Echo of the active criteria with the service set sorted for
/// deterministic output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaView {
    pub services: Vec<String>,
    pub age_min: u32,
    pub age_max: u32,
    pub min_satisfaction: u32,
    pub name_substring: Option<String>,
}

impl From<&FilterCriteria> for CriteriaView {
    fn from(criteria: &FilterCriteria) -> Self {
        Self {
            services: criteria.services.iter().cloned().sorted().collect(),
            age_min: criteria.age_min,
            age_max: criteria.age_max,
            min_satisfaction: criteria.min_satisfaction,
            name_substring: criteria.name_substring.clone(),
        }
    }
}

/// Headline metrics of the overview tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewMetrics {
    pub average_satisfaction: f64,
    pub average_stay_days: f64,
    pub patient_count: usize,
    pub most_common_service: String,
}

/// Highest/lowest pair rendered as the overview insight line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInsight {
    pub highest_service: String,
    pub highest_mean: f64,
    pub lowest_service: String,
    pub lowest_mean: f64,
}

/// Per-service satisfaction bars plus the insight pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSatisfactionView {
    /// Bars in descending-mean order
    pub bars: Vec<GroupMean>,
    /// Absent when the filtered view is empty
    pub insight: Option<ServiceInsight>,
}

/// One point of the stay/satisfaction scatter plot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub stay_days: i64,
    pub satisfaction: u32,
}

/// Sign classification of the correlation, for the trend message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationTrend {
    Positive,
    Negative,
    Neutral,
    /// No data or zero variance in either field
    Undefined,
}

/// The stay/satisfaction correlation tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StayCorrelationView {
    pub points: Vec<ScatterPoint>,
    /// `None` when the coefficient is undefined
    pub coefficient: Option<f64>,
    pub trend: CorrelationTrend,
}

/// The demographics tab: age histogram plus the age-group trend line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicsView {
    pub age_histogram: Vec<HistogramBin>,
    /// Per-age-group mean satisfaction in fixed bucket order
    pub age_group_satisfaction: Vec<GroupMean>,
}

/// One row of the detail table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRow {
    pub patient_id: String,
    pub name: Option<String>,
    pub age: u32,
    pub service: String,
    pub length_of_stay: i64,
    pub satisfaction: u32,
}

impl From<&PatientRecord> for DetailRow {
    fn from(record: &PatientRecord) -> Self {
        Self {
            patient_id: record.patient_id.clone(),
            name: record.name.clone(),
            age: record.age,
            service: record.service.clone(),
            length_of_stay: record.length_of_stay(),
            satisfaction: record.satisfaction,
        }
    }
}

/// Everything the presentation layer needs for one render pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardViewModel {
    pub criteria: CriteriaView,
    pub total_records: usize,
    pub matching_records: usize,
    /// `None` when the filtered view is empty
    pub overview: Option<OverviewMetrics>,
    pub service_satisfaction: ServiceSatisfactionView,
    pub stay_correlation: StayCorrelationView,
    pub demographics: DemographicsView,
    pub table: Vec<DetailRow>,
    pub service_counts: Vec<ValueCount>,
    /// `None` when the filtered view is empty
    pub satisfaction_summary: Option<Describe>,
}

impl DashboardViewModel {
    /// Serialize for a machine consumer
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text rendering for the CLI
    #[must_use]
    pub fn summary_text(&self) -> String {
        let mut summary = String::new();
        summary.push_str("Patient Visit Dashboard:\n");
        summary.push_str(&format!(
            "  Matching Records: {} of {}\n",
            self.matching_records, self.total_records
        ));

        match &self.overview {
            Some(overview) => {
                summary.push_str(&format!(
                    "  Average Satisfaction: {:.1}\n",
                    overview.average_satisfaction
                ));
                summary.push_str(&format!(
                    "  Average Stay: {:.1} days\n",
                    overview.average_stay_days
                ));
                summary.push_str(&format!(
                    "  Most Common Service: {}\n",
                    overview.most_common_service
                ));
            }
            None => summary.push_str("  No records match the current filters.\n"),
        }

        if !self.service_satisfaction.bars.is_empty() {
            summary.push_str("\nSatisfaction by Service:\n");
            for bar in &self.service_satisfaction.bars {
                summary.push_str(&format!(
                    "  {}: {:.1} ({} patients)\n",
                    bar.label, bar.mean, bar.count
                ));
            }
        }
        if let Some(insight) = &self.service_satisfaction.insight {
            summary.push_str(&format!(
                "  Highest: {} ({:.1}), lowest: {} ({:.1})\n",
                insight.highest_service,
                insight.highest_mean,
                insight.lowest_service,
                insight.lowest_mean
            ));
        }

        summary.push_str("\nStay/Satisfaction Correlation: ");
        match self.stay_correlation.coefficient {
            Some(r) => summary.push_str(&format!("{r:.3}")),
            None => summary.push_str("undefined"),
        }
        let trend_message = match self.stay_correlation.trend {
            CorrelationTrend::Positive => "longer stays tend toward higher satisfaction",
            CorrelationTrend::Negative => "longer stays tend toward lower satisfaction",
            CorrelationTrend::Neutral => "no clear relationship",
            CorrelationTrend::Undefined => "not enough variation to tell",
        };
        summary.push_str(&format!(" ({trend_message})\n"));

        if !self.demographics.age_group_satisfaction.is_empty() {
            summary.push_str("\nSatisfaction by Age Group:\n");
            for group in &self.demographics.age_group_satisfaction {
                summary.push_str(&format!("  {}: {:.1}\n", group.label, group.mean));
            }
        }

        if !self.service_counts.is_empty() {
            summary.push_str("\nService Distribution:\n");
            for entry in &self.service_counts {
                summary.push_str(&format!("  {}: {}\n", entry.value, entry.count));
            }
        }

        if let Some(stats) = &self.satisfaction_summary {
            summary.push_str("\nSatisfaction Statistics:\n");
            summary.push_str(&format!("  count: {}\n", stats.count));
            summary.push_str(&format!("  mean: {:.2}\n", stats.mean));
            summary.push_str(&format!("  std: {:.2}\n", stats.std_dev));
            summary.push_str(&format!(
                "  min/p25/p50/p75/max: {:.0}/{:.1}/{:.1}/{:.1}/{:.0}\n",
                stats.min, stats.p25, stats.p50, stats.p75, stats.max
            ));
        }

        summary
    }
}

/// Run one full pipeline pass: filter the snapshot, then compute every
/// aggregate the dashboard renders
pub fn render(records: &[PatientRecord], criteria: &FilterCriteria) -> Result<DashboardViewModel> {
    let filtered = filter::apply(records, criteria)?;
    debug!(
        "Rendering dashboard over {} matching records",
        filtered.len()
    );

    let overview = overview_metrics(&filtered)?;
    let service_satisfaction = service_satisfaction_view(&filtered);
    let stay_correlation = stay_correlation_view(&filtered)?;
    let demographics = demographics_view(&filtered)?;

    let satisfaction_summary = if filtered.is_empty() {
        None
    } else {
        Some(aggregate::describe(&filtered, NumericField::Satisfaction)?)
    };

    Ok(DashboardViewModel {
        criteria: CriteriaView::from(criteria),
        total_records: records.len(),
        matching_records: filtered.len(),
        overview,
        service_satisfaction,
        stay_correlation,
        demographics,
        table: filtered.iter().map(DetailRow::from).collect(),
        service_counts: aggregate::value_counts(&filtered, CategoricalField::Service),
        satisfaction_summary,
    })
}

fn overview_metrics(filtered: &[PatientRecord]) -> Result<Option<OverviewMetrics>> {
    if filtered.is_empty() {
        return Ok(None);
    }
    Ok(Some(OverviewMetrics {
        average_satisfaction: aggregate::mean(filtered, NumericField::Satisfaction)?,
        average_stay_days: aggregate::mean(filtered, NumericField::LengthOfStay)?,
        patient_count: filtered.len(),
        most_common_service: aggregate::mode(filtered, CategoricalField::Service)?,
    }))
}

fn service_satisfaction_view(filtered: &[PatientRecord]) -> ServiceSatisfactionView {
    let bars = aggregate::group_mean(
        filtered,
        CategoricalField::Service,
        NumericField::Satisfaction,
    );
    // Bars are in descending-mean order, so the insight pair is the ends.
    let insight = match (bars.first(), bars.last()) {
        (Some(first), Some(last)) => Some(ServiceInsight {
            highest_service: first.label.clone(),
            highest_mean: first.mean,
            lowest_service: last.label.clone(),
            lowest_mean: last.mean,
        }),
        _ => None,
    };
    ServiceSatisfactionView { bars, insight }
}

fn stay_correlation_view(filtered: &[PatientRecord]) -> Result<StayCorrelationView> {
    let points = filtered
        .iter()
        .map(|r| ScatterPoint {
            stay_days: r.length_of_stay(),
            satisfaction: r.satisfaction,
        })
        .collect();

    let coefficient = if filtered.is_empty() {
        None
    } else {
        aggregate::pearson_correlation(
            filtered,
            NumericField::LengthOfStay,
            NumericField::Satisfaction,
        )?
    };
    let trend = match coefficient {
        Some(r) if r > 0.0 => CorrelationTrend::Positive,
        Some(r) if r < 0.0 => CorrelationTrend::Negative,
        Some(_) => CorrelationTrend::Neutral,
        None => CorrelationTrend::Undefined,
    };

    Ok(StayCorrelationView {
        points,
        coefficient,
        trend,
    })
}

fn demographics_view(filtered: &[PatientRecord]) -> Result<DemographicsView> {
    let age_histogram = if filtered.is_empty() {
        Vec::new()
    } else {
        aggregate::histogram(filtered, NumericField::Age, AGE_HISTOGRAM_BINS)?
    };

    // The trend line wants fixed bucket order, not the descending-mean
    // order group_mean produces.
    let age_group_satisfaction = aggregate::group_mean(
        filtered,
        CategoricalField::AgeGroup,
        NumericField::Satisfaction,
    )
    .into_iter()
    .sorted_by_key(|g| {
        AgeGroup::ALL
            .iter()
            .position(|bucket| bucket.label() == g.label)
            .unwrap_or(usize::MAX)
    })
    .collect();

    Ok(DemographicsView {
        age_histogram,
        age_group_satisfaction,
    })
}
