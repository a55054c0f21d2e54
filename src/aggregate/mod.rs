//! Statistics over (possibly filtered) patient record sequences.
//!
//! Every computation here is a pure function over a record slice. Field
//! selection is strongly typed through [`NumericField`] and
//! [`CategoricalField`]; there is no string-keyed column lookup. The
//! statistics that are undefined on empty input (mean, mode, correlation,
//! describe, histogram) fail with `EmptyInput`; the counting aggregates
//! (`group_mean`, `value_counts`) return empty collections instead.

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::models::PatientRecord;

/// Numeric fields a statistic can be computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericField {
    Age,
    Satisfaction,
    LengthOfStay,
}

impl NumericField {
    /// Value of this field for one record
    #[must_use]
    pub fn value_of(self, record: &PatientRecord) -> f64 {
        match self {
            Self::Age => f64::from(record.age),
            Self::Satisfaction => f64::from(record.satisfaction),
            Self::LengthOfStay => record.length_of_stay() as f64,
        }
    }

    /// Field name for error messages
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Satisfaction => "satisfaction",
            Self::LengthOfStay => "length_of_stay",
        }
    }
}

/// Categorical fields a statistic can group or count by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoricalField {
    Service,
    AgeGroup,
}

impl CategoricalField {
    /// Value of this field for one record
    #[must_use]
    pub fn value_of(self, record: &PatientRecord) -> String {
        match self {
            Self::Service => record.service.clone(),
            Self::AgeGroup => record.age_group().label().to_string(),
        }
    }
}

/// Mean of a group together with its label and member count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
    pub label: String,
    pub mean: f64,
    pub count: usize,
}

/// Occurrence count of one distinct value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Descriptive statistics of a numeric field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n-1 divisor); 0.0 for a single element
    pub std_dev: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// One equal-width histogram bin
///
/// Bins are half-open `[lower, upper)` except the last, which is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Arithmetic mean of a numeric field
pub fn mean(records: &[PatientRecord], field: NumericField) -> Result<f64> {
    if records.is_empty() {
        return Err(AnalyticsError::EmptyInput {
            statistic: "mean",
        });
    }
    let sum: f64 = records.iter().map(|r| field.value_of(r)).sum();
    Ok(sum / records.len() as f64)
}

/// Most frequent value of a categorical field
///
/// Ties break toward the value that occurs first in the input.
pub fn mode(records: &[PatientRecord], field: CategoricalField) -> Result<String> {
    if records.is_empty() {
        return Err(AnalyticsError::EmptyInput {
            statistic: "mode",
        });
    }
    let mut counts: FxHashMap<String, (usize, usize)> = FxHashMap::default();
    for (i, record) in records.iter().enumerate() {
        let entry = counts.entry(field.value_of(record)).or_insert((0, i));
        entry.0 += 1;
    }
    let (value, _) = counts
        .into_iter()
        .min_by_key(|(_, (count, first_seen))| (std::cmp::Reverse(*count), *first_seen))
        .ok_or(AnalyticsError::EmptyInput { statistic: "mode" })?;
    Ok(value)
}

/// Mean of a numeric field within each observed group
///
/// Only groups present in the input appear; ordering is by descending
/// mean, then ascending label. Empty input yields an empty vector.
#[must_use]
pub fn group_mean(
    records: &[PatientRecord],
    group: CategoricalField,
    value: NumericField,
) -> Vec<GroupMean> {
    let mut sums: FxHashMap<String, (f64, usize)> = FxHashMap::default();
    for record in records {
        let entry = sums.entry(group.value_of(record)).or_insert((0.0, 0));
        entry.0 += value.value_of(record);
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(label, (sum, count))| GroupMean {
            label,
            mean: sum / count as f64,
            count,
        })
        .sorted_by(|a, b| {
            b.mean
                .total_cmp(&a.mean)
                .then_with(|| a.label.cmp(&b.label))
        })
        .collect()
}

/// Pearson correlation coefficient between two numeric fields
///
/// Returns `Ok(None)` when either field has zero variance; the
/// coefficient is undefined there, never zero. Symmetric in its field
/// arguments and within [-1, 1] whenever defined.
pub fn pearson_correlation(
    records: &[PatientRecord],
    a: NumericField,
    b: NumericField,
) -> Result<Option<f64>> {
    if records.is_empty() {
        return Err(AnalyticsError::EmptyInput {
            statistic: "correlation",
        });
    }
    let n = records.len() as f64;
    let mean_a = records.iter().map(|r| a.value_of(r)).sum::<f64>() / n;
    let mean_b = records.iter().map(|r| b.value_of(r)).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for record in records {
        let da = a.value_of(record) - mean_a;
        let db = b.value_of(record) - mean_b;
        covariance += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return Ok(None);
    }
    Ok(Some(covariance / (var_a.sqrt() * var_b.sqrt())))
}

/// Descriptive statistics of a numeric field
pub fn describe(records: &[PatientRecord], field: NumericField) -> Result<Describe> {
    if records.is_empty() {
        return Err(AnalyticsError::EmptyInput {
            statistic: "describe",
        });
    }
    let mut values: Vec<f64> = records.iter().map(|r| field.value_of(r)).collect();
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std_dev = sample_std_dev(&values, mean);

    Ok(Describe {
        count,
        mean,
        std_dev,
        min: values[0],
        p25: percentile(&values, 25.0),
        p50: percentile(&values, 50.0),
        p75: percentile(&values, 75.0),
        max: values[count - 1],
    })
}

/// Occurrence counts of a categorical field's distinct values
///
/// Ordered by descending count, then ascending value. Empty input yields
/// an empty vector.
#[must_use]
pub fn value_counts(records: &[PatientRecord], field: CategoricalField) -> Vec<ValueCount> {
    let mut counts: FxHashMap<String, usize> = FxHashMap::default();
    for record in records {
        *counts.entry(field.value_of(record)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .sorted_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.value.cmp(&b.value))
        })
        .collect()
}

/// Equal-width histogram of a numeric field over the observed span
///
/// A degenerate span (all values equal) is widened by half a unit on each
/// side so the single bin still has positive width.
pub fn histogram(
    records: &[PatientRecord],
    field: NumericField,
    bin_count: usize,
) -> Result<Vec<HistogramBin>> {
    if bin_count == 0 {
        return Err(AnalyticsError::InvalidFilter(
            "histogram bin count must be positive".to_string(),
        ));
    }
    if records.is_empty() {
        return Err(AnalyticsError::EmptyInput {
            statistic: "histogram",
        });
    }
    let values: Vec<f64> = records.iter().map(|r| field.value_of(r)).collect();
    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bin_count as f64;

    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for value in values {
        let index = (((value - min) / width) as usize).min(bin_count - 1);
        bins[index].count += 1;
    }
    Ok(bins)
}

/// Sample standard deviation with the n-1 divisor; 0.0 for fewer than
/// two values
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Linear-interpolation percentile over sorted values
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let fraction = rank - lower as f64;
    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}
