mod common;

use common::{record, scenario_records};
use visit_analytics::AnalyticsError;
use visit_analytics::aggregate::{self, CategoricalField, NumericField};

#[test]
fn mean_of_satisfaction() {
    let records = scenario_records();
    let mean = aggregate::mean(&records, NumericField::Satisfaction).unwrap();
    assert!((mean - 25.0).abs() < 1e-12);
}

#[test]
fn mean_of_empty_input_is_an_error() {
    assert!(matches!(
        aggregate::mean(&[], NumericField::Satisfaction),
        Err(AnalyticsError::EmptyInput { statistic: "mean" })
    ));
}

#[test]
fn mode_picks_the_most_frequent_service() {
    let records = scenario_records();
    assert_eq!(
        aggregate::mode(&records, CategoricalField::Service).unwrap(),
        "A"
    );
}

#[test]
fn mode_ties_break_toward_first_occurrence() {
    let records = vec![
        record("P1", None, 20, "Y", "2024-01-01", "2024-01-02", 50),
        record("P2", None, 21, "X", "2024-01-01", "2024-01-02", 50),
        record("P3", None, 22, "X", "2024-01-01", "2024-01-02", 50),
        record("P4", None, 23, "Y", "2024-01-01", "2024-01-02", 50),
    ];
    assert_eq!(
        aggregate::mode(&records, CategoricalField::Service).unwrap(),
        "Y"
    );
}

#[test]
fn group_mean_orders_by_descending_mean() {
    let records = scenario_records();
    let groups = aggregate::group_mean(
        &records,
        CategoricalField::Service,
        NumericField::Satisfaction,
    );

    let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["C", "B", "A"]);

    let a = groups.iter().find(|g| g.label == "A").unwrap();
    assert!((a.mean - 15.0).abs() < 1e-12);
    assert_eq!(a.count, 2);
}

#[test]
fn group_mean_ties_break_by_ascending_label() {
    let records = vec![
        record("P1", None, 20, "Beta", "2024-01-01", "2024-01-02", 50),
        record("P2", None, 21, "Alpha", "2024-01-01", "2024-01-02", 50),
    ];
    let groups = aggregate::group_mean(
        &records,
        CategoricalField::Service,
        NumericField::Satisfaction,
    );
    let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["Alpha", "Beta"]);
}

#[test]
fn group_mean_only_contains_observed_groups_within_their_bounds() {
    let records = scenario_records();
    let groups = aggregate::group_mean(
        &records,
        CategoricalField::Service,
        NumericField::Satisfaction,
    );
    for group in &groups {
        let members: Vec<f64> = records
            .iter()
            .filter(|r| r.service == group.label)
            .map(|r| f64::from(r.satisfaction))
            .collect();
        assert!(!members.is_empty(), "group {} not in input", group.label);
        let min = members.iter().copied().fold(f64::INFINITY, f64::min);
        let max = members.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(group.mean >= min && group.mean <= max);
    }
}

#[test]
fn group_mean_of_empty_input_is_empty() {
    let groups = aggregate::group_mean(&[], CategoricalField::Service, NumericField::Satisfaction);
    assert!(groups.is_empty());
}

#[test]
fn value_counts_sum_to_the_record_count() {
    let records = scenario_records();
    let counts = aggregate::value_counts(&records, CategoricalField::Service);
    let total: usize = counts.iter().map(|c| c.count).sum();
    assert_eq!(total, records.len());
}

#[test]
fn value_counts_order_by_count_then_value() {
    let records = scenario_records();
    let counts = aggregate::value_counts(&records, CategoricalField::Service);
    let pairs: Vec<(&str, usize)> = counts.iter().map(|c| (c.value.as_str(), c.count)).collect();
    assert_eq!(pairs, vec![("A", 2), ("B", 1), ("C", 1)]);
}

#[test]
fn correlation_is_symmetric_and_bounded() {
    let records = scenario_records();
    let ab = aggregate::pearson_correlation(&records, NumericField::Age, NumericField::Satisfaction)
        .unwrap()
        .unwrap();
    let ba = aggregate::pearson_correlation(&records, NumericField::Satisfaction, NumericField::Age)
        .unwrap()
        .unwrap();
    assert!((ab - ba).abs() < 1e-12);
    assert!((-1.0..=1.0).contains(&ab));
}

#[test]
fn perfect_linear_relationship_gives_unit_correlation() {
    let records = vec![
        record("P1", None, 20, "A", "2024-01-01", "2024-01-02", 10),
        record("P2", None, 30, "A", "2024-01-01", "2024-01-03", 20),
        record("P3", None, 40, "A", "2024-01-01", "2024-01-04", 30),
    ];
    let r = aggregate::pearson_correlation(
        &records,
        NumericField::LengthOfStay,
        NumericField::Satisfaction,
    )
    .unwrap()
    .unwrap();
    assert!((r - 1.0).abs() < 1e-12);
}

#[test]
fn zero_variance_makes_the_correlation_undefined() {
    let records = vec![
        record("P1", None, 20, "A", "2024-01-01", "2024-01-02", 50),
        record("P2", None, 30, "A", "2024-01-01", "2024-01-03", 50),
    ];
    let r = aggregate::pearson_correlation(
        &records,
        NumericField::LengthOfStay,
        NumericField::Satisfaction,
    )
    .unwrap();
    assert_eq!(r, None);
}

#[test]
fn correlation_of_empty_input_is_an_error() {
    assert!(matches!(
        aggregate::pearson_correlation(&[], NumericField::Age, NumericField::Satisfaction),
        Err(AnalyticsError::EmptyInput { .. })
    ));
}

#[test]
fn describe_matches_hand_computed_values() {
    // Stays are 1, 2, 3, 4 days.
    let records = scenario_records();
    let stats = aggregate::describe(&records, NumericField::LengthOfStay).unwrap();

    assert_eq!(stats.count, 4);
    assert!((stats.mean - 2.5).abs() < 1e-12);
    assert!((stats.min - 1.0).abs() < 1e-12);
    assert!((stats.max - 4.0).abs() < 1e-12);
    assert!((stats.p25 - 1.75).abs() < 1e-12);
    assert!((stats.p50 - 2.5).abs() < 1e-12);
    assert!((stats.p75 - 3.25).abs() < 1e-12);
    assert!((stats.std_dev - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
}

#[test]
fn describe_of_a_single_record_has_zero_std_dev() {
    let records = vec![record("P1", None, 20, "A", "2024-01-01", "2024-01-03", 64)];
    let stats = aggregate::describe(&records, NumericField::Satisfaction).unwrap();
    assert_eq!(stats.count, 1);
    assert!((stats.std_dev - 0.0).abs() < 1e-12);
    assert!((stats.p50 - 64.0).abs() < 1e-12);
}

#[test]
fn describe_of_empty_input_is_an_error() {
    assert!(matches!(
        aggregate::describe(&[], NumericField::Age),
        Err(AnalyticsError::EmptyInput { .. })
    ));
}

#[test]
fn histogram_preserves_the_total_count() {
    let records = vec![
        record("P1", None, 10, "A", "2024-01-01", "2024-01-02", 50),
        record("P2", None, 20, "A", "2024-01-01", "2024-01-02", 50),
        record("P3", None, 30, "A", "2024-01-01", "2024-01-02", 50),
        record("P4", None, 40, "A", "2024-01-01", "2024-01-02", 50),
    ];
    let bins = aggregate::histogram(&records, NumericField::Age, 3).unwrap();
    assert_eq!(bins.len(), 3);
    let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
    // The max value lands in the final, closed bin.
    assert_eq!(counts, vec![1, 1, 2]);
    assert_eq!(counts.iter().sum::<usize>(), records.len());
}

#[test]
fn histogram_widens_a_degenerate_span() {
    let records = vec![
        record("P1", None, 30, "A", "2024-01-01", "2024-01-02", 50),
        record("P2", None, 30, "A", "2024-01-01", "2024-01-02", 50),
        record("P3", None, 30, "A", "2024-01-01", "2024-01-02", 50),
    ];
    let bins = aggregate::histogram(&records, NumericField::Age, 5).unwrap();
    assert_eq!(bins.len(), 5);
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
    assert!(bins.iter().all(|b| b.upper > b.lower));
}

#[test]
fn histogram_rejects_zero_bins_and_empty_input() {
    let records = scenario_records();
    assert!(matches!(
        aggregate::histogram(&records, NumericField::Age, 0),
        Err(AnalyticsError::InvalidFilter(_))
    ));
    assert!(matches!(
        aggregate::histogram(&[], NumericField::Age, 10),
        Err(AnalyticsError::EmptyInput { .. })
    ));
}
