use anyhow::{Context, bail};
use log::info;
use std::env;
use std::time::Instant;

use visit_analytics::{FilterCriteria, VisitStore, dashboard};

const USAGE: &str = "usage: visit-analytics <patients.csv>";

/// The CLI takes exactly one positional argument: the data file
fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<String> {
    let path = args.next().context(USAGE)?;
    if args.next().is_some() {
        bail!("{USAGE}");
    }
    Ok(path)
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = parse_args(env::args().skip(1))?;

    let start = Instant::now();
    let store = VisitStore::open(&path)
        .with_context(|| format!("failed to load patient visits from {path}"))?;
    info!(
        "Store ready with {} records in {:?}",
        store.records().len(),
        start.elapsed()
    );

    let summary = store.summary();
    info!(
        "Dataset spans ages {}-{} across {} services",
        summary.age_min,
        summary.age_max,
        summary.services.len()
    );

    let criteria = FilterCriteria::allowing_all(&summary);
    let view = dashboard::render(store.records(), &criteria)
        .context("failed to render the dashboard view")?;

    println!("{}", view.summary_text());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|v| (*v).to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn accepts_exactly_one_path() {
        assert_eq!(parse_args(args(&["patients.csv"])).unwrap(), "patients.csv");
    }

    #[test]
    fn rejects_missing_and_surplus_arguments() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["patients.csv", "extra"])).is_err());
    }
}
