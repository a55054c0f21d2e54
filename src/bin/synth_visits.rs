//! Generates a reproducible synthetic patient visit CSV so the dashboard
//! has data to run against. Stays are mildly anti-correlated with
//! satisfaction, which gives the correlation view a visible trend.

use std::fmt::Write as _;
use std::fs;

use anyhow::Context;
use chrono::{Days, NaiveDate};
use log::info;
use rand::prelude::*;

use visit_analytics::export::escape_csv;

const SERVICES: [&str; 5] = [
    "Cardiology",
    "Emergency",
    "General Surgery",
    "Orthopedics",
    "Pediatrics",
];

const FIRST_NAMES: [&str; 10] = [
    "Alice", "Bjorn", "Carla", "David", "Elena", "Frederik", "Grace", "Hassan", "Ingrid", "Jonas",
];

const LAST_NAMES: [&str; 10] = [
    "Andersen", "Berg", "Christensen", "Dahl", "Eriksen", "Fischer", "Gray", "Holm", "Ivanova",
    "Jensen",
];

/// Render `rows` synthetic visits as CSV text, deterministic per seed
fn generate_csv(rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    // Base date is fixed so output depends on the seed alone.
    let year_start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN);

    let mut csv = String::new();
    csv.push_str("patient_id,name,age,service,arrival_date,departure_date,satisfaction\n");

    for i in 0..rows {
        let name = if i % 25 == 24 {
            // Occasional anonymous visit, so missing names get exercised
            String::new()
        } else {
            format!(
                "{} {}",
                FIRST_NAMES.choose(&mut rng).unwrap_or(&"Alex"),
                LAST_NAMES.choose(&mut rng).unwrap_or(&"Smith"),
            )
        };
        let age: u32 = rng.random_range(1..=95);
        let service = SERVICES.choose(&mut rng).unwrap_or(&SERVICES[0]);

        let arrival = year_start + Days::new(rng.random_range(0..330));
        let stay_days: u64 = rng.random_range(0..=14);
        let departure = arrival + Days::new(stay_days);

        // Longer stays skew toward lower scores.
        let noise: i64 = rng.random_range(-8..=8);
        let satisfaction = (88 - 3 * stay_days as i64 + noise).clamp(0, 100);

        let _ = writeln!(
            csv,
            "P{:04},{},{},{},{},{},{}",
            i + 1,
            escape_csv(&name),
            age,
            service,
            arrival.format("%Y-%m-%d"),
            departure.format("%Y-%m-%d"),
            satisfaction,
        );
    }
    csv
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let out_path = args
        .next()
        .context("usage: synth-visits <out.csv> [rows] [seed]")?;
    let rows: usize = args
        .next()
        .map_or(Ok(200), |v| v.parse())
        .context("rows must be a non-negative integer")?;
    let seed: u64 = args
        .next()
        .map_or(Ok(42), |v| v.parse())
        .context("seed must be a non-negative integer")?;

    let csv = generate_csv(rows, seed);
    fs::write(&out_path, csv).with_context(|| format!("cannot write output file {out_path}"))?;

    info!("Wrote {rows} synthetic visits to {out_path} (seed {seed})");
    Ok(())
}
