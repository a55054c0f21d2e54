//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::io::Write;

use chrono::NaiveDate;
use tempfile::NamedTempFile;
use visit_analytics::PatientRecord;

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

pub fn record(
    patient_id: &str,
    name: Option<&str>,
    age: u32,
    service: &str,
    arrival: &str,
    departure: &str,
    satisfaction: u32,
) -> PatientRecord {
    PatientRecord {
        patient_id: patient_id.to_string(),
        name: name.map(str::to_string),
        age,
        service: service.to_string(),
        arrival_date: date(arrival),
        departure_date: date(departure),
        satisfaction,
    }
}

/// Four visits across services A, A, B, C with satisfaction 10, 20, 30, 40
pub fn scenario_records() -> Vec<PatientRecord> {
    vec![
        record(
            "P0001",
            Some("Anna Berg"),
            10,
            "A",
            "2024-01-01",
            "2024-01-02",
            10,
        ),
        record(
            "P0002",
            Some("Arne Dahl"),
            25,
            "A",
            "2024-01-03",
            "2024-01-05",
            20,
        ),
        record(
            "P0003",
            Some("Bente Holm"),
            40,
            "B",
            "2024-01-04",
            "2024-01-07",
            30,
        ),
        record("P0004", None, 70, "C", "2024-01-05", "2024-01-09", 40),
    ]
}

pub const VALID_CSV: &str = "\
patient_id,name,age,service,arrival_date,departure_date,satisfaction
P0001,Alice Larsen,34,Cardiology,2024-01-02,2024-01-05,80
P0002,Bob Holm,70,Emergency,2024-02-01,2024-02-01,55
P0003,,12,Pediatrics,2024-03-10,2024-03-14,90
";

/// Write CSV content to a temp file; the handle keeps the file alive
pub fn csv_fixture(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
