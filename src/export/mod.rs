//! CSV export of a filtered view for download.
//!
//! The exported column set is the input columns in input order followed by
//! the derived `length_of_stay` and `age_group` columns. Field formatting
//! is byte-identical to the input convention (plain integers, ISO dates),
//! so re-loading an exported file through the store round-trips: same
//! `patient_id` sequence, same stay lengths, derived columns ignored by
//! the store's projection.

use std::io::Write;

use crate::error::{AnalyticsError, Result};
use crate::models::PatientRecord;

/// Header row of an exported file
pub const EXPORT_HEADER: &str =
    "patient_id,name,age,service,arrival_date,departure_date,satisfaction,length_of_stay,age_group";

/// Write a record sequence as CSV to any writer
pub fn write_csv<W: Write>(records: &[PatientRecord], mut writer: W) -> Result<()> {
    writeln!(writer, "{EXPORT_HEADER}")?;
    for record in records {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{}",
            escape_csv(&record.patient_id),
            escape_csv(record.name.as_deref().unwrap_or("")),
            record.age,
            escape_csv(&record.service),
            record.arrival_date.format("%Y-%m-%d"),
            record.departure_date.format("%Y-%m-%d"),
            record.satisfaction,
            record.length_of_stay(),
            record.age_group().label(),
        )?;
    }
    Ok(())
}

/// Render a record sequence as an in-memory CSV string
pub fn csv_string(records: &[PatientRecord]) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| AnalyticsError::DataLoad(format!("exported CSV is not valid UTF-8: {e}")))
}

/// Quote a field only when it contains a comma, quote or newline
#[must_use]
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
