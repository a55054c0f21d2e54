//! Error handling for the visit analytics pipeline.

use chrono::NaiveDate;
use thiserror::Error;

/// Specialized error type for visit analytics operations
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Error opening or reading the data source
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// The source is missing one or more required columns
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A date string did not match the configured format
    #[error("Date parse error in column '{column}', row {row}: '{value}' does not match '{format}'")]
    DateParse {
        column: String,
        row: usize,
        value: String,
        format: String,
    },

    /// A record's departure date precedes its arrival date
    #[error("Negative stay for patient '{patient_id}': departure {departure} precedes arrival {arrival}")]
    NegativeStay {
        patient_id: String,
        arrival: NaiveDate,
        departure: NaiveDate,
    },

    /// A statistic was requested over zero records
    #[error("Cannot compute {statistic} over an empty record set")]
    EmptyInput { statistic: &'static str },

    /// Filter criteria are malformed (e.g. inverted age bounds)
    #[error("Invalid filter criteria: {0}")]
    InvalidFilter(String),

    /// Error reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the Arrow CSV reader
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error deserializing a record batch into typed rows
    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_arrow::Error),
}

/// Result type for visit analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;
