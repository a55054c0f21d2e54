//! Configuration for the visit store loader.

/// Configuration for loading a visit CSV source
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Format string for parsing `arrival_date` and `departure_date`
    pub date_format: String,
    /// Number of rows per `RecordBatch` read from the CSV source
    pub batch_size: usize,
    /// Whether to reject satisfaction scores outside the 0-100 domain
    pub enforce_satisfaction_domain: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            batch_size: 8192,
            enforce_satisfaction_domain: true,
        }
    }
}
