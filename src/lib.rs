//! Analytics core for hospital patient visit data: typed CSV loading,
//! predicate-based filtering, grouped statistics and the dashboard view
//! model the presentation layer renders.

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod store;

// Re-export the most common types for easier use
// Core types
pub use config::LoadConfig;
pub use error::{AnalyticsError, Result};
pub use models::{AgeGroup, DatasetSummary, PatientRecord};
pub use store::VisitStore;

// Filtering capabilities
pub use filter::{FilterCriteria, FilterCriteriaBuilder, RecordFilter};

// Aggregation and rendering
pub use aggregate::{CategoricalField, Describe, GroupMean, HistogramBin, NumericField, ValueCount};
pub use dashboard::{DashboardViewModel, render};
