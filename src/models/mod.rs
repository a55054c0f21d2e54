//! Domain models for patient visit data.

pub mod age_group;
pub mod record;

pub use age_group::AgeGroup;
pub use record::{DatasetSummary, PatientRecord};
