//! Fixed age-group partition used by the demographics views.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical age bucket derived from a patient's age
///
/// The partition is fixed: closed buckets up to 65, then a single
/// unbounded bucket for everyone older.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    /// Ages 0-18
    Child,
    /// Ages 19-35
    YoungAdult,
    /// Ages 36-50
    MiddleAged,
    /// Ages 51-65
    Senior,
    /// Ages 66 and above
    Elderly,
}

impl AgeGroup {
    /// All buckets in categorical display order (youngest first)
    pub const ALL: [Self; 5] = [
        Self::Child,
        Self::YoungAdult,
        Self::MiddleAged,
        Self::Senior,
        Self::Elderly,
    ];

    /// Classify an age into its bucket
    #[must_use]
    pub const fn from_age(age: u32) -> Self {
        match age {
            0..=18 => Self::Child,
            19..=35 => Self::YoungAdult,
            36..=50 => Self::MiddleAged,
            51..=65 => Self::Senior,
            _ => Self::Elderly,
        }
    }

    /// Display label for the bucket
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Child => "0-18",
            Self::YoungAdult => "19-35",
            Self::MiddleAged => "36-50",
            Self::Senior => "51-65",
            Self::Elderly => "65+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
