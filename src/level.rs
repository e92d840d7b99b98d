//! Stress classification levels.
//!
//! The ordered verdict scale shared by both reasoning strategies. Ordering
//! follows declaration order, so `Undetermined` is the weakest verdict and
//! comparisons like `level > StressLevel::Moderate` read naturally.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Final stress classification, from no-verdict to most severe.
///
/// # Examples
///
/// ```
/// use stresslens::StressLevel;
///
/// assert!(StressLevel::High > StressLevel::Moderate);
/// assert!(StressLevel::Undetermined < StressLevel::Low);
/// assert_eq!(StressLevel::VeryHigh.to_string(), "Very High");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    /// No rule produced a verdict.
    Undetermined,
    /// Mild stress, maintain observation.
    Low,
    /// Clear stress signals, manageable with structure.
    Moderate,
    /// Multiple strong stress indicators.
    High,
    /// Severe stress, immediate attention warranted.
    VeryHigh,
}

impl StressLevel {
    /// All levels that represent an actual verdict, most severe first.
    pub const VERDICTS: [Self; 4] = [Self::VeryHigh, Self::High, Self::Moderate, Self::Low];

    /// Returns true if this level is an actual verdict (not `Undetermined`).
    #[must_use]
    pub const fn is_determined(&self) -> bool {
        !matches!(self, Self::Undetermined)
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undetermined => write!(f, "Undetermined"),
            Self::Low => write!(f, "Low"),
            Self::Moderate => write!(f, "Moderate"),
            Self::High => write!(f, "High"),
            Self::VeryHigh => write!(f, "Very High"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(StressLevel::Undetermined < StressLevel::Low);
        assert!(StressLevel::Low < StressLevel::Moderate);
        assert!(StressLevel::Moderate < StressLevel::High);
        assert!(StressLevel::High < StressLevel::VeryHigh);
    }

    #[test]
    fn verdicts_are_descending() {
        for pair in StressLevel::VERDICTS.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn undetermined_is_not_a_verdict() {
        assert!(!StressLevel::Undetermined.is_determined());
        assert!(StressLevel::Low.is_determined());
    }

    #[test]
    fn serialization_round_trip() {
        let json = serde_json::to_string(&StressLevel::VeryHigh).unwrap();
        assert_eq!(json, "\"very_high\"");
        let back: StressLevel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StressLevel::VeryHigh);
    }
}
