//! Recommendation lookup.
//!
//! Maps derived recommendation facts to advice text. Lookups are keyed on
//! the closed [`Fact`] enum and on exact [`StressLevel`] tiers; there is no
//! substring matching anywhere, and a lookup with no matches returns an
//! empty list rather than failing.

use serde::{Deserialize, Serialize};

use crate::fact::Fact;
use crate::level::StressLevel;

/// One advice entry: the fact that triggers it, the severity tier it
/// applies to, and the text shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceEntry {
    /// Recommendation fact this entry expands.
    pub fact: Fact,
    /// Severity tier the advice applies to.
    pub tier: StressLevel,
    /// Human-readable advice text.
    pub text: String,
}

/// Immutable, registration-ordered advice table.
#[derive(Debug, Clone)]
pub struct AdviceTable {
    entries: Vec<AdviceEntry>,
}

impl AdviceTable {
    /// Creates a table from entries; lookup order follows entry order.
    #[must_use]
    pub fn new(entries: Vec<AdviceEntry>) -> Self {
        Self { entries }
    }

    /// The built-in advice table.
    #[must_use]
    pub fn standard() -> Self {
        let entry = |fact: Fact, tier: StressLevel, text: &str| AdviceEntry {
            fact,
            tier,
            text: text.to_string(),
        };
        Self::new(vec![
            entry(
                Fact::RecBreaks,
                StressLevel::High,
                "Take 5-10 minute breaks every hour of study.",
            ),
            entry(
                Fact::RecCounselor,
                StressLevel::High,
                "Consider discussing coping strategies with a counselor.",
            ),
            entry(
                Fact::RecSleep,
                StressLevel::High,
                "Maintain a regular sleep schedule and avoid screens 60 minutes before bed.",
            ),
            entry(
                Fact::RecTimeBlock,
                StressLevel::High,
                "Use time blocking for tasks with clear start and end times.",
            ),
            entry(
                Fact::RecPlan,
                StressLevel::Moderate,
                "Plan 3-5 priority tasks weekly and break them into subtasks.",
            ),
            entry(
                Fact::RecExercise,
                StressLevel::Moderate,
                "Light exercise 3-4 times per week, 20-30 minutes each.",
            ),
            entry(
                Fact::RecPeer,
                StressLevel::Moderate,
                "Study with peers or communicate regularly to reduce isolation.",
            ),
            entry(
                Fact::RecMonitor,
                StressLevel::Low,
                "Maintain your daily routine, record mood and sleep, review weekly.",
            ),
        ])
    }

    /// The entries, in registration order.
    #[must_use]
    pub fn entries(&self) -> &[AdviceEntry] {
        &self.entries
    }

    /// Advice texts for the given derived facts, in registration order.
    ///
    /// Facts without an entry contribute nothing; no match means an empty
    /// list.
    #[must_use]
    pub fn advice_for_facts(&self, facts: &[Fact]) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| facts.contains(&e.fact))
            .map(|e| e.text.clone())
            .collect()
    }

    /// Advice texts applicable to an exact severity tier.
    #[must_use]
    pub fn advice_for_level(&self, level: StressLevel) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.tier == level)
            .map(|e| e.text.clone())
            .collect()
    }

    /// The per-level guidance paragraph for a final verdict.
    #[must_use]
    pub const fn level_summary(level: StressLevel) -> &'static str {
        match level {
            StressLevel::VeryHigh => {
                "Your stress level is VERY HIGH. Please seek professional help and talk to \
                 your counselor or trusted people as soon as possible."
            }
            StressLevel::High => {
                "Your stress level is HIGH. Try to reduce workload, improve sleep quality, \
                 and practice relaxation techniques."
            }
            StressLevel::Moderate => {
                "Your stress level is MODERATE. You may feel pressure but it is manageable. \
                 Maintain healthy routines and monitor your feelings."
            }
            StressLevel::Low => {
                "Your stress level is LOW. Keep your current habits and coping strategies."
            }
            StressLevel::Undetermined => {
                "Unable to clearly determine your stress level. Please review your situation \
                 or consult a professional if needed."
            }
        }
    }
}

impl Default for AdviceTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facts_expand_in_registration_order() {
        let table = AdviceTable::standard();
        // Deliberately out of registration order.
        let advice = table.advice_for_facts(&[Fact::RecSleep, Fact::RecBreaks]);
        assert_eq!(advice.len(), 2);
        assert!(advice[0].contains("breaks"));
        assert!(advice[1].contains("sleep schedule"));
    }

    #[test]
    fn non_recommendation_facts_contribute_nothing() {
        let table = AdviceTable::standard();
        let advice = table.advice_for_facts(&[Fact::PoorSleep, Fact::StressHigh]);
        assert!(advice.is_empty());
    }

    #[test]
    fn empty_lookup_is_empty_not_an_error() {
        let table = AdviceTable::standard();
        assert!(table.advice_for_facts(&[]).is_empty());
        assert!(table.advice_for_level(StressLevel::Undetermined).is_empty());
    }

    #[test]
    fn level_filter_is_exact() {
        let table = AdviceTable::standard();
        assert_eq!(table.advice_for_level(StressLevel::High).len(), 4);
        assert_eq!(table.advice_for_level(StressLevel::Moderate).len(), 3);
        assert_eq!(table.advice_for_level(StressLevel::Low).len(), 1);
        // No tier bleeds into an adjacent one.
        assert_eq!(table.advice_for_level(StressLevel::VeryHigh).len(), 0);
    }

    #[test]
    fn every_level_has_a_summary() {
        for level in [
            StressLevel::Undetermined,
            StressLevel::Low,
            StressLevel::Moderate,
            StressLevel::High,
            StressLevel::VeryHigh,
        ] {
            assert!(!AdviceTable::level_summary(level).is_empty());
        }
    }
}
