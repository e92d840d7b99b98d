//! Symbolic facts and numeric metrics.
//!
//! Every token the rule base can mention is enumerated here, closed at build
//! time. Nothing past the input boundary works with string keys: a typo in a
//! rule is a compile error, not a silently dead rule.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::level::StressLevel;

/// An atomic symbolic fact: an observed symptom or a derived conclusion.
///
/// Facts are presence-only; identity is the whole payload. Within one
/// evaluation session a fact is either held or not (a set, never a multiset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fact {
    // Symptom facts, asserted from questionnaire answers.
    /// Poor sleep on three or more nights a week.
    PoorSleep,
    /// Irritability.
    Irritability,
    /// Deadlines within the next seven days.
    DeadlinePressure,
    /// Persistent fatigue.
    PersistentFatigue,
    /// Difficulty concentrating.
    DifficultyConcentrating,
    /// Skipping meals.
    SkipMeals,
    /// Racing thoughts about school.
    RacingThoughts,
    /// Frequent procrastination.
    Procrastination,
    /// Social withdrawal.
    SocialWithdrawal,
    /// Minor worry only, no stronger indicator reported.
    MinorWorryOnly,

    // Severity conclusions, derived by classification rules.
    /// Severe stress concluded.
    StressVeryHigh,
    /// High stress concluded.
    StressHigh,
    /// Moderate stress concluded.
    StressModerate,
    /// Low stress concluded.
    StressLow,

    // Recommendation conclusions, derived from severity facts.
    /// Take short breaks every hour of study.
    RecBreaks,
    /// Talk to a counselor about coping strategies.
    RecCounselor,
    /// Keep a regular sleep schedule.
    RecSleep,
    /// Use time blocking for tasks.
    RecTimeBlock,
    /// Plan weekly priority tasks.
    RecPlan,
    /// Light regular exercise.
    RecExercise,
    /// Study or talk with peers regularly.
    RecPeer,
    /// Keep monitoring mood and sleep.
    RecMonitor,
}

impl Fact {
    /// Every fact the engine knows about.
    pub const ALL: [Self; 22] = [
        Self::PoorSleep,
        Self::Irritability,
        Self::DeadlinePressure,
        Self::PersistentFatigue,
        Self::DifficultyConcentrating,
        Self::SkipMeals,
        Self::RacingThoughts,
        Self::Procrastination,
        Self::SocialWithdrawal,
        Self::MinorWorryOnly,
        Self::StressVeryHigh,
        Self::StressHigh,
        Self::StressModerate,
        Self::StressLow,
        Self::RecBreaks,
        Self::RecCounselor,
        Self::RecSleep,
        Self::RecTimeBlock,
        Self::RecPlan,
        Self::RecExercise,
        Self::RecPeer,
        Self::RecMonitor,
    ];

    /// Canonical snake_case token, matching the wire form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PoorSleep => "poor_sleep",
            Self::Irritability => "irritability",
            Self::DeadlinePressure => "deadline_pressure",
            Self::PersistentFatigue => "persistent_fatigue",
            Self::DifficultyConcentrating => "difficulty_concentrating",
            Self::SkipMeals => "skip_meals",
            Self::RacingThoughts => "racing_thoughts",
            Self::Procrastination => "procrastination",
            Self::SocialWithdrawal => "social_withdrawal",
            Self::MinorWorryOnly => "minor_worry_only",
            Self::StressVeryHigh => "stress_very_high",
            Self::StressHigh => "stress_high",
            Self::StressModerate => "stress_moderate",
            Self::StressLow => "stress_low",
            Self::RecBreaks => "rec_breaks",
            Self::RecCounselor => "rec_counselor",
            Self::RecSleep => "rec_sleep",
            Self::RecTimeBlock => "rec_time_block",
            Self::RecPlan => "rec_plan",
            Self::RecExercise => "rec_exercise",
            Self::RecPeer => "rec_peer",
            Self::RecMonitor => "rec_monitor",
        }
    }

    /// The severity this fact asserts, if it is a severity conclusion.
    #[must_use]
    pub const fn severity(&self) -> Option<StressLevel> {
        match self {
            Self::StressVeryHigh => Some(StressLevel::VeryHigh),
            Self::StressHigh => Some(StressLevel::High),
            Self::StressModerate => Some(StressLevel::Moderate),
            Self::StressLow => Some(StressLevel::Low),
            _ => None,
        }
    }

    /// The severity conclusion fact for a verdict level.
    #[must_use]
    pub const fn for_severity(level: StressLevel) -> Option<Self> {
        match level {
            StressLevel::VeryHigh => Some(Self::StressVeryHigh),
            StressLevel::High => Some(Self::StressHigh),
            StressLevel::Moderate => Some(Self::StressModerate),
            StressLevel::Low => Some(Self::StressLow),
            StressLevel::Undetermined => None,
        }
    }

    /// Returns true if this fact is a recommendation conclusion.
    #[must_use]
    pub const fn is_recommendation(&self) -> bool {
        matches!(
            self,
            Self::RecBreaks
                | Self::RecCounselor
                | Self::RecSleep
                | Self::RecTimeBlock
                | Self::RecPlan
                | Self::RecExercise
                | Self::RecPeer
                | Self::RecMonitor
        )
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named numeric slot.
///
/// Unlike facts, metrics carry a value and may be overwritten; each name
/// holds at most one value per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Mean stress-adjusted score over the answered core questions.
    Overall,
    /// Sum of all provided answers.
    TotalScore,
    /// Maximum attainable answer sum.
    MaxScore,
    /// `TotalScore / MaxScore`, derived by the aggregate layer.
    ScoreRatio,
}

impl Metric {
    /// Canonical snake_case token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overall => "overall",
            Self::TotalScore => "total_score",
            Self::MaxScore => "max_score",
            Self::ScoreRatio => "score_ratio",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_facts_have_distinct_tokens() {
        for (i, a) in Fact::ALL.iter().enumerate() {
            for b in &Fact::ALL[i + 1..] {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }

    #[test]
    fn severity_mapping_round_trips() {
        for level in StressLevel::VERDICTS {
            let fact = Fact::for_severity(level).unwrap();
            assert_eq!(fact.severity(), Some(level));
        }
        assert_eq!(Fact::for_severity(StressLevel::Undetermined), None);
    }

    #[test]
    fn recommendations_carry_no_severity() {
        for fact in Fact::ALL {
            if fact.is_recommendation() {
                assert_eq!(fact.severity(), None);
                assert!(fact.as_str().starts_with("rec_"));
            }
        }
    }

    #[test]
    fn fact_serializes_as_token() {
        let json = serde_json::to_string(&Fact::PoorSleep).unwrap();
        assert_eq!(json, "\"poor_sleep\"");
    }

    #[test]
    fn metric_tokens() {
        assert_eq!(Metric::Overall.as_str(), "overall");
        assert_eq!(Metric::ScoreRatio.to_string(), "score_ratio");
    }
}
