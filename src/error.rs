//! Error types for StressLens.
//!
//! All errors are strongly typed using thiserror. Input validation errors
//! name the offending questionnaire key so callers can point at the exact
//! form field; rule-base errors are construction-time programming defects
//! and never occur during evaluation of well-formed input.

use thiserror::Error;

/// Validation errors raised at the input boundary, before the engine runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Answer for '{key}' is {value}, outside the allowed range 1..=5")]
    AnswerOutOfRange {
        key: String,
        value: i64,
    },

    #[error("Answer for '{key}' is not an integer")]
    AnswerNotInteger {
        key: String,
    },

    #[error("Responses must be a JSON object of question keys to answers")]
    NotAnObject,
}

/// Defects in a rule base, detected once at engine construction.
///
/// These indicate a broken rule set, not bad user input: an engine built
/// from [`crate::RuleBase::standard`] never produces them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleBaseError {
    #[error("Rules '{first}' and '{second}' both classify {metric} = {value}")]
    OverlappingClassification {
        metric: String,
        value: String,
        first: String,
        second: String,
    },

    #[error("No classification rule covers {metric} = {value}")]
    ClassificationGap {
        metric: String,
        value: String,
    },

    #[error("Rule '{rule}' concludes a fact it also requires")]
    SelfDerivingRule {
        rule: String,
    },

    #[error("Duplicate rule id '{rule}'")]
    DuplicateRuleId {
        rule: String,
    },

    #[error("Screening rules must register exactly one unconditional overall-score rule, found {count}")]
    OverallScoreRuleCount {
        count: usize,
    },
}

/// Top-level error type for StressLens.
#[derive(Debug, Error)]
pub enum StressError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Rule base error: {0}")]
    RuleBase(#[from] RuleBaseError),
}

impl StressError {
    /// Returns true if this is an input-validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a rule-base construction error.
    #[must_use]
    pub const fn is_rule_base(&self) -> bool {
        matches!(self, Self::RuleBase(_))
    }
}

/// Result type alias for StressLens operations.
pub type StressResult<T> = Result<T, StressError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_the_key() {
        let err = ValidationError::AnswerOutOfRange {
            key: "sleep_quality".to_string(),
            value: 9,
        };
        let msg = format!("{err}");
        assert!(msg.contains("sleep_quality"));
        assert!(msg.contains('9'));
    }

    #[test]
    fn non_integer_error_names_the_key() {
        let err = ValidationError::AnswerNotInteger {
            key: "bullying".to_string(),
        };
        assert!(format!("{err}").contains("bullying"));
    }

    #[test]
    fn stress_error_from_validation() {
        let err: StressError = ValidationError::NotAnObject.into();
        assert!(err.is_validation());
        assert!(!err.is_rule_base());
    }

    #[test]
    fn stress_error_from_rule_base() {
        let err: StressError = RuleBaseError::DuplicateRuleId {
            rule: "rule-high-overall".to_string(),
        }
        .into();
        assert!(err.is_rule_base());
        assert!(format!("{err}").contains("rule-high-overall"));
    }
}
