//! Priority-ordered screening evaluator.
//!
//! A second, independent reading of the same answers: rules are sorted by
//! descending priority and scanned exactly once. Conditions read only the
//! immutable answer values, so no firing can change another rule's
//! eligibility and a single pass is sufficient - the deliberate contrast to
//! the resolver's fixpoint loop.
//!
//! Conditions are a small closed expression type rather than closures, so a
//! rule's trigger can be printed and tested without running the evaluator.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RuleBaseError;
use crate::level::StressLevel;
use crate::subject::{Attribute, ResponseSet, Section, SubjectRecord};

/// Comparison operator for attribute conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    /// Attribute value `>=` threshold.
    Ge,
    /// Attribute value `<=` threshold.
    Le,
}

/// Condition over a subject record's attribute values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "args", rename_all = "snake_case")]
pub enum AttrExpr {
    /// Compare one attribute against a threshold.
    Cmp {
        /// Attribute to read.
        attribute: Attribute,
        /// Comparison operator.
        op: CmpOp,
        /// Threshold value.
        value: i64,
    },
    /// Every sub-expression must hold.
    All(Vec<AttrExpr>),
    /// At least one sub-expression must hold.
    Any(Vec<AttrExpr>),
    /// Always holds.
    Always,
}

impl AttrExpr {
    /// `attribute >= value`
    #[must_use]
    pub const fn at_least(attribute: Attribute, value: i64) -> Self {
        Self::Cmp {
            attribute,
            op: CmpOp::Ge,
            value,
        }
    }

    /// `attribute <= value`
    #[must_use]
    pub const fn at_most(attribute: Attribute, value: i64) -> Self {
        Self::Cmp {
            attribute,
            op: CmpOp::Le,
            value,
        }
    }

    /// Evaluates the expression against the record's answers.
    #[must_use]
    pub fn holds(&self, record: &SubjectRecord) -> bool {
        match self {
            Self::Cmp {
                attribute,
                op,
                value,
            } => {
                let answer = record.answer(*attribute);
                match op {
                    CmpOp::Ge => answer >= *value,
                    CmpOp::Le => answer <= *value,
                }
            }
            Self::All(exprs) => exprs.iter().all(|e| e.holds(record)),
            Self::Any(exprs) => exprs.iter().any(|e| e.holds(record)),
            Self::Always => true,
        }
    }
}

impl fmt::Display for AttrExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cmp {
                attribute,
                op,
                value,
            } => {
                let op = match op {
                    CmpOp::Ge => ">=",
                    CmpOp::Le => "<=",
                };
                write!(f, "{attribute} {op} {value}")
            }
            Self::All(exprs) => {
                let parts: Vec<String> = exprs.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(" and "))
            }
            Self::Any(exprs) => {
                let parts: Vec<String> = exprs.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(" or "))
            }
            Self::Always => write!(f, "always"),
        }
    }
}

/// What a screening rule does when its condition holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScreenAction {
    /// Append a note to one section bucket and contribute a display line.
    Flag {
        /// Target explanation section.
        section: Section,
        /// Note appended to the section.
        note: String,
        /// Line returned to the caller.
        display: String,
    },

    /// Compute the baseline classification from the answer sum and write it
    /// into the record. The one unconditional, lowest-priority rule.
    OverallScore,
}

/// A screening rule: name, priority, condition, action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRule {
    /// Rule name, recorded in the fired-rule trace.
    pub name: String,
    /// Firing priority; higher fires earlier. Ties fire in registration
    /// order.
    pub priority: i32,
    /// Condition over the subject record.
    pub condition: AttrExpr,
    /// Action taken when the condition holds.
    pub action: ScreenAction,
}

/// Result of one screening pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningOutcome {
    /// Names of fired rules, in firing order.
    pub fired: Vec<String>,
    /// Display lines from fired rules, in firing order.
    pub displays: Vec<String>,
    /// Baseline classification from the overall-score rule.
    pub classification: StressLevel,
    /// Answer sum used for the baseline (unanswered attributes default 1).
    pub total_score: i64,
    /// Maximum attainable answer sum.
    pub max_score: i64,
}

/// Immutable, priority-ordered screening rule set.
#[derive(Debug, Clone)]
pub struct ScreeningRules {
    rules: Vec<ScreenRule>,
}

impl ScreeningRules {
    /// Creates a rule set.
    ///
    /// Exactly one rule must carry the [`ScreenAction::OverallScore`]
    /// action, so every run produces a baseline verdict.
    pub fn new(rules: Vec<ScreenRule>) -> Result<Self, RuleBaseError> {
        let count = rules
            .iter()
            .filter(|r| r.action == ScreenAction::OverallScore)
            .count();
        if count != 1 {
            return Err(RuleBaseError::OverallScoreRuleCount { count });
        }
        Ok(Self { rules })
    }

    /// The built-in screening rules.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(standard_screen_rules()).expect("standard screening rules are valid")
    }

    /// The rules, in registration order.
    #[must_use]
    pub fn rules(&self) -> &[ScreenRule] {
        &self.rules
    }

    /// Runs one pass over the record, highest priority first.
    ///
    /// Mutates the record (section notes, baseline classification) and
    /// returns the trace. Repeated runs over a fresh record with the same
    /// answers produce identical outcomes.
    pub fn run(&self, record: &mut SubjectRecord) -> ScreeningOutcome {
        // Stable sort: equal priorities keep registration order.
        let mut ordered: Vec<&ScreenRule> = self.rules.iter().collect();
        ordered.sort_by_key(|r| std::cmp::Reverse(r.priority));

        let total_score = record.responses.defaulted_total();
        let max_score = ResponseSet::max_total();

        let mut fired = Vec::new();
        let mut displays = Vec::new();

        for rule in ordered {
            if !rule.condition.holds(record) {
                continue;
            }
            debug!(rule = %rule.name, priority = rule.priority, "screening rule fired");
            match &rule.action {
                ScreenAction::Flag {
                    section,
                    note,
                    display,
                } => {
                    record.flag(*section, note.clone());
                    displays.push(display.clone());
                }
                ScreenAction::OverallScore => {
                    let level = score_to_level(total_score);
                    record.classification = level;
                    displays.push(format!("Overall stress level: {level}"));
                }
            }
            fired.push(rule.name.clone());
        }

        ScreeningOutcome {
            fired,
            displays,
            classification: record.classification,
            total_score,
            max_score,
        }
    }
}

impl Default for ScreeningRules {
    fn default() -> Self {
        Self::standard()
    }
}

/// Baseline breakpoints over the defaulted answer sum.
const fn score_to_level(total: i64) -> StressLevel {
    if total > 80 {
        StressLevel::VeryHigh
    } else if total > 60 {
        StressLevel::High
    } else if total > 40 {
        StressLevel::Moderate
    } else {
        StressLevel::Low
    }
}

/// The built-in screening rules, mirrored section by section.
fn standard_screen_rules() -> Vec<ScreenRule> {
    use Attribute as A;

    vec![
        ScreenRule {
            name: "Critical Mental State".to_string(),
            priority: 100,
            condition: AttrExpr::Any(vec![
                AttrExpr::All(vec![
                    AttrExpr::at_least(A::AnxietyLevel, 4),
                    AttrExpr::at_least(A::Depression, 4),
                ]),
                AttrExpr::at_least(A::MentalHealthHistory, 4),
            ]),
            action: ScreenAction::Flag {
                section: Section::MentalState,
                note: "High anxiety and depression.".to_string(),
                display: "Critical mental health risk detected.".to_string(),
            },
        },
        ScreenRule {
            name: "Severe Physical Symptoms".to_string(),
            priority: 90,
            condition: AttrExpr::All(vec![
                AttrExpr::at_least(A::Headache, 4),
                AttrExpr::at_least(A::SleepQuality, 4),
                AttrExpr::at_least(A::BreathingProblem, 4),
            ]),
            action: ScreenAction::Flag {
                section: Section::PhysicalSymptoms,
                note: "Severe physical symptoms (headache + sleep + breathing).".to_string(),
                display: "Severe physical stress signals detected.".to_string(),
            },
        },
        ScreenRule {
            name: "Bullying Crisis".to_string(),
            priority: 85,
            condition: AttrExpr::at_least(A::Bullying, 4),
            action: ScreenAction::Flag {
                section: Section::SocialSupport,
                note: "Bullying experience detected.".to_string(),
                display: "Bullying concern identified.".to_string(),
            },
        },
        ScreenRule {
            name: "Academic Pressure".to_string(),
            priority: 70,
            condition: AttrExpr::All(vec![
                AttrExpr::at_least(A::StudyLoad, 4),
                AttrExpr::at_least(A::FutureCareerConcerns, 4),
            ]),
            action: ScreenAction::Flag {
                section: Section::AcademicPressure,
                note: "Heavy study load and career concerns.".to_string(),
                display: "Academic stress detected.".to_string(),
            },
        },
        ScreenRule {
            name: "Environmental Stress".to_string(),
            priority: 60,
            condition: AttrExpr::Any(vec![
                AttrExpr::at_least(A::NoiseLevel, 4),
                AttrExpr::at_least(A::BasicNeeds, 4),
                AttrExpr::at_least(A::LivingConditions, 4),
            ]),
            action: ScreenAction::Flag {
                section: Section::EnvironmentalFactors,
                note: "Poor environment or unmet basic needs.".to_string(),
                display: "Environmental stress detected.".to_string(),
            },
        },
        ScreenRule {
            name: "Social Support Issue".to_string(),
            priority: 55,
            condition: AttrExpr::All(vec![
                AttrExpr::at_most(A::SocialSupport, 2),
                AttrExpr::at_least(A::PeerPressure, 4),
            ]),
            action: ScreenAction::Flag {
                section: Section::SocialSupport,
                note: "Low support + high peer pressure.".to_string(),
                display: "Social support issues detected.".to_string(),
            },
        },
        ScreenRule {
            name: "Overall Score".to_string(),
            priority: 10,
            condition: AttrExpr::Always,
            action: ScreenAction::OverallScore,
        },
    ]
}
