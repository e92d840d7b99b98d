//! The evaluation engine.
//!
//! An [`Engine`] owns the immutable rule base, screening rules, and advice
//! table. It is built once at process start and shared by reference; every
//! call to [`Engine::evaluate`] works on a fresh fact store and subject
//! record, so concurrent evaluations need no locking.
//!
//! Reconciliation precedence: the resolver's verdict is authoritative unless
//! it is `Undetermined`, in which case the screening baseline stands. Both
//! reasoning paths are kept in the result for audit.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::advice::AdviceTable;
use crate::error::StressResult;
use crate::fact::Fact;
use crate::level::StressLevel;
use crate::resolver::{resolve, ResolverOutcome};
use crate::rule::RuleBase;
use crate::screening::{ScreeningOutcome, ScreeningRules};
use crate::subject::{ResponseSet, Section, SubjectRecord};

/// Unique identifier for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(Uuid);

impl EvaluationId {
    /// Creates a new random evaluation ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EvaluationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The full result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Evaluation identifier.
    pub id: EvaluationId,
    /// When the evaluation ran.
    pub evaluated_at: DateTime<Utc>,

    /// The reconciled verdict.
    pub final_classification: StressLevel,
    /// All facts held at the resolver's fixpoint, sorted by token.
    pub derived_facts: Vec<Fact>,
    /// Fired rules from both paths: resolver rule ids, then screening rule
    /// names, each in firing order.
    pub fired_rule_trace: Vec<String>,
    /// Advice texts for the derived recommendation facts.
    pub recommendations: Vec<String>,
    /// Guidance paragraph for the final verdict.
    pub advice: String,
    /// Screening explanations, bucketed by section.
    pub section_explanations: BTreeMap<Section, Vec<String>>,
    /// Answer sum (unanswered attributes default 1).
    pub total_score: i64,
    /// Maximum attainable answer sum.
    pub max_score: i64,

    /// The resolver's path, for audit.
    pub resolver: ResolverOutcome,
    /// The screening path, for audit.
    pub screening: ScreeningOutcome,
}

/// The rule-driven stress assessment engine.
///
/// # Examples
///
/// ```
/// use stresslens::{Engine, ResponseSet, StressLevel};
///
/// let engine = Engine::standard();
/// let responses = ResponseSet::from_pairs([
///     ("sleep_quality", 5),
///     ("irritability", 5),
///     ("study_load", 5),
/// ])?;
///
/// let evaluation = engine.evaluate(&responses);
/// assert_eq!(evaluation.final_classification, StressLevel::High);
/// assert!(!evaluation.recommendations.is_empty());
/// # Ok::<(), stresslens::StressError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    rules: RuleBase,
    screening: ScreeningRules,
    advice: AdviceTable,
}

impl Engine {
    /// Creates an engine from already-validated components.
    #[must_use]
    pub fn new(rules: RuleBase, screening: ScreeningRules, advice: AdviceTable) -> Self {
        Self {
            rules,
            screening,
            advice,
        }
    }

    /// An engine with the built-in rule sets and advice table.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(
            RuleBase::standard(),
            ScreeningRules::standard(),
            AdviceTable::standard(),
        )
    }

    /// The derivation rule base.
    #[must_use]
    pub fn rules(&self) -> &RuleBase {
        &self.rules
    }

    /// The screening rule set.
    #[must_use]
    pub fn screening(&self) -> &ScreeningRules {
        &self.screening
    }

    /// Evaluates one validated response set.
    ///
    /// Pure and total: the same responses always produce the same verdict,
    /// trace, and recommendations, and no error is possible past the input
    /// boundary.
    #[must_use]
    pub fn evaluate(&self, responses: &ResponseSet) -> Evaluation {
        let store = responses.to_fact_store();
        let resolver = resolve(&self.rules, store);

        let mut record = SubjectRecord::new(responses.clone());
        let screening = self.screening.run(&mut record);

        let final_classification =
            reconcile(resolver.classification, screening.classification);
        debug!(
            resolver = %resolver.classification,
            baseline = %screening.classification,
            %final_classification,
            "reconciled verdict"
        );

        let recommendations = self.advice.advice_for_facts(&resolver.facts);
        let advice = AdviceTable::level_summary(final_classification).to_string();

        let mut fired_rule_trace: Vec<String> =
            resolver.fired.iter().map(|f| f.id.clone()).collect();
        fired_rule_trace.extend(screening.fired.iter().cloned());

        Evaluation {
            id: EvaluationId::new(),
            evaluated_at: Utc::now(),
            final_classification,
            derived_facts: resolver.facts.clone(),
            fired_rule_trace,
            recommendations,
            advice,
            section_explanations: record.sections,
            total_score: screening.total_score,
            max_score: screening.max_score,
            resolver,
            screening,
        }
    }

    /// Validates a raw JSON answer object and evaluates it.
    ///
    /// This is the whole error surface: malformed input is rejected here
    /// with the offending key named, and evaluation itself cannot fail.
    pub fn evaluate_json(&self, raw: &serde_json::Value) -> StressResult<Evaluation> {
        let responses = ResponseSet::from_json(raw)?;
        Ok(self.evaluate(&responses))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Reconciliation precedence: resolver verdict unless undetermined.
#[must_use]
pub const fn reconcile(resolver: StressLevel, baseline: StressLevel) -> StressLevel {
    if resolver.is_determined() {
        resolver
    } else {
        baseline
    }
}
