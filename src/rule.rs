//! Fact-derivation rules and the rule base.
//!
//! Rules are an unordered set, conceptually grouped into layers: each layer
//! only reads facts and metrics producible by strictly earlier layers or by
//! the initial input. That layering is what bounds the resolver's pass count
//! and keeps negative conditions sound (see [`crate::resolver`]).
//!
//! [`RuleBase::standard`] builds the built-in stress rule set; custom rule
//! sets go through [`RuleBase::new`], which rejects structural defects
//! (duplicate ids, self-derivation, overlapping or gapped classification
//! ranges) at construction time rather than discovering them mid-evaluation.

use std::collections::BTreeMap;

use crate::condition::{Condition, NumericTest};
use crate::error::RuleBaseError;
use crate::fact::{Fact, Metric};
use crate::store::FactStore;

/// Layer a derivation rule belongs to.
///
/// Later layers depend only on conclusions of earlier layers, so the
/// resolver reaches fixpoint in at most one pass per layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Symptom combinations to severity conclusions.
    Symptom,
    /// Derived metrics (score ratio) from input metrics.
    Aggregate,
    /// Severity from the `overall` metric's value range.
    Classification,
    /// Severity from the score ratio when `overall` is unset.
    Fallback,
    /// Recommendation facts from severity conclusions.
    Recommendation,
}

/// Expression computing a rule-asserted metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricExpr {
    /// `numerator / denominator`; evaluates to `None` if either slot is
    /// unset or the denominator is zero.
    Ratio(Metric, Metric),
}

impl MetricExpr {
    /// Evaluates the expression against the current store state.
    #[must_use]
    pub fn eval(&self, store: &FactStore) -> Option<f64> {
        match self {
            Self::Ratio(num, den) => {
                let num = store.metric(*num)?;
                let den = store.metric(*den)?;
                if den == 0.0 {
                    return None;
                }
                Some(num / den)
            }
        }
    }
}

/// What a rule asserts when it fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conclusion {
    /// Assert a fact (idempotent; the rule is refracted once present).
    Fact(Fact),
    /// Assert a metric (first writer wins; the rule is skipped once set).
    Metric {
        /// Target metric slot.
        metric: Metric,
        /// Value expression, evaluated at fire time.
        expr: MetricExpr,
    },
}

/// A single condition-to-conclusion derivation rule.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivationRule {
    /// Stable identifier, recorded in the fired-rule trace.
    pub id: &'static str,
    /// Layer this rule belongs to.
    pub layer: Layer,
    /// Conjunction of conditions; all must hold.
    pub conditions: Vec<Condition>,
    /// Assertion made when the rule fires.
    pub conclusion: Conclusion,
    /// Optional human-readable justification for the trace.
    pub explanation: Option<&'static str>,
}

impl DerivationRule {
    /// Creates a fact-concluding rule.
    #[must_use]
    pub fn derive_fact(
        id: &'static str,
        layer: Layer,
        conditions: Vec<Condition>,
        fact: Fact,
    ) -> Self {
        Self {
            id,
            layer,
            conditions,
            conclusion: Conclusion::Fact(fact),
            explanation: None,
        }
    }

    /// Creates a metric-concluding rule.
    #[must_use]
    pub fn derive_metric(
        id: &'static str,
        layer: Layer,
        conditions: Vec<Condition>,
        metric: Metric,
        expr: MetricExpr,
    ) -> Self {
        Self {
            id,
            layer,
            conditions,
            conclusion: Conclusion::Metric { metric, expr },
            explanation: None,
        }
    }

    /// Attaches an explanation string.
    #[must_use]
    pub const fn with_explanation(mut self, explanation: &'static str) -> Self {
        self.explanation = Some(explanation);
        self
    }

    /// Returns true if every condition holds against the store.
    #[must_use]
    pub fn matches(&self, store: &FactStore) -> bool {
        self.conditions.iter().all(|c| c.holds(store))
    }
}

/// Immutable set of derivation rules, validated at construction.
///
/// Built once at process start and shared by reference across evaluations;
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RuleBase {
    rules: Vec<DerivationRule>,
}

impl RuleBase {
    /// Creates a rule base, rejecting structural defects.
    pub fn new(rules: Vec<DerivationRule>) -> Result<Self, RuleBaseError> {
        validate(&rules)?;
        Ok(Self { rules })
    }

    /// The built-in stress assessment rule set.
    ///
    /// Infallible: the standard rules are validated by construction and
    /// covered by the partition property tests.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(standard_rules()).expect("standard rule base is valid")
    }

    /// The rules, in registration order.
    #[must_use]
    pub fn rules(&self) -> &[DerivationRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the rule base is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleBase {
    fn default() -> Self {
        Self::standard()
    }
}

/// The built-in derivation rules, layer by layer.
fn standard_rules() -> Vec<DerivationRule> {
    use Condition as C;
    use Fact as F;

    let mut rules = vec![
        // Symptom layer: symptom combinations imply a severity conclusion.
        DerivationRule::derive_fact(
            "rule-burnout-pattern",
            Layer::Symptom,
            vec![
                C::present(F::PoorSleep),
                C::present(F::Irritability),
                C::present(F::DeadlinePressure),
            ],
            F::StressHigh,
        )
        .with_explanation("Poor sleep with irritability under deadline pressure."),
        DerivationRule::derive_fact(
            "rule-exhaustion-pattern",
            Layer::Symptom,
            vec![
                C::present(F::PersistentFatigue),
                C::present(F::DifficultyConcentrating),
            ],
            F::StressHigh,
        )
        .with_explanation("Persistent fatigue with concentration problems."),
        DerivationRule::derive_fact(
            "rule-neglect-pattern",
            Layer::Symptom,
            vec![C::present(F::SkipMeals), C::present(F::RacingThoughts)],
            F::StressHigh,
        )
        .with_explanation("Skipped meals alongside racing thoughts."),
        DerivationRule::derive_fact(
            "rule-avoidance-pattern",
            Layer::Symptom,
            vec![
                C::present(F::Procrastination),
                C::present(F::DeadlinePressure),
            ],
            F::StressModerate,
        )
        .with_explanation("Procrastination under deadline pressure."),
        DerivationRule::derive_fact(
            "rule-isolation-pattern",
            Layer::Symptom,
            vec![
                C::present(F::SocialWithdrawal),
                C::present(F::Irritability),
            ],
            F::StressModerate,
        )
        .with_explanation("Social withdrawal combined with irritability."),
        DerivationRule::derive_fact(
            "rule-minor-worry",
            Layer::Symptom,
            vec![
                C::present(F::MinorWorryOnly),
                C::absent(F::StressHigh),
                C::absent(F::StressModerate),
            ],
            F::StressLow,
        )
        .with_explanation("Minor worry with no stronger indicator."),
        // Aggregate layer: derived metrics.
        DerivationRule::derive_metric(
            "rule-score-ratio",
            Layer::Aggregate,
            vec![
                C::metric_present(Metric::TotalScore),
                C::metric_present(Metric::MaxScore),
            ],
            Metric::ScoreRatio,
            MetricExpr::Ratio(Metric::TotalScore, Metric::MaxScore),
        ),
        // Classification layer: severity from the overall score. The four
        // ranges form a strict partition of the number line.
        DerivationRule::derive_fact(
            "rule-very-high-overall",
            Layer::Classification,
            vec![C::metric_test(Metric::Overall, NumericTest::Ge(4.0))],
            F::StressVeryHigh,
        )
        .with_explanation("Overall stress score of 4.0 or above."),
        DerivationRule::derive_fact(
            "rule-high-overall",
            Layer::Classification,
            vec![C::metric_test(Metric::Overall, NumericTest::in_range(3.0, 4.0))],
            F::StressHigh,
        )
        .with_explanation("Overall stress score between 3.0 and 4.0."),
        DerivationRule::derive_fact(
            "rule-moderate-overall",
            Layer::Classification,
            vec![C::metric_test(Metric::Overall, NumericTest::in_range(2.0, 3.0))],
            F::StressModerate,
        )
        .with_explanation("Overall stress score between 2.0 and 3.0."),
        DerivationRule::derive_fact(
            "rule-low-overall",
            Layer::Classification,
            vec![C::metric_test(Metric::Overall, NumericTest::Lt(2.0))],
            F::StressLow,
        )
        .with_explanation("Overall stress score below 2.0."),
        // Fallback layer: fires only when no overall score was computed,
        // using the answer-sum ratio instead. Also a strict partition.
        DerivationRule::derive_fact(
            "rule-fallback-very-high",
            Layer::Fallback,
            vec![
                C::metric_absent(Metric::Overall),
                C::metric_test(Metric::ScoreRatio, NumericTest::Gt(0.8)),
            ],
            F::StressVeryHigh,
        )
        .with_explanation("Answer total above 80% of maximum."),
        DerivationRule::derive_fact(
            "rule-fallback-high",
            Layer::Fallback,
            vec![
                C::metric_absent(Metric::Overall),
                C::metric_test(Metric::ScoreRatio, NumericTest::in_range_left_open(0.6, 0.8)),
            ],
            F::StressHigh,
        )
        .with_explanation("Answer total above 60% of maximum."),
        DerivationRule::derive_fact(
            "rule-fallback-moderate",
            Layer::Fallback,
            vec![
                C::metric_absent(Metric::Overall),
                C::metric_test(Metric::ScoreRatio, NumericTest::in_range_left_open(0.4, 0.6)),
            ],
            F::StressModerate,
        )
        .with_explanation("Answer total above 40% of maximum."),
        DerivationRule::derive_fact(
            "rule-fallback-low",
            Layer::Fallback,
            vec![
                C::metric_absent(Metric::Overall),
                C::metric_test(Metric::ScoreRatio, NumericTest::Le(0.4)),
            ],
            F::StressLow,
        )
        .with_explanation("Answer total at or below 40% of maximum."),
    ];

    // Recommendation layer: severity conclusions imply advice facts.
    let recommendations: [(&'static str, Fact, Fact); 8] = [
        ("rule-rec-breaks", F::StressHigh, F::RecBreaks),
        ("rule-rec-counselor", F::StressHigh, F::RecCounselor),
        ("rule-rec-sleep", F::StressHigh, F::RecSleep),
        ("rule-rec-time-block", F::StressHigh, F::RecTimeBlock),
        ("rule-rec-plan", F::StressModerate, F::RecPlan),
        ("rule-rec-exercise", F::StressModerate, F::RecExercise),
        ("rule-rec-peer", F::StressModerate, F::RecPeer),
        ("rule-rec-monitor", F::StressLow, F::RecMonitor),
    ];
    for (id, severity, rec) in recommendations {
        rules.push(DerivationRule::derive_fact(
            id,
            Layer::Recommendation,
            vec![C::present(severity)],
            rec,
        ));
    }

    rules
}

/// Structural validation of a rule set.
fn validate(rules: &[DerivationRule]) -> Result<(), RuleBaseError> {
    let mut seen: Vec<&str> = Vec::with_capacity(rules.len());
    for rule in rules {
        if seen.contains(&rule.id) {
            return Err(RuleBaseError::DuplicateRuleId {
                rule: rule.id.to_string(),
            });
        }
        seen.push(rule.id);

        if let Conclusion::Fact(fact) = rule.conclusion {
            let self_deriving = rule
                .conditions
                .iter()
                .any(|c| matches!(c, Condition::FactPresent { fact: f } if *f == fact));
            if self_deriving {
                return Err(RuleBaseError::SelfDerivingRule {
                    rule: rule.id.to_string(),
                });
            }
        }
    }

    validate_partitions(rules)
}

/// Checks that severity-classification rules over each metric partition the
/// sampled value range: no overlap and no gap.
///
/// Rules are grouped by the metric they test plus their non-test guard
/// conditions, so the `overall` classification group and the ratio fallback
/// group are checked independently.
fn validate_partitions(rules: &[DerivationRule]) -> Result<(), RuleBaseError> {
    type Group<'a> = Vec<(&'a DerivationRule, &'a NumericTest)>;
    let mut groups: BTreeMap<(Metric, String), Group<'_>> = BTreeMap::new();

    for rule in rules {
        let Conclusion::Fact(fact) = rule.conclusion else {
            continue;
        };
        if fact.severity().is_none() {
            continue;
        }
        let mut tested: Option<(Metric, &NumericTest)> = None;
        let mut guards = Vec::new();
        for condition in &rule.conditions {
            match condition {
                Condition::MetricTest { metric, test } => tested = Some((*metric, test)),
                other => guards.push(other.to_string()),
            }
        }
        if let Some((metric, test)) = tested {
            groups
                .entry((metric, guards.join(" & ")))
                .or_default()
                .push((rule, test));
        }
    }

    for ((metric, _), group) in &groups {
        // Sampled sweep; the partition property must hold for every value.
        for i in -200i32..=200 {
            let value = f64::from(i) * 0.05;
            let mut matched: Option<&DerivationRule> = None;
            for &(rule, test) in group {
                if test.holds(value) {
                    if let Some(first) = matched {
                        return Err(RuleBaseError::OverlappingClassification {
                            metric: metric.to_string(),
                            value: format!("{value:.2}"),
                            first: first.id.to_string(),
                            second: rule.id.to_string(),
                        });
                    }
                    matched = Some(rule);
                }
            }
            if matched.is_none() {
                return Err(RuleBaseError::ClassificationGap {
                    metric: metric.to_string(),
                    value: format!("{value:.2}"),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_rule_base_is_valid() {
        let base = RuleBase::standard();
        assert_eq!(base.len(), 23);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let rules = vec![
            DerivationRule::derive_fact(
                "rule-x",
                Layer::Symptom,
                vec![Condition::present(Fact::PoorSleep)],
                Fact::StressLow,
            ),
            DerivationRule::derive_fact(
                "rule-x",
                Layer::Symptom,
                vec![Condition::present(Fact::Irritability)],
                Fact::StressModerate,
            ),
        ];
        assert_eq!(
            RuleBase::new(rules).unwrap_err(),
            RuleBaseError::DuplicateRuleId {
                rule: "rule-x".to_string()
            }
        );
    }

    #[test]
    fn self_deriving_rule_rejected() {
        let rules = vec![DerivationRule::derive_fact(
            "rule-loop",
            Layer::Symptom,
            vec![Condition::present(Fact::StressHigh)],
            Fact::StressHigh,
        )];
        assert!(matches!(
            RuleBase::new(rules),
            Err(RuleBaseError::SelfDerivingRule { .. })
        ));
    }

    #[test]
    fn overlapping_ranges_rejected() {
        let rules = vec![
            DerivationRule::derive_fact(
                "rule-a",
                Layer::Classification,
                vec![Condition::metric_test(Metric::Overall, NumericTest::Ge(3.0))],
                Fact::StressHigh,
            ),
            DerivationRule::derive_fact(
                "rule-b",
                Layer::Classification,
                // Overlaps rule-a on [3.0, 4.0).
                vec![Condition::metric_test(Metric::Overall, NumericTest::Lt(4.0))],
                Fact::StressLow,
            ),
        ];
        assert!(matches!(
            RuleBase::new(rules),
            Err(RuleBaseError::OverlappingClassification { .. })
        ));
    }

    #[test]
    fn gapped_ranges_rejected() {
        let rules = vec![
            DerivationRule::derive_fact(
                "rule-a",
                Layer::Classification,
                vec![Condition::metric_test(Metric::Overall, NumericTest::Ge(4.0))],
                Fact::StressHigh,
            ),
            DerivationRule::derive_fact(
                "rule-b",
                Layer::Classification,
                // Leaves [2.0, 4.0) uncovered.
                vec![Condition::metric_test(Metric::Overall, NumericTest::Lt(2.0))],
                Fact::StressLow,
            ),
        ];
        assert!(matches!(
            RuleBase::new(rules),
            Err(RuleBaseError::ClassificationGap { .. })
        ));
    }

    #[test]
    fn ratio_expression_evaluates() {
        let mut store = FactStore::new();
        store.assert_metric(Metric::TotalScore, 30.0);
        store.assert_metric(Metric::MaxScore, 100.0);
        let expr = MetricExpr::Ratio(Metric::TotalScore, Metric::MaxScore);
        assert_eq!(expr.eval(&store), Some(0.3));
    }

    #[test]
    fn ratio_with_zero_denominator_is_none() {
        let mut store = FactStore::new();
        store.assert_metric(Metric::TotalScore, 10.0);
        store.assert_metric(Metric::MaxScore, 0.0);
        let expr = MetricExpr::Ratio(Metric::TotalScore, Metric::MaxScore);
        assert_eq!(expr.eval(&store), None);
    }

    #[test]
    fn rule_matches_store() {
        let base = RuleBase::standard();
        let burnout = base
            .rules()
            .iter()
            .find(|r| r.id == "rule-burnout-pattern")
            .unwrap();

        let mut store = FactStore::new();
        store.assert_fact(Fact::PoorSleep);
        store.assert_fact(Fact::Irritability);
        assert!(!burnout.matches(&store));
        store.assert_fact(Fact::DeadlinePressure);
        assert!(burnout.matches(&store));
    }
}
