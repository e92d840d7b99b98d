//! Forward-chaining resolver.
//!
//! Applies the full rule base to a fact store until a complete scan produces
//! no new assertion (fixed point). The scan is deliberately naive: rule
//! counts are in the tens, so there is no discrimination network and no
//! incremental matching, just repeated full passes.
//!
//! Soundness of negative conditions under re-scanning rests on two store
//! invariants: facts are never retracted, and rule-written metrics are first
//! writer wins. A negative condition's target can therefore appear but never
//! disappear, so a rule that fired can never be invalidated afterwards. A
//! future rule that retracts facts would silently break this; the invariant
//! is pinned by tests.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::fact::Fact;
use crate::level::StressLevel;
use crate::rule::{Conclusion, RuleBase};
use crate::store::FactStore;

/// One rule firing, recorded for the audit trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredRule {
    /// The rule's stable identifier.
    pub id: String,
    /// The rule's attached explanation, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Result of running the resolver to fixpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverOutcome {
    /// All facts held at fixpoint, sorted by token.
    pub facts: Vec<Fact>,
    /// Every firing in scan order.
    pub fired: Vec<FiredRule>,
    /// Highest-severity conclusion present, or `Undetermined`.
    pub classification: StressLevel,
    /// Number of full scan passes, including the final empty one.
    pub passes: usize,
}

/// Runs the rule base against the store until fixpoint.
///
/// Each pass scans every rule once. A fact-concluding rule is refracted once
/// its conclusion is present; a metric-concluding rule is skipped once its
/// slot is set. The pass count is bounded by the number of rule layers, so
/// the loop always terminates.
#[must_use]
pub fn resolve(rules: &RuleBase, mut store: FactStore) -> ResolverOutcome {
    let mut fired = Vec::new();
    let mut passes = 0;

    loop {
        passes += 1;
        let mut changed = false;

        for rule in rules.rules() {
            match rule.conclusion {
                Conclusion::Fact(fact) => {
                    // Refraction: never re-fire for a held conclusion.
                    if store.has_fact(fact) {
                        continue;
                    }
                    if !rule.matches(&store) {
                        continue;
                    }
                    store.assert_fact(fact);
                    trace!(rule = rule.id, fact = fact.as_str(), "derived fact");
                    fired.push(FiredRule {
                        id: rule.id.to_string(),
                        explanation: rule.explanation.map(str::to_string),
                    });
                    changed = true;
                }
                Conclusion::Metric { metric, expr } => {
                    // First writer wins: a set slot is never rewritten.
                    if store.has_metric(metric) {
                        continue;
                    }
                    if !rule.matches(&store) {
                        continue;
                    }
                    let Some(value) = expr.eval(&store) else {
                        continue;
                    };
                    store.set_metric_if_absent(metric, value);
                    trace!(rule = rule.id, metric = metric.as_str(), value, "derived metric");
                    fired.push(FiredRule {
                        id: rule.id.to_string(),
                        explanation: rule.explanation.map(str::to_string),
                    });
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }

    let classification = classify(&store);
    debug!(
        passes,
        fired = fired.len(),
        %classification,
        "resolver reached fixpoint"
    );

    ResolverOutcome {
        facts: store.snapshot(),
        fired,
        classification,
        passes,
    }
}

/// The highest-severity conclusion fact held by the store.
#[must_use]
pub fn classify(store: &FactStore) -> StressLevel {
    for level in StressLevel::VERDICTS {
        if let Some(fact) = Fact::for_severity(level) {
            if store.has_fact(fact) {
                return level;
            }
        }
    }
    StressLevel::Undetermined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::Metric;

    fn store_with(facts: &[Fact]) -> FactStore {
        let mut store = FactStore::new();
        for &fact in facts {
            store.assert_fact(fact);
        }
        store
    }

    #[test]
    fn empty_store_stays_empty_without_metrics() {
        let outcome = resolve(&RuleBase::standard(), FactStore::new());
        assert!(outcome.facts.is_empty());
        assert!(outcome.fired.is_empty());
        assert_eq!(outcome.classification, StressLevel::Undetermined);
        assert_eq!(outcome.passes, 1);
    }

    #[test]
    fn burnout_chain_derives_high_and_recommendations() {
        let store = store_with(&[Fact::PoorSleep, Fact::Irritability, Fact::DeadlinePressure]);
        let outcome = resolve(&RuleBase::standard(), store);

        assert!(outcome.facts.contains(&Fact::StressHigh));
        assert!(outcome.facts.contains(&Fact::RecBreaks));
        assert!(outcome.facts.contains(&Fact::RecCounselor));
        assert!(outcome.facts.contains(&Fact::RecSleep));
        assert!(outcome.facts.contains(&Fact::RecTimeBlock));
        assert_eq!(outcome.classification, StressLevel::High);
    }

    #[test]
    fn minor_worry_blocked_by_stronger_conclusion() {
        // Moderate is derivable, so the minor-worry rule's negative
        // conditions keep stress_low out.
        let store = store_with(&[
            Fact::MinorWorryOnly,
            Fact::SocialWithdrawal,
            Fact::Irritability,
        ]);
        let outcome = resolve(&RuleBase::standard(), store);

        assert!(outcome.facts.contains(&Fact::StressModerate));
        assert!(!outcome.facts.contains(&Fact::StressLow));
        assert_eq!(outcome.classification, StressLevel::Moderate);
    }

    #[test]
    fn minor_worry_fires_when_alone() {
        let store = store_with(&[Fact::MinorWorryOnly]);
        let outcome = resolve(&RuleBase::standard(), store);

        assert!(outcome.facts.contains(&Fact::StressLow));
        assert!(outcome.facts.contains(&Fact::RecMonitor));
        assert_eq!(outcome.classification, StressLevel::Low);
    }

    #[test]
    fn overall_metric_drives_classification() {
        let mut store = FactStore::new();
        store.assert_metric(Metric::Overall, 4.2);
        let outcome = resolve(&RuleBase::standard(), store);

        assert!(outcome.facts.contains(&Fact::StressVeryHigh));
        assert_eq!(outcome.classification, StressLevel::VeryHigh);
        assert!(outcome.fired.iter().any(|f| f.id == "rule-very-high-overall"));
    }

    #[test]
    fn fallback_fires_only_without_overall() {
        let mut store = FactStore::new();
        store.assert_metric(Metric::TotalScore, 90.0);
        store.assert_metric(Metric::MaxScore, 100.0);
        let outcome = resolve(&RuleBase::standard(), store);

        assert!(outcome.fired.iter().any(|f| f.id == "rule-score-ratio"));
        assert!(outcome.fired.iter().any(|f| f.id == "rule-fallback-very-high"));
        assert_eq!(outcome.classification, StressLevel::VeryHigh);

        // With overall present the fallback family stays silent.
        let mut store = FactStore::new();
        store.assert_metric(Metric::Overall, 1.0);
        store.assert_metric(Metric::TotalScore, 90.0);
        store.assert_metric(Metric::MaxScore, 100.0);
        let outcome = resolve(&RuleBase::standard(), store);
        assert!(outcome.fired.iter().all(|f| !f.id.starts_with("rule-fallback")));
        assert_eq!(outcome.classification, StressLevel::Low);
    }

    #[test]
    fn classification_takes_highest_severity() {
        let store = store_with(&[Fact::StressLow, Fact::StressModerate, Fact::StressHigh]);
        assert_eq!(classify(&store), StressLevel::High);
    }

    #[test]
    fn fixpoint_is_idempotent() {
        let store = store_with(&[Fact::PoorSleep, Fact::Irritability, Fact::DeadlinePressure]);
        let first = resolve(&RuleBase::standard(), store);

        let mut closure = FactStore::new();
        for &fact in &first.facts {
            closure.assert_fact(fact);
        }
        let second = resolve(&RuleBase::standard(), closure);
        assert_eq!(second.facts, first.facts);
        assert!(second.fired.is_empty());
        assert_eq!(second.passes, 1);
    }
}
