//! The condition language for derivation rules.
//!
//! Conditions are data, not closures: a rule's antecedent can be inspected,
//! printed, and tested without running the resolver. Three families exist:
//! presence, absence, and numeric tests against a metric slot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fact::{Fact, Metric};
use crate::store::FactStore;

/// A comparison expression over a metric value.
///
/// Range membership is spelled as a conjunction, e.g. `3.0 <= v < 4.0` is
/// `NumericTest::all(vec![NumericTest::Ge(3.0), NumericTest::Lt(4.0)])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum NumericTest {
    /// `v >= bound`
    Ge(f64),
    /// `v > bound`
    Gt(f64),
    /// `v < bound`
    Lt(f64),
    /// `v <= bound`
    Le(f64),
    /// Every sub-test must hold.
    All(Vec<NumericTest>),
}

impl NumericTest {
    /// Conjunction of tests.
    #[must_use]
    pub fn all(tests: Vec<NumericTest>) -> Self {
        Self::All(tests)
    }

    /// Half-open range `min <= v < max`.
    #[must_use]
    pub fn in_range(min: f64, max: f64) -> Self {
        Self::All(vec![Self::Ge(min), Self::Lt(max)])
    }

    /// Half-open range `min < v <= max`.
    #[must_use]
    pub fn in_range_left_open(min: f64, max: f64) -> Self {
        Self::All(vec![Self::Gt(min), Self::Le(max)])
    }

    /// Evaluates the test against a value.
    #[must_use]
    pub fn holds(&self, value: f64) -> bool {
        match self {
            Self::Ge(bound) => value >= *bound,
            Self::Gt(bound) => value > *bound,
            Self::Lt(bound) => value < *bound,
            Self::Le(bound) => value <= *bound,
            Self::All(tests) => tests.iter().all(|t| t.holds(value)),
        }
    }
}

impl fmt::Display for NumericTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ge(b) => write!(f, ">= {b}"),
            Self::Gt(b) => write!(f, "> {b}"),
            Self::Lt(b) => write!(f, "< {b}"),
            Self::Le(b) => write!(f, "<= {b}"),
            Self::All(tests) => {
                let parts: Vec<String> = tests.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(" and "))
            }
        }
    }
}

/// A single predicate over the fact store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Fact must be held.
    FactPresent {
        /// The required fact.
        fact: Fact,
    },

    /// Fact must be absent.
    FactAbsent {
        /// The forbidden fact.
        fact: Fact,
    },

    /// Metric slot must hold some value, regardless of what it is.
    MetricPresent {
        /// The required metric.
        metric: Metric,
    },

    /// Metric slot must be empty.
    MetricAbsent {
        /// The forbidden metric.
        metric: Metric,
    },

    /// Metric slot must hold a value satisfying the test.
    ///
    /// An empty slot fails the test.
    MetricTest {
        /// The metric under test.
        metric: Metric,
        /// The comparison to satisfy.
        test: NumericTest,
    },
}

impl Condition {
    /// Requires `fact` to be held.
    #[must_use]
    pub const fn present(fact: Fact) -> Self {
        Self::FactPresent { fact }
    }

    /// Requires `fact` to be absent.
    #[must_use]
    pub const fn absent(fact: Fact) -> Self {
        Self::FactAbsent { fact }
    }

    /// Requires `metric` to hold a value.
    #[must_use]
    pub const fn metric_present(metric: Metric) -> Self {
        Self::MetricPresent { metric }
    }

    /// Requires `metric` to be unset.
    #[must_use]
    pub const fn metric_absent(metric: Metric) -> Self {
        Self::MetricAbsent { metric }
    }

    /// Requires `metric` to satisfy `test`.
    #[must_use]
    pub const fn metric_test(metric: Metric, test: NumericTest) -> Self {
        Self::MetricTest { metric, test }
    }

    /// Evaluates the condition against the current store state.
    #[must_use]
    pub fn holds(&self, store: &FactStore) -> bool {
        match self {
            Self::FactPresent { fact } => store.has_fact(*fact),
            Self::FactAbsent { fact } => !store.has_fact(*fact),
            Self::MetricPresent { metric } => store.has_metric(*metric),
            Self::MetricAbsent { metric } => !store.has_metric(*metric),
            Self::MetricTest { metric, test } => {
                store.metric(*metric).is_some_and(|v| test.holds(v))
            }
        }
    }

    /// Returns true if this condition is negative (an absence check).
    ///
    /// The resolver's soundness argument hinges on the targets of these
    /// never being retracted once present.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        matches!(self, Self::FactAbsent { .. } | Self::MetricAbsent { .. })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FactPresent { fact } => write!(f, "{fact}"),
            Self::FactAbsent { fact } => write!(f, "not {fact}"),
            Self::MetricPresent { metric } => write!(f, "{metric} set"),
            Self::MetricAbsent { metric } => write!(f, "{metric} unset"),
            Self::MetricTest { metric, test } => write!(f, "{metric} {test}"),
        }
    }
}
