//! Session-scoped fact store.
//!
//! One [`FactStore`] is created per evaluation request and discarded with it.
//! Facts are monotonic: once asserted they are never retracted. Metrics are
//! single-slot and may be overwritten by the input boundary, but rules write
//! them through [`FactStore::set_metric_if_absent`] (first writer wins).
//!
//! That pair of properties is what makes the resolver's naive re-scan sound
//! in the presence of negative conditions: a condition that held once can
//! never stop holding later in the same session.

use std::collections::{BTreeMap, BTreeSet};

use crate::fact::{Fact, Metric};

/// Mutable set of facts plus numeric metric slots for one evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactStore {
    facts: BTreeSet<Fact>,
    metrics: BTreeMap<Metric, f64>,
}

impl FactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asserts a fact. Idempotent; returns true if the fact was new.
    pub fn assert_fact(&mut self, fact: Fact) -> bool {
        self.facts.insert(fact)
    }

    /// Upserts a metric value, overwriting any prior value.
    ///
    /// Returns true if the slot was empty or held a different value.
    pub fn assert_metric(&mut self, metric: Metric, value: f64) -> bool {
        match self.metrics.insert(metric, value) {
            Some(prev) => prev != value,
            None => true,
        }
    }

    /// Sets a metric only if its slot is empty (first writer wins).
    ///
    /// Returns true if the value was written.
    pub fn set_metric_if_absent(&mut self, metric: Metric, value: f64) -> bool {
        if self.metrics.contains_key(&metric) {
            return false;
        }
        self.metrics.insert(metric, value);
        true
    }

    /// Returns true if the fact is currently held.
    #[must_use]
    pub fn has_fact(&self, fact: Fact) -> bool {
        self.facts.contains(&fact)
    }

    /// Current value of a metric, if set.
    #[must_use]
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }

    /// Returns true if the metric slot holds a value.
    #[must_use]
    pub fn has_metric(&self, metric: Metric) -> bool {
        self.metrics.contains_key(&metric)
    }

    /// All held facts, sorted by canonical token for deterministic output.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Fact> {
        let mut facts: Vec<Fact> = self.facts.iter().copied().collect();
        facts.sort_by_key(Fact::as_str);
        facts
    }

    /// Number of held facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if no facts are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterator over held facts in set order.
    pub fn facts(&self) -> impl Iterator<Item = Fact> + '_ {
        self.facts.iter().copied()
    }
}
