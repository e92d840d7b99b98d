//! # StressLens - Rule-Based Stress Assessment
//!
//! StressLens classifies a subject's stress level from a fixed questionnaire
//! by running two independent rule-based strategies over the same answers
//! and reconciling their verdicts:
//!
//! - **Forward-Chaining Resolver**: condition-to-conclusion rules (including
//!   negative conditions and numeric-range guards) applied to a session
//!   fact store until no new fact can be derived.
//! - **Priority Screening Evaluator**: a single descending-priority pass
//!   over the typed attribute record, firing every matching rule and
//!   collecting categorized explanations plus a baseline score verdict.
//!
//! The resolver's verdict is authoritative unless it is `Undetermined`, in
//! which case the screening baseline stands. Every result carries the full
//! fired-rule trace of both paths for explainability.
//!
//! ## Usage
//!
//! ```rust
//! use stresslens::{Engine, ResponseSet, StressLevel};
//!
//! let engine = Engine::standard();
//!
//! let responses = ResponseSet::from_pairs([
//!     ("sleep_quality", 5),
//!     ("irritability", 5),
//!     ("study_load", 5),
//! ])?;
//!
//! let evaluation = engine.evaluate(&responses);
//! assert_eq!(evaluation.final_classification, StressLevel::High);
//! for advice in &evaluation.recommendations {
//!     println!("- {advice}");
//! }
//! # Ok::<(), stresslens::StressError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod advice;
pub mod condition;
pub mod engine;
pub mod error;
pub mod fact;
pub mod level;
pub mod resolver;
pub mod rule;
pub mod screening;
pub mod store;
pub mod subject;

// Re-export primary types at crate root for convenience
pub use advice::{AdviceEntry, AdviceTable};
pub use condition::{Condition, NumericTest};
pub use engine::{reconcile, Engine, Evaluation, EvaluationId};
pub use error::{RuleBaseError, StressError, StressResult, ValidationError};
pub use fact::{Fact, Metric};
pub use level::StressLevel;
pub use resolver::{classify, resolve, FiredRule, ResolverOutcome};
pub use rule::{Conclusion, DerivationRule, Layer, MetricExpr, RuleBase};
pub use screening::{
    AttrExpr, CmpOp, ScreenAction, ScreenRule, ScreeningOutcome, ScreeningRules,
};
pub use store::FactStore;
pub use subject::{Attribute, ResponseSet, Section, SubjectRecord, MAX_ANSWER};
