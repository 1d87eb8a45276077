//! Signal evaluation: rules, scoring, and alert classification.
//!
//! Only the most recent row of an indicator set is ever scored. Rules are
//! independent of each other; the evaluator combines their outcomes into a
//! single score and the classifier maps that score to an alert level.

pub mod classify;
pub mod evaluator;
pub mod rule;

pub use classify::{classify, AlertLevel, ClassificationThresholds};
pub use evaluator::{RuleOutcome, Score, ScoringMode, SignalEvaluator, SignalReport};
pub use rule::{Condition, RuleSpec, SignalRule};
