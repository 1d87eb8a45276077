//! Signal rules: named predicates over the latest indicator row.
//!
//! A predicate answers `Some(true)`, `Some(false)`, or `None` when an input it
//! needs is undefined. Rules never fail; the evaluator maps `None` to false.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::indicators::IndicatorRow;

/// Declarative rule condition, loadable from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// `indicator > threshold`
    Above { indicator: String, threshold: f64 },

    /// `indicator < threshold`
    Below { indicator: String, threshold: f64 },

    /// `left > right`, both read from the same row.
    Exceeds { left: String, right: String },

    /// Boolean flag column is set.
    Flag { indicator: String },
}

impl Condition {
    pub fn evaluate(&self, row: &IndicatorRow<'_>) -> Option<bool> {
        match self {
            Self::Above {
                indicator,
                threshold,
            } => row.value(indicator).map(|v| v > *threshold),
            Self::Below {
                indicator,
                threshold,
            } => row.value(indicator).map(|v| v < *threshold),
            Self::Exceeds { left, right } => {
                let l = row.value(left)?;
                let r = row.value(right)?;
                Some(l > r)
            }
            Self::Flag { indicator } => row.flag(indicator),
        }
    }
}

/// Serializable rule definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    #[serde(flatten)]
    pub condition: Condition,
}

impl RuleSpec {
    pub fn new(name: impl Into<String>, condition: Condition) -> Self {
        Self {
            name: name.into(),
            condition,
        }
    }
}

type CustomPredicate = dyn Fn(&IndicatorRow<'_>) -> Option<bool> + Send + Sync;

#[derive(Clone)]
enum Predicate {
    Condition(Condition),
    Custom(Arc<CustomPredicate>),
}

/// A named predicate evaluated against one aligned row.
#[derive(Clone)]
pub struct SignalRule {
    name: String,
    predicate: Predicate,
}

impl SignalRule {
    pub fn new(name: impl Into<String>, condition: Condition) -> Self {
        Self {
            name: name.into(),
            predicate: Predicate::Condition(condition),
        }
    }

    /// Rule backed by an arbitrary closure. Not serializable.
    pub fn custom<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&IndicatorRow<'_>) -> Option<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Predicate::Custom(Arc::new(predicate)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw predicate result; `None` when an input is undefined.
    pub fn evaluate(&self, row: &IndicatorRow<'_>) -> Option<bool> {
        match &self.predicate {
            Predicate::Condition(condition) => condition.evaluate(row),
            Predicate::Custom(f) => f(row),
        }
    }
}

impl From<&RuleSpec> for SignalRule {
    fn from(spec: &RuleSpec) -> Self {
        Self::new(spec.name.clone(), spec.condition.clone())
    }
}

impl fmt::Debug for SignalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("SignalRule");
        s.field("name", &self.name);
        match &self.predicate {
            Predicate::Condition(c) => s.field("condition", c),
            Predicate::Custom(_) => s.field("condition", &"<custom>"),
        };
        s.finish()
    }
}
