//! Signal evaluation: score the configured rule battery on the latest row.
//!
//! Undefined-safety lives here and only here: a rule whose predicate returns
//! `None` is recorded as not triggered. Individual rules carry no null-guards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::classify::{classify, AlertLevel, ClassificationThresholds};
use super::rule::SignalRule;
use crate::config::RuleConfig;
use crate::error::{InvalidInputError, Result};
use crate::indicators::IndicatorSet;

/// How rule outcomes are aggregated into one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Number of triggered rules, 0..=N.
    #[default]
    Count,
    /// 100 × triggered / N.
    Percentage,
}

/// Aggregate score, tagged with the mode that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Score {
    Count(usize),
    Percentage(f64),
}

impl Score {
    pub fn compute(mode: ScoringMode, triggered: usize, total: usize) -> Self {
        match mode {
            ScoringMode::Count => Self::Count(triggered),
            ScoringMode::Percentage if total == 0 => Self::Percentage(0.0),
            ScoringMode::Percentage => Self::Percentage(100.0 * triggered as f64 / total as f64),
        }
    }

    /// Score on its own scale, for threshold comparison.
    pub fn value(&self) -> f64 {
        match self {
            Self::Count(n) => *n as f64,
            Self::Percentage(p) => *p,
        }
    }

    pub fn mode(&self) -> ScoringMode {
        match self {
            Self::Count(_) => ScoringMode::Count,
            Self::Percentage(_) => ScoringMode::Percentage,
        }
    }
}

/// Outcome of one rule on the latest row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub name: String,
    pub triggered: bool,
}

/// Scored report for the most recent price point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub as_of: NaiveDate,
    pub close: f64,
    /// In rule declaration order.
    pub outcomes: Vec<RuleOutcome>,
    pub triggered_count: usize,
    pub rule_count: usize,
    pub score: Score,
    pub level: AlertLevel,
    /// Fingerprint of the rule configuration, when built from one.
    pub rules_hash: Option<String>,
}

impl SignalReport {
    pub fn triggered(&self, name: &str) -> Option<bool> {
        self.outcomes
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.triggered)
    }

    pub fn triggered_names(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.triggered)
            .map(|o| o.name.as_str())
    }
}

/// Ordered rule battery plus scoring and classification settings.
#[derive(Debug, Clone)]
pub struct SignalEvaluator {
    rules: Vec<SignalRule>,
    scoring: ScoringMode,
    thresholds: ClassificationThresholds,
    rules_hash: Option<String>,
}

impl SignalEvaluator {
    pub fn new(
        rules: Vec<SignalRule>,
        scoring: ScoringMode,
        thresholds: ClassificationThresholds,
    ) -> Self {
        Self {
            rules,
            scoring,
            thresholds,
            rules_hash: None,
        }
    }

    /// Build from a validated rule configuration.
    pub fn from_config(config: &RuleConfig) -> Result<Self> {
        config.validate()?;
        let rules = config.rules.iter().map(SignalRule::from).collect();
        let mut evaluator = Self::new(rules, config.scoring, config.thresholds());
        evaluator.rules_hash = Some(config.rules_hash());
        Ok(evaluator)
    }

    pub fn rules(&self) -> &[SignalRule] {
        &self.rules
    }

    pub fn scoring(&self) -> ScoringMode {
        self.scoring
    }

    /// Evaluate every rule against the latest row of `set`.
    pub fn evaluate(&self, set: &IndicatorSet) -> Result<SignalReport> {
        let row = set.latest().ok_or(InvalidInputError::EmptyIndicatorSet)?;

        let outcomes: Vec<RuleOutcome> = self
            .rules
            .iter()
            .map(|rule| {
                let raw = rule.evaluate(&row);
                debug!(rule = rule.name(), result = ?raw, "evaluated rule");
                RuleOutcome {
                    name: rule.name().to_string(),
                    triggered: raw.unwrap_or(false),
                }
            })
            .collect();

        let triggered_count = outcomes.iter().filter(|o| o.triggered).count();
        let rule_count = outcomes.len();
        let score = Score::compute(self.scoring, triggered_count, rule_count);
        let level = classify(score.value(), &self.thresholds);

        info!(
            as_of = %row.date(),
            triggered = triggered_count,
            rules = rule_count,
            score = score.value(),
            %level,
            "signal report"
        );

        Ok(SignalReport {
            as_of: row.date(),
            close: row.close(),
            outcomes,
            triggered_count,
            rule_count,
            score,
            level,
            rules_hash: self.rules_hash.clone(),
        })
    }
}
