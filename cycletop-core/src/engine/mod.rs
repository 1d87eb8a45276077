//! Engine entry points: indicator derivation and latest-row signal scoring.
//!
//! Both steps are pure: inputs are borrowed, outputs are freshly allocated,
//! and calling either twice on the same input yields identical results.

pub mod precompute;

pub use precompute::{build_indicators, compute_indicators, compute_warmup, required_history};

use serde::Serialize;

use crate::config::{CycleTopConfig, RuleConfig};
use crate::domain::PriceSeries;
use crate::error::Result;
use crate::indicators::IndicatorSet;
use crate::signals::{SignalEvaluator, SignalReport};

/// Score the configured rule battery on the latest row of `set`.
///
/// Fails if the rule configuration is invalid or the set is empty.
pub fn evaluate_signals(set: &IndicatorSet, config: &RuleConfig) -> Result<SignalReport> {
    SignalEvaluator::from_config(config)?.evaluate(set)
}

/// Indicator set together with the report scored from it.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub indicators: IndicatorSet,
    pub report: SignalReport,
}

/// Run both steps with one configuration.
///
/// The configuration is validated as a whole first, so a rule that reads a
/// column the engine never computes is rejected rather than scored as false.
pub fn analyze(series: &PriceSeries, config: &CycleTopConfig) -> Result<Analysis> {
    config.validate()?;
    let indicators = compute_indicators(series, &config.engine)?;
    let report = evaluate_signals(&indicators, &config.signals)?;
    Ok(Analysis { indicators, report })
}
