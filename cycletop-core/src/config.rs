//! Serializable engine and rule configuration.
//!
//! Everything tunable lives here: moving-average windows, oscillator periods,
//! the Pi-Cycle block, the rule battery, the scoring mode and the
//! classification thresholds. Configs deserialize from TOML and must pass
//! `validate()` before use; the engine entry points call it themselves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{InvalidInputError, Result};
use crate::indicators::pi_cycle::{self, PiCycleScale};
use crate::indicators::set::CLOSE_COLUMN;
use crate::indicators::{distance, macd, rsi, sma, RsiSmoothing};
use crate::signals::{ClassificationThresholds, Condition, RuleSpec, ScoringMode};

/// Indicator computation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simple moving-average windows to compute.
    pub ma_windows: BTreeSet<usize>,
    /// Windows for which a distance-from-average column is emitted.
    /// Each must be a computed moving-average window.
    pub distance_windows: BTreeSet<usize>,
    pub rsi: RsiConfig,
    pub macd: MacdConfig,
    /// Absent unless the integrator opts in and names a scale direction.
    pub pi_cycle: Option<PiCycleConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ma_windows: [50, 111, 200, 350].into_iter().collect(),
            distance_windows: [200].into_iter().collect(),
            rsi: RsiConfig::default(),
            macd: MacdConfig::default(),
            pi_cycle: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiConfig {
    pub period: usize,
    pub smoothing: RsiSmoothing,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            period: 14,
            smoothing: RsiSmoothing::Simple,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdConfig {
    pub short: usize,
    pub long: usize,
    pub signal: usize,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            short: 12,
            long: 26,
            signal: 9,
        }
    }
}

/// Pi-Cycle settings. `scale` has no default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PiCycleConfig {
    /// Price-unit distance under which the two averages count as converged.
    #[serde(default = "default_pi_threshold")]
    pub threshold: f64,
    pub scale: PiCycleScale,
}

fn default_pi_threshold() -> f64 {
    pi_cycle::DEFAULT_THRESHOLD
}

impl PiCycleConfig {
    pub fn new(scale: PiCycleScale) -> Self {
        Self {
            threshold: pi_cycle::DEFAULT_THRESHOLD,
            scale,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ma_windows.contains(&0) {
            return invalid("moving-average windows must be positive");
        }
        let computed = self.effective_ma_windows();
        if let Some(w) = self
            .distance_windows
            .iter()
            .find(|w| !computed.contains(w))
        {
            return invalid(format!(
                "distance window {w} has no matching moving-average window"
            ));
        }
        if self.rsi.period == 0 {
            return invalid("rsi period must be positive");
        }
        let m = &self.macd;
        if m.short == 0 || m.long == 0 || m.signal == 0 {
            return invalid("macd spans must be positive");
        }
        if m.short >= m.long {
            return invalid(format!(
                "macd short span ({}) must be < long span ({})",
                m.short, m.long
            ));
        }
        if let Some(pi) = &self.pi_cycle {
            if !(pi.threshold.is_finite() && pi.threshold > 0.0) {
                return invalid(format!(
                    "pi-cycle threshold must be a positive number, got {}",
                    pi.threshold
                ));
            }
        }
        Ok(())
    }

    /// Windows actually computed: the configured set plus Pi-Cycle's sources.
    pub fn effective_ma_windows(&self) -> BTreeSet<usize> {
        let mut windows = self.ma_windows.clone();
        if self.pi_cycle.is_some() {
            windows.insert(pi_cycle::FAST_WINDOW);
            windows.insert(pi_cycle::SLOW_WINDOW);
        }
        windows
    }

    /// Numeric columns `compute_indicators` will emit, plus `close`.
    pub fn column_names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self
            .effective_ma_windows()
            .into_iter()
            .map(sma::column_name)
            .collect();
        names.extend(self.distance_windows.iter().map(|&w| distance::column_name(w)));
        names.insert(rsi::column_name(self.rsi.period));
        for column in [
            macd::MACD_COLUMN,
            macd::SIGNAL_COLUMN,
            macd::HISTOGRAM_COLUMN,
            CLOSE_COLUMN,
        ] {
            names.insert(column.to_string());
        }
        if let Some(pi) = &self.pi_cycle {
            names.insert(pi.scale.column_name().to_string());
            names.insert(pi_cycle::GAP_COLUMN.to_string());
        }
        names
    }

    /// Flag columns `compute_indicators` will emit.
    pub fn flag_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        if self.pi_cycle.is_some() {
            names.insert(pi_cycle::PROXIMITY_FLAG.to_string());
        }
        names
    }
}

/// Rule battery, scoring mode and classification thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<RuleSpec>,
    #[serde(default)]
    pub scoring: ScoringMode,
    /// Defaults to the reference thresholds of the active scoring mode.
    #[serde(default)]
    thresholds: Option<ClassificationThresholds>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::market_top()
    }
}

impl RuleConfig {
    pub fn new(
        rules: Vec<RuleSpec>,
        scoring: ScoringMode,
        thresholds: ClassificationThresholds,
    ) -> Self {
        Self {
            rules,
            scoring,
            thresholds: Some(thresholds),
        }
    }

    /// Reference market-top battery for the default engine, in count mode
    /// (≥3 ALERT, ≥2 CAUTION).
    pub fn market_top() -> Self {
        Self::market_top_for(&EngineConfig::default())
    }

    /// Reference market-top battery restricted to the columns `engine` emits.
    pub fn market_top_for(engine: &EngineConfig) -> Self {
        Self::new(
            market_top_rules(engine),
            ScoringMode::Count,
            ClassificationThresholds::count_default(),
        )
    }

    /// Thresholds in effect, falling back to the scoring mode's reference pair.
    pub fn thresholds(&self) -> ClassificationThresholds {
        self.thresholds.unwrap_or(match self.scoring {
            ScoringMode::Count => ClassificationThresholds::count_default(),
            ScoringMode::Percentage => ClassificationThresholds::percentage_default(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        let t = self.thresholds();
        if t.alert.is_nan() || t.caution.is_nan() {
            return invalid("classification thresholds must be numbers");
        }
        if t.caution > t.alert {
            return invalid(format!(
                "caution threshold ({}) must not exceed alert threshold ({})",
                t.caution, t.alert
            ));
        }
        if self.scoring == ScoringMode::Percentage && (t.alert > 100.0 || t.caution < 0.0) {
            return invalid("percentage thresholds must lie within 0..=100");
        }
        let mut seen = BTreeSet::new();
        for rule in &self.rules {
            if rule.name.is_empty() {
                return invalid("rule names must not be empty");
            }
            if !seen.insert(rule.name.as_str()) {
                return invalid(format!("duplicate rule name '{}'", rule.name));
            }
        }
        Ok(())
    }

    /// Content hash of the rule configuration (blake3 over canonical JSON).
    ///
    /// Two reports with the same hash were scored by the same battery on the
    /// same scale, so their scores are comparable.
    pub fn rules_hash(&self) -> String {
        let canonical = Self {
            rules: self.rules.clone(),
            scoring: self.scoring,
            thresholds: Some(self.thresholds()),
        };
        // Plain data with string keys; serialization cannot fail.
        let json = serde_json::to_string(&canonical).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// Full configuration: indicator engine plus signal rules.
///
/// When the `signals` table names no rules, the market-top battery is built
/// from the engine section, so it only reads columns that will exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCycleTopConfig")]
pub struct CycleTopConfig {
    pub engine: EngineConfig,
    pub signals: RuleConfig,
}

impl Default for CycleTopConfig {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[derive(Deserialize)]
struct RawCycleTopConfig {
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    signals: RawRuleConfig,
}

#[derive(Default, Deserialize)]
struct RawRuleConfig {
    rules: Option<Vec<RuleSpec>>,
    #[serde(default)]
    scoring: ScoringMode,
    thresholds: Option<ClassificationThresholds>,
}

impl From<RawCycleTopConfig> for CycleTopConfig {
    fn from(raw: RawCycleTopConfig) -> Self {
        let rules = raw
            .signals
            .rules
            .unwrap_or_else(|| market_top_rules(&raw.engine));
        Self {
            signals: RuleConfig {
                rules,
                scoring: raw.signals.scoring,
                thresholds: raw.signals.thresholds,
            },
            engine: raw.engine,
        }
    }
}

impl CycleTopConfig {
    /// `engine` with the market-top battery built for it.
    pub fn new(engine: EngineConfig) -> Self {
        Self {
            signals: RuleConfig::market_top_for(&engine),
            engine,
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| InvalidInputError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| InvalidInputError::ConfigParse(e.to_string()))
    }

    /// Validate both sections, then check that every rule reads a column the
    /// engine will emit. An unknown name would only ever be undefined.
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.signals.validate()?;

        let columns = self.engine.column_names();
        let flags = self.engine.flag_names();
        for rule in &self.signals.rules {
            let (numeric, flag): (Vec<&String>, Option<&String>) = match &rule.condition {
                Condition::Above { indicator, .. } | Condition::Below { indicator, .. } => {
                    (vec![indicator], None)
                }
                Condition::Exceeds { left, right } => (vec![left, right], None),
                Condition::Flag { indicator } => (Vec::new(), Some(indicator)),
            };
            if let Some(name) = numeric.into_iter().find(|n| !columns.contains(*n)) {
                return invalid(format!(
                    "rule '{}' reads column '{name}', which the engine does not compute",
                    rule.name
                ));
            }
            if let Some(name) = flag.filter(|f| !flags.contains(*f)) {
                return invalid(format!(
                    "rule '{}' reads flag '{name}', which the engine does not compute",
                    rule.name
                ));
            }
        }
        Ok(())
    }
}

/// Reference market-top battery: overbought RSI, price stretched far above the
/// 200-day average, MACD rolling over, and Pi-Cycle convergence.
///
/// The RSI rule follows the configured period. The distance rule needs a
/// 200-day distance column and the Pi-Cycle rule needs Pi-Cycle enabled;
/// each is left out otherwise.
fn market_top_rules(engine: &EngineConfig) -> Vec<RuleSpec> {
    let mut rules = vec![RuleSpec::new(
        "rsi_overbought",
        Condition::Above {
            indicator: rsi::column_name(engine.rsi.period),
            threshold: 70.0,
        },
    )];
    if engine.distance_windows.contains(&200) {
        rules.push(RuleSpec::new(
            "extended_above_ma200",
            Condition::Above {
                indicator: distance::column_name(200),
                threshold: 100.0,
            },
        ));
    }
    rules.push(RuleSpec::new(
        "macd_bearish",
        Condition::Exceeds {
            left: macd::SIGNAL_COLUMN.into(),
            right: macd::MACD_COLUMN.into(),
        },
    ));
    if engine.pi_cycle.is_some() {
        rules.push(RuleSpec::new(
            "pi_cycle_proximity",
            Condition::Flag {
                indicator: pi_cycle::PROXIMITY_FLAG.into(),
            },
        ));
    }
    rules
}

fn default_rules() -> Vec<RuleSpec> {
    market_top_rules(&EngineConfig::default())
}

fn invalid(msg: impl Into<String>) -> Result<()> {
    Err(InvalidInputError::InvalidConfig(msg.into()))
}
