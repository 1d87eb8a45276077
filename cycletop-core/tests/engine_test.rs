//! End-to-end tests for the two engine entry points.
//!
//! Covers the concrete scenarios the engine must reproduce exactly (price
//! spike against MA200, constant prices, steady uptrend, exponential bull
//! run), scoring in both modes, classification, idempotence, and the error
//! paths at the boundary.

use chrono::NaiveDate;
use cycletop_core::engine::required_history;
use cycletop_core::{
    analyze, compute_indicators, evaluate_signals, AlertLevel, ClassificationThresholds,
    Condition, CycleTopConfig, EngineConfig, IndicatorSet, InvalidInputError, PiCycleConfig,
    PiCycleScale, PricePoint, PriceSeries, RawPrice, RuleConfig, RuleSpec, Score, ScoringMode,
};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2017, 1, 1).unwrap()
}

fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(start(), closes).unwrap()
}

fn last(set: &IndicatorSet, name: &str) -> f64 {
    let values = set
        .series(name)
        .unwrap_or_else(|| panic!("missing column {name}"));
    values[values.len() - 1]
}

fn assert_close(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() < eps,
        "expected {expected}, got {actual} (eps {eps})"
    );
}

/// Bit-level equality of two sets, NaN positions included.
fn assert_sets_identical(a: &IndicatorSet, b: &IndicatorSet) {
    assert_eq!(a.dates(), b.dates());
    let names_a: Vec<&str> = a.series_names().collect();
    let names_b: Vec<&str> = b.series_names().collect();
    assert_eq!(names_a, names_b);
    for name in names_a {
        let bits_a: Vec<u64> = a.series(name).unwrap().iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u64> = b.series(name).unwrap().iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b, "column {name} differs");
    }
    for name in a.flag_names() {
        assert_eq!(a.flag_series(name), b.flag_series(name));
    }
}

/// Default engine with Pi-Cycle enabled and the battery built for it.
fn pi_cycle_config(scale: PiCycleScale) -> CycleTopConfig {
    let mut engine = EngineConfig::default();
    engine.pi_cycle = Some(PiCycleConfig::new(scale));
    CycleTopConfig::new(engine)
}

/// +1 % per day for 400 days, then five days of -0.1 %.
fn rally_then_pause() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..400).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
    for _ in 0..5 {
        let last = closes[closes.len() - 1];
        closes.push(last * 0.999);
    }
    closes
}

fn above(name: &str, indicator: &str, threshold: f64) -> RuleSpec {
    RuleSpec::new(
        name,
        Condition::Above {
            indicator: indicator.into(),
            threshold,
        },
    )
}

// ──────────────────────────────────────────────
// Concrete scenarios
// ──────────────────────────────────────────────

#[test]
fn spike_against_ma200() {
    init_tracing();
    // 199 flat closes, then a spike to 300: the last 200 closes average 101.
    let mut closes = vec![100.0; 199];
    closes.push(300.0);
    let set = compute_indicators(&series(&closes), &EngineConfig::default()).unwrap();

    let sma = set.series("sma_200").unwrap();
    assert!(sma[..199].iter().all(|v| v.is_nan()));
    assert_close(last(&set, "sma_200"), 101.0, 1e-9);
    assert_close(last(&set, "distance_sma_200"), 197.029_702_970_297, 1e-9);
}

#[test]
fn spike_with_leading_extra_point() {
    // 201 points: [100] × 199 + [100, 300]; the trailing window is still
    // 199 × 100 plus the spike.
    let mut closes = vec![100.0; 199];
    closes.extend([100.0, 300.0]);
    let set = compute_indicators(&series(&closes), &EngineConfig::default()).unwrap();
    assert_close(last(&set, "sma_200"), 101.0, 1e-9);
    assert_close(last(&set, "distance_sma_200"), 197.029_702_970_297, 1e-9);
}

#[test]
fn constant_prices_leave_rsi_undefined() {
    let set = compute_indicators(&series(&[250.0; 60]), &EngineConfig::default()).unwrap();
    assert!(set.series("rsi_14").unwrap().iter().all(|v| v.is_nan()));
    // MACD is still defined everywhere, and flat.
    assert!(set.series("macd").unwrap().iter().all(|v| v.abs() < 1e-9));
}

#[test]
fn steady_uptrend() {
    let closes: Vec<f64> = (0..400).map(|i| 100.0 + i as f64).collect();
    let set = compute_indicators(&series(&closes), &EngineConfig::default()).unwrap();

    assert!(last(&set, "macd") > 0.0);
    assert!(last(&set, "distance_sma_200") > 0.0);
    assert_close(last(&set, "rsi_14"), 100.0, 1e-9);
    for name in ["sma_50", "sma_111", "sma_200", "sma_350"] {
        assert!(!last(&set, name).is_nan(), "{name} should be defined");
    }
}

#[test]
fn macd_defined_from_first_point() {
    let set = compute_indicators(&series(&[10.0, 12.0, 11.0]), &EngineConfig::default()).unwrap();
    for name in ["macd", "macd_signal", "macd_hist"] {
        assert!(set.series(name).unwrap().iter().all(|v| !v.is_nan()));
    }
}

#[test]
fn exponential_bull_run_scores_alert_with_doubled_pi_cycle() {
    init_tracing();
    // +1 % per day for 400 days: RSI 100, ~129 % above MA200,
    // MA111 within ~260 of 2 × MA350, MACD still above its signal.
    let closes: Vec<f64> = (0..400).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
    let config = pi_cycle_config(PiCycleScale::Double);

    let analysis = analyze(&series(&closes), &config).unwrap();
    let report = &analysis.report;

    assert_eq!(report.triggered("rsi_overbought"), Some(true));
    assert_eq!(report.triggered("extended_above_ma200"), Some(true));
    assert_eq!(report.triggered("macd_bearish"), Some(false));
    assert_eq!(report.triggered("pi_cycle_proximity"), Some(true));
    assert_eq!(report.score, Score::Count(3));
    assert_eq!(report.level, AlertLevel::Alert);
    assert_eq!(report.as_of, start() + chrono::Duration::days(399));
    assert_close(report.close, closes[399], 1e-9);
}

#[test]
fn halved_pi_cycle_changes_the_outcome() {
    let closes: Vec<f64> = (0..400).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
    let config = pi_cycle_config(PiCycleScale::Halve);

    let analysis = analyze(&series(&closes), &config).unwrap();
    assert!(analysis.indicators.series("sma_350_half").is_some());
    assert_eq!(analysis.report.triggered("pi_cycle_proximity"), Some(false));
    assert_eq!(analysis.report.score, Score::Count(2));
    assert_eq!(analysis.report.level, AlertLevel::Caution);
}

#[test]
fn pi_cycle_rule_absent_when_disabled() {
    let closes: Vec<f64> = (0..400).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
    let analysis = analyze(&series(&closes), &CycleTopConfig::default()).unwrap();
    assert_eq!(analysis.report.triggered("pi_cycle_proximity"), None);
    assert_eq!(analysis.report.rule_count, 3);
    assert_eq!(analysis.report.score, Score::Count(2));
    assert_eq!(analysis.report.level, AlertLevel::Caution);
}

#[test]
fn default_percentage_config_can_reach_alert() {
    let config = CycleTopConfig::from_toml_str("[signals]\nscoring = \"percentage\"").unwrap();
    let analysis = analyze(&series(&rally_then_pause()), &config).unwrap();
    let report = &analysis.report;

    assert_eq!(
        report.triggered_names().collect::<Vec<_>>(),
        vec!["rsi_overbought", "extended_above_ma200", "macd_bearish"]
    );
    assert_eq!(report.score, Score::Percentage(100.0));
    assert_eq!(report.level, AlertLevel::Alert);
}

#[test]
fn rsi_rule_follows_configured_period() {
    let mut engine = EngineConfig::default();
    engine.rsi.period = 21;
    let analysis = analyze(&series(&rally_then_pause()), &CycleTopConfig::new(engine)).unwrap();

    let rsi = analysis.indicators.latest().unwrap().value("rsi_21").unwrap();
    assert!(rsi > 70.0, "rsi_21 = {rsi}");
    assert_eq!(analysis.report.triggered("rsi_overbought"), Some(true));
}

#[test]
fn rule_reading_uncomputed_column_is_rejected() {
    let input = series(&rally_then_pause());

    // Battery built for RSI(14), engine switched to RSI(21) afterwards.
    let mut config = CycleTopConfig::default();
    config.engine.rsi.period = 21;
    let err = analyze(&input, &config).unwrap_err();
    assert!(matches!(err, InvalidInputError::InvalidConfig(msg) if msg.contains("rsi_14")));

    // Pi-Cycle rule with Pi-Cycle disabled.
    let mut config = pi_cycle_config(PiCycleScale::Double);
    config.engine.pi_cycle = None;
    let err = analyze(&input, &config).unwrap_err();
    assert!(
        matches!(err, InvalidInputError::InvalidConfig(msg) if msg.contains("pi_cycle_proximity"))
    );
}

// ──────────────────────────────────────────────
// Scoring and classification
// ──────────────────────────────────────────────

fn three_of_four_rules() -> Vec<RuleSpec> {
    vec![
        above("rsi_hot", "rsi_14", 70.0),
        above("stretched", "distance_sma_200", 20.0),
        above("macd_positive", "macd", 0.0),
        above("impossible", "rsi_14", 100.0),
    ]
}

fn uptrend_set() -> IndicatorSet {
    let closes: Vec<f64> = (0..400).map(|i| 100.0 + i as f64).collect();
    compute_indicators(&series(&closes), &EngineConfig::default()).unwrap()
}

#[test]
fn count_and_percentage_scoring() {
    let set = uptrend_set();

    let count = RuleConfig::new(
        three_of_four_rules(),
        ScoringMode::Count,
        ClassificationThresholds::count_default(),
    );
    let report = evaluate_signals(&set, &count).unwrap();
    assert_eq!(report.score, Score::Count(3));
    assert_eq!(report.level, AlertLevel::Alert);

    let pct = RuleConfig::new(
        three_of_four_rules(),
        ScoringMode::Percentage,
        ClassificationThresholds::percentage_default(),
    );
    let report = evaluate_signals(&set, &pct).unwrap();
    assert_eq!(report.score, Score::Percentage(75.0));
    assert_eq!(report.level, AlertLevel::Caution);
}

#[test]
fn count_classification_levels() {
    let set = uptrend_set();
    let cases = [
        (3, AlertLevel::Alert),
        (2, AlertLevel::Caution),
        (1, AlertLevel::None),
    ];
    for (true_rules, expected) in cases {
        let rules: Vec<RuleSpec> = (0..true_rules)
            .map(|i| above(&format!("true_{i}"), "close", 0.0))
            .chain(std::iter::once(above("false", "close", 1e12)))
            .collect();
        let config = RuleConfig::new(
            rules,
            ScoringMode::Count,
            ClassificationThresholds::count_default(),
        );
        let report = evaluate_signals(&set, &config).unwrap();
        assert_eq!(report.score, Score::Count(true_rules));
        assert_eq!(report.level, expected, "score {true_rules}");
    }
}

#[test]
fn undefined_indicators_never_trigger() {
    // 20 points: no MA200, no MA50, RSI defined.
    let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
    let set = compute_indicators(&series(&closes), &EngineConfig::default()).unwrap();
    let rules = vec![
        above("ma200_any", "sma_200", f64::NEG_INFINITY),
        RuleSpec::new(
            "below_undefined_distance",
            Condition::Below {
                indicator: "distance_sma_200".into(),
                threshold: f64::INFINITY,
            },
        ),
        RuleSpec::new(
            "close_over_ma350",
            Condition::Exceeds {
                left: "close".into(),
                right: "sma_350".into(),
            },
        ),
        above("not_a_column", "sma_7", 0.0),
    ];
    let config = RuleConfig::new(
        rules,
        ScoringMode::Percentage,
        ClassificationThresholds::percentage_default(),
    );
    let report = evaluate_signals(&set, &config).unwrap();
    assert!(report.outcomes.iter().all(|o| !o.triggered));
    assert_eq!(report.score, Score::Percentage(0.0));
    assert_eq!(report.level, AlertLevel::None);
}

// ──────────────────────────────────────────────
// Idempotence and immutability
// ──────────────────────────────────────────────

#[test]
fn repeated_calls_are_bit_identical() {
    let closes: Vec<f64> = (0..500)
        .map(|i| 1000.0 + (i as f64 * 0.13).sin() * 80.0 + i as f64)
        .collect();
    let input = series(&closes);
    let before = input.clone();

    let config = pi_cycle_config(PiCycleScale::Double);

    let a = analyze(&input, &config).unwrap();
    let b = analyze(&input, &config).unwrap();

    assert_sets_identical(&a.indicators, &b.indicators);
    assert_eq!(a.report, b.report);
    assert_eq!(
        serde_json::to_string(&a.report).unwrap(),
        serde_json::to_string(&b.report).unwrap()
    );
    assert_eq!(input, before, "input series must not be mutated");
}

#[test]
fn report_carries_rule_fingerprint() {
    let set = uptrend_set();
    let config = RuleConfig::market_top();
    let report = evaluate_signals(&set, &config).unwrap();
    assert_eq!(report.rules_hash.as_deref(), Some(config.rules_hash().as_str()));
}

#[test]
fn report_json_roundtrip() {
    let report = evaluate_signals(&uptrend_set(), &RuleConfig::market_top()).unwrap();
    let json = serde_json::to_string(&report).unwrap();
    let back: cycletop_core::SignalReport = serde_json::from_str(&json).unwrap();
    assert_eq!(report, back);
    let level = serde_json::to_value(&report).unwrap()["level"].clone();
    assert!(["NONE", "CAUTION", "ALERT"].contains(&level.as_str().unwrap()));
}

// ──────────────────────────────────────────────
// Boundary errors
// ──────────────────────────────────────────────

#[test]
fn empty_series_is_rejected() {
    assert_eq!(
        PriceSeries::new(Vec::new()).unwrap_err(),
        InvalidInputError::EmptySeries
    );
    assert_eq!(
        PriceSeries::from_raw(&[]).unwrap_err(),
        InvalidInputError::EmptySeries
    );
}

#[test]
fn missing_close_is_rejected() {
    let raw = [
        RawPrice {
            date: start(),
            close: Some(10.0),
        },
        RawPrice {
            date: start() + chrono::Duration::days(1),
            close: None,
        },
    ];
    let err = PriceSeries::from_raw(&raw).unwrap_err();
    assert!(matches!(err, InvalidInputError::MissingClose { index: 1, .. }));
}

#[test]
fn non_numeric_close_is_rejected() {
    let err = PriceSeries::new(vec![PricePoint::new(start(), f64::NAN)]).unwrap_err();
    assert!(matches!(err, InvalidInputError::InvalidClose { .. }));
}

#[test]
fn empty_indicator_set_is_rejected() {
    let err = evaluate_signals(&IndicatorSet::default(), &RuleConfig::market_top()).unwrap_err();
    assert_eq!(err, InvalidInputError::EmptyIndicatorSet);
}

#[test]
fn malformed_configuration_is_rejected() {
    let mut engine = EngineConfig::default();
    engine.macd.short = 26;
    let err = compute_indicators(&series(&[1.0, 2.0, 3.0]), &engine).unwrap_err();
    assert!(matches!(err, InvalidInputError::InvalidConfig(_)));

    let rules = RuleConfig::new(
        vec![],
        ScoringMode::Count,
        ClassificationThresholds {
            alert: 1.0,
            caution: 2.0,
        },
    );
    let err = evaluate_signals(&uptrend_set(), &rules).unwrap_err();
    assert!(matches!(err, InvalidInputError::InvalidConfig(_)));
}

#[test]
fn zero_window_is_reported_not_panicked() {
    let mut config = EngineConfig::default();
    config.ma_windows.insert(0);
    let err = required_history(&config).unwrap_err();
    assert!(matches!(err, InvalidInputError::InvalidConfig(_)));
    let err = compute_indicators(&series(&[1.0, 2.0]), &config).unwrap_err();
    assert!(matches!(err, InvalidInputError::InvalidConfig(_)));
}

#[test]
fn single_point_series_is_usable() {
    let set = compute_indicators(&series(&[42.0]), &EngineConfig::default()).unwrap();
    assert_eq!(set.len(), 1);
    let report = evaluate_signals(&set, &RuleConfig::market_top()).unwrap();
    // Only MACD exists at one point and it is flat, so nothing triggers.
    assert_eq!(report.score, Score::Count(0));
    assert_eq!(report.level, AlertLevel::None);
}

#[test]
fn history_needed_for_defaults() {
    let config = EngineConfig::default();
    let n = required_history(&config).unwrap();
    let closes: Vec<f64> = (0..n).map(|i| 50.0 + (i % 7) as f64).collect();
    let set = compute_indicators(&series(&closes), &config).unwrap();
    let row = set.latest().unwrap();
    for name in set.series_names() {
        assert!(row.value(name).is_some(), "{name} undefined at {n} points");
    }
}
