//! Indicator precomputation orchestration.
//!
//! Every column is computed once, over the whole series, in a single call.
//! Results are stored in one `IndicatorSet`, index-aligned with the input.

use tracing::{debug, debug_span, warn};

use crate::config::EngineConfig;
use crate::domain::PriceSeries;
use crate::error::{InvalidInputError, Result};
use crate::indicators::distance::{self, distance_from_ma};
use crate::indicators::macd::{self, Macd};
use crate::indicators::pi_cycle::{self, PiCycle};
use crate::indicators::{Indicator, IndicatorSet, Rsi, Sma};

/// Single-series indicators implied by a configuration.
///
/// MACD and the composite columns are derived separately because they are
/// built from several series at once. Fails on an invalid configuration.
pub fn build_indicators(config: &EngineConfig) -> Result<Vec<Box<dyn Indicator>>> {
    config.validate()?;

    let mut indicators: Vec<Box<dyn Indicator>> = config
        .effective_ma_windows()
        .into_iter()
        .map(|w| Box::new(Sma::new(w)) as Box<dyn Indicator>)
        .collect();
    indicators.push(Box::new(Rsi::with_smoothing(
        config.rsi.period,
        config.rsi.smoothing,
    )));
    Ok(indicators)
}

/// Compute the warmup length from a set of indicators.
///
/// The warmup is the maximum lookback across all indicators. At positions
/// inside the warmup at least one column is still undefined.
pub fn compute_warmup(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0)
}

/// Minimum series length for every configured column to be defined at the
/// latest position.
pub fn required_history(config: &EngineConfig) -> Result<usize> {
    Ok(compute_warmup(&build_indicators(config)?) + 1)
}

/// Derive the full indicator set for a price series.
///
/// Fails only on an invalid configuration; short histories produce NaN.
pub fn compute_indicators(series: &PriceSeries, config: &EngineConfig) -> Result<IndicatorSet> {
    let indicators = build_indicators(config)?;

    let _span = debug_span!("compute_indicators", points = series.len()).entered();

    let closes = series.closes();
    let n = closes.len();
    let mut set = IndicatorSet::new(series.dates(), closes.clone());

    for indicator in indicators {
        if indicator.lookback() >= n {
            warn!(
                indicator = indicator.name(),
                lookback = indicator.lookback(),
                points = n,
                "series too short; column is undefined everywhere"
            );
        }
        let values = indicator.compute(&closes);
        debug_assert_eq!(
            values.len(),
            n,
            "indicator '{}' produced {} values for {} points",
            indicator.name(),
            values.len(),
            n
        );
        debug!(indicator = indicator.name(), "computed column");
        set.insert(indicator.name(), values);
    }

    let m = &config.macd;
    let lines = Macd::line(m.short, m.long, m.signal).compute_all(&closes);
    set.insert(macd::MACD_COLUMN, lines.line);
    set.insert(macd::SIGNAL_COLUMN, lines.signal);
    set.insert(macd::HISTOGRAM_COLUMN, lines.histogram);
    debug!(short = m.short, long = m.long, signal = m.signal, "computed macd");

    for &window in &config.distance_windows {
        let ma = moving_average(&set, window)?;
        let values = distance_from_ma(&closes, ma);
        set.insert(distance::column_name(window), values);
    }

    if let Some(pi) = &config.pi_cycle {
        let fast = moving_average(&set, pi_cycle::FAST_WINDOW)?;
        let slow = moving_average(&set, pi_cycle::SLOW_WINDOW)?;
        let out = PiCycle::new(pi.threshold, pi.scale).from_averages(fast, slow);
        debug!(
            scale = ?pi.scale,
            threshold = pi.threshold,
            in_proximity = out.proximity.last().copied().unwrap_or(false),
            "computed pi-cycle"
        );
        set.insert(pi.scale.column_name(), out.scaled_slow);
        set.insert(pi_cycle::GAP_COLUMN, out.gap);
        set.insert_flag(pi_cycle::PROXIMITY_FLAG, out.proximity);
    }

    Ok(set)
}

fn moving_average(set: &IndicatorSet, window: usize) -> Result<&[f64]> {
    let name = crate::indicators::sma::column_name(window);
    set.series(&name).ok_or_else(|| {
        InvalidInputError::InvalidConfig(format!("moving average '{name}' was not computed"))
    })
}
