//! Relative Strength Index (RSI).
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period for `Simple` and `Wilder` (the first delta is undefined,
//! so the averages fill one position later than a plain rolling window would);
//! period - 1 for `Ewm`, which counts the first position as a zero move.
//!
//! Edge cases: avg_loss == 0 with gains → 100; no gains and no losses → NaN.

use serde::{Deserialize, Serialize};

use super::Indicator;

/// How gains and losses are averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiSmoothing {
    /// Rolling arithmetic mean over the last `period` deltas.
    #[default]
    Simple,
    /// Wilder smoothing seeded with the simple mean of the first `period` deltas.
    ///
    /// Differs from `Ewm` over the first few hundred positions; the two
    /// converge once the seed has decayed.
    Wilder,
    /// Exponential mean with alpha = 1 / period, seeded at the first position
    /// with a zero move. This is the `ewm(alpha=1/n, adjust=False)` convention
    /// of the common pandas TA libraries.
    Ewm,
}

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    smoothing: RsiSmoothing,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self::with_smoothing(period, RsiSmoothing::Simple)
    }

    pub fn with_smoothing(period: usize, smoothing: RsiSmoothing) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            smoothing,
            name: column_name(period),
        }
    }
}

/// Column name of the RSI over `period` deltas.
pub fn column_name(period: usize) -> String {
    format!("rsi_{period}")
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.smoothing {
            RsiSmoothing::Simple | RsiSmoothing::Wilder => self.period,
            RsiSmoothing::Ewm => self.period - 1,
        }
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();

        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];
        for i in 1..n {
            let change = closes[i] - closes[i - 1];
            if change.is_nan() {
                continue;
            }
            gains[i] = change.max(0.0);
            losses[i] = (-change).max(0.0);
        }

        let (avg_gain, avg_loss) = match self.smoothing {
            RsiSmoothing::Simple => (
                window_mean(&gains, self.period),
                window_mean(&losses, self.period),
            ),
            RsiSmoothing::Wilder => (
                wilder_mean(&gains, self.period),
                wilder_mean(&losses, self.period),
            ),
            RsiSmoothing::Ewm => (
                ewm_mean(&gains, self.period),
                ewm_mean(&losses, self.period),
            ),
        };

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| compute_rsi(g, l))
            .collect()
    }
}

/// Rolling mean of non-negative deltas in a single pass.
///
/// Alongside the running sum it counts the non-zero values in the window.
/// A window with none of them is exactly 0, so a flat window stays 0/0 even
/// after the running sum has picked up rounding residue from earlier moves.
fn window_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let mut sum = 0.0;
    let mut nonzero = 0usize;
    let mut nan_in_window = 0usize;

    for i in 0..n {
        let entering = values[i];
        if entering.is_nan() {
            nan_in_window += 1;
        } else {
            sum += entering;
            if entering != 0.0 {
                nonzero += 1;
            }
        }

        if i >= period {
            let leaving = values[i - period];
            if leaving.is_nan() {
                nan_in_window -= 1;
            } else {
                sum -= leaving;
                if leaving != 0.0 {
                    nonzero -= 1;
                }
            }
        }

        if nonzero == 0 {
            sum = 0.0;
        }

        if i + 1 >= period && nan_in_window == 0 {
            result[i] = (sum / period as f64).max(0.0);
        }
    }

    result
}

/// Wilder's running average: seed at index `period` with the simple mean of
/// values[1..=period], then avg = (avg * (period - 1) + x) / period.
/// A NaN after the seed taints the remainder.
fn wilder_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period + 1 {
        return result;
    }

    let seed_window = &values[1..=period];
    if seed_window.iter().any(|v| v.is_nan()) {
        return result;
    }
    let mut avg = seed_window.iter().sum::<f64>() / period as f64;
    result[period] = avg;

    let p = period as f64;
    for i in (period + 1)..n {
        if values[i].is_nan() {
            return result;
        }
        avg = (avg * (p - 1.0) + values[i]) / p;
        result[i] = avg;
    }

    result
}

/// Exponential mean with alpha = 1 / period, seeded at index 0.
///
/// The undefined first delta counts as a zero move. Output starts once
/// `period` positions have been seen. A later NaN taints the remainder.
fn ewm_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n == 0 {
        return result;
    }

    let alpha = 1.0 / period as f64;
    let mut avg = 0.0;
    for i in 0..n {
        let x = if i == 0 { 0.0 } else { values[i] };
        if x.is_nan() {
            return result;
        }
        avg = if i == 0 { x } else { alpha * x + (1.0 - alpha) * avg };
        if i + 1 >= period {
            result[i] = avg;
        }
    }

    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_loss == 0.0 && avg_gain == 0.0 {
        // 0/0: no movement at all inside the window
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
