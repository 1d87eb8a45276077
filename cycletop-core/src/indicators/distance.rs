//! Distance from a moving average, in percent.
//!
//! DIST[t] = (close[t] - MA[t]) / MA[t] * 100
//! NaN where the average is undefined or zero.
//! Lookback: window - 1.

use super::sma::Sma;
use super::Indicator;

#[derive(Debug, Clone)]
pub struct DistanceFromMa {
    sma: Sma,
    name: String,
}

impl DistanceFromMa {
    pub fn new(window: usize) -> Self {
        Self {
            sma: Sma::new(window),
            name: column_name(window),
        }
    }
}

/// Column name of the distance from the `window`-period simple average.
pub fn column_name(window: usize) -> String {
    format!("distance_sma_{window}")
}

impl Indicator for DistanceFromMa {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.sma.lookback()
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        distance_from_ma(closes, &self.sma.compute(closes))
    }
}

/// Percentage distance of each close from an aligned average series.
pub fn distance_from_ma(closes: &[f64], ma: &[f64]) -> Vec<f64> {
    debug_assert_eq!(closes.len(), ma.len());
    closes
        .iter()
        .zip(ma)
        .map(|(&close, &avg)| {
            if avg.is_nan() || close.is_nan() || avg == 0.0 {
                f64::NAN
            } else {
                (close - avg) / avg * 100.0
            }
        })
        .collect()
}
