//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a fixed window.
//! Lookback: window - 1 (first valid value at index window-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    window: usize,
    name: String,
}

impl Sma {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "SMA window must be >= 1");
        Self {
            window,
            name: column_name(window),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

/// Column name of the simple moving average over `window` closes.
pub fn column_name(window: usize) -> String {
    format!("sma_{window}")
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        rolling_mean(closes, self.window)
    }
}

/// Rolling arithmetic mean over `window` values.
///
/// Output[i] is NaN while fewer than `window` values exist, or while any value
/// inside the window is NaN.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if window == 0 || n < window {
        return result;
    }

    let mut sum = 0.0;
    let mut nan_in_window = 0usize;

    for i in 0..n {
        let entering = values[i];
        if entering.is_nan() {
            nan_in_window += 1;
        } else {
            sum += entering;
        }

        if i >= window {
            let leaving = values[i - window];
            if leaving.is_nan() {
                nan_in_window -= 1;
            } else {
                sum -= leaving;
            }
        }

        if i + 1 >= window && nan_in_window == 0 {
            result[i] = sum / window as f64;
        }
    }

    result
}
