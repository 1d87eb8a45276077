//! Moving Average Convergence/Divergence (MACD).
//!
//! Three lines (separate Indicator instances):
//! - Line: EMA(close, short) - EMA(close, long)
//! - Signal: EMA(line, signal)
//! - Histogram: line - signal
//!
//! EMAs are seeded at the first close, so every line is defined from index 0.

use super::ema::ema_of_series;
use super::Indicator;

pub const MACD_COLUMN: &str = "macd";
pub const SIGNAL_COLUMN: &str = "macd_signal";
pub const HISTOGRAM_COLUMN: &str = "macd_hist";

/// Which MACD line to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Line,
    Signal,
    Histogram,
}

/// All three MACD lines, index-aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Macd {
    short: usize,
    long: usize,
    signal: usize,
    output: MacdLine,
}

impl Macd {
    fn build(short: usize, long: usize, signal: usize, output: MacdLine) -> Self {
        assert!(short >= 1 && long >= 1 && signal >= 1, "MACD spans must be >= 1");
        assert!(short < long, "MACD short span must be < long span");
        Self {
            short,
            long,
            signal,
            output,
        }
    }

    pub fn line(short: usize, long: usize, signal: usize) -> Self {
        Self::build(short, long, signal, MacdLine::Line)
    }

    pub fn signal_line(short: usize, long: usize, signal: usize) -> Self {
        Self::build(short, long, signal, MacdLine::Signal)
    }

    pub fn histogram(short: usize, long: usize, signal: usize) -> Self {
        Self::build(short, long, signal, MacdLine::Histogram)
    }

    /// Compute all three lines in one pass over the closes.
    pub fn compute_all(&self, closes: &[f64]) -> MacdSeries {
        macd_of_series(closes, self.short, self.long, self.signal)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        match self.output {
            MacdLine::Line => MACD_COLUMN,
            MacdLine::Signal => SIGNAL_COLUMN,
            MacdLine::Histogram => HISTOGRAM_COLUMN,
        }
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let all = self.compute_all(closes);
        match self.output {
            MacdLine::Line => all.line,
            MacdLine::Signal => all.signal,
            MacdLine::Histogram => all.histogram,
        }
    }
}

/// MACD over an arbitrary series.
pub fn macd_of_series(values: &[f64], short: usize, long: usize, signal: usize) -> MacdSeries {
    let fast = ema_of_series(values, short);
    let slow = ema_of_series(values, long);

    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal_line = ema_of_series(&line, signal);
    let histogram = line.iter().zip(&signal_line).map(|(m, s)| m - s).collect();

    MacdSeries {
        line,
        signal: signal_line,
        histogram,
    }
}
