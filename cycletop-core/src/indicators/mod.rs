//! Concrete indicator implementations and the aligned indicator container.
//!
//! Every single-series indicator implements [`Indicator`]: closes in, a series
//! of the same length out, with `f64::NAN` wherever there is not yet enough
//! history. MACD exposes its three lines as separate named instances, keeping
//! the single-series trait unchanged. The Pi-Cycle proximity flag is derived
//! from two precomputed averages rather than implementing the trait.

pub mod distance;
pub mod ema;
pub mod macd;
pub mod pi_cycle;
pub mod rsi;
pub mod set;
pub mod sma;

pub use distance::DistanceFromMa;
pub use ema::Ema;
pub use macd::{Macd, MacdLine, MacdSeries};
pub use pi_cycle::{PiCycle, PiCycleScale, PiCycleSeries};
pub use rsi::{Rsi, RsiSmoothing};
pub use set::{IndicatorRow, IndicatorSet};
pub use sma::Sma;

/// Trait for single-series indicators.
///
/// # Look-ahead contamination guard
/// No value at index t may depend on closes at t+1 or later. Computing on a
/// prefix of the series must reproduce the same prefix of the full output.
pub trait Indicator: Send + Sync {
    /// Column name in the indicator set (e.g., "sma_200", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading positions that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole close series.
    ///
    /// Returns a `Vec<f64>` of the same length as `closes`.
    fn compute(&self, closes: &[f64]) -> Vec<f64>;
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
