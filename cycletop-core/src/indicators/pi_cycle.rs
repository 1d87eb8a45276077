//! Pi-Cycle proximity: convergence of the 111-day average with a scaled
//! 350-day average.
//!
//! The long average is scaled either by ×2 or by ÷2; both conventions are in
//! use, so the direction is always chosen explicitly by the caller.
//! The threshold is in price units of the asset, not a percentage.

use serde::{Deserialize, Serialize};

use super::sma::rolling_mean;

pub const FAST_WINDOW: usize = 111;
pub const SLOW_WINDOW: usize = 350;
pub const DEFAULT_THRESHOLD: f64 = 1000.0;

pub const GAP_COLUMN: &str = "pi_cycle_gap";
pub const PROXIMITY_FLAG: &str = "pi_cycle_proximity";

/// Direction in which the 350-day average is scaled before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiCycleScale {
    /// MA350 × 2
    Double,
    /// MA350 ÷ 2
    Halve,
}

impl PiCycleScale {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Double => value * 2.0,
            Self::Halve => value / 2.0,
        }
    }

    /// Column name of the scaled long average.
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Double => "sma_350_x2",
            Self::Halve => "sma_350_half",
        }
    }
}

/// Output of the proximity computation.
#[derive(Debug, Clone, PartialEq)]
pub struct PiCycleSeries {
    pub scaled_slow: Vec<f64>,
    /// |MA111 - scaled MA350|, NaN where either side is undefined.
    pub gap: Vec<f64>,
    /// True where the gap is defined and below the threshold.
    pub proximity: Vec<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiCycle {
    pub threshold: f64,
    pub scale: PiCycleScale,
}

impl PiCycle {
    pub fn new(threshold: f64, scale: PiCycleScale) -> Self {
        Self { threshold, scale }
    }

    /// Compute from raw closes.
    pub fn compute(&self, closes: &[f64]) -> PiCycleSeries {
        let fast = rolling_mean(closes, FAST_WINDOW);
        let slow = rolling_mean(closes, SLOW_WINDOW);
        self.from_averages(&fast, &slow)
    }

    /// Compute from already-aligned 111- and 350-period averages.
    pub fn from_averages(&self, fast: &[f64], slow: &[f64]) -> PiCycleSeries {
        debug_assert_eq!(fast.len(), slow.len());

        let scaled_slow: Vec<f64> = slow.iter().map(|&s| self.scale.apply(s)).collect();
        let gap: Vec<f64> = fast
            .iter()
            .zip(&scaled_slow)
            .map(|(&f, &s)| (f - s).abs())
            .collect();
        // NaN < threshold is false, so undefined positions are never in proximity.
        let proximity = gap.iter().map(|&g| g < self.threshold).collect();

        PiCycleSeries {
            scaled_slow,
            gap,
            proximity,
        }
    }
}
