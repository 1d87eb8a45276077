//! CycleTop Core: indicator derivation and market-top signal scoring.
//!
//! This crate is the pure computational core:
//! - Validated price series input
//! - Rolling statistics (simple moving averages)
//! - Oscillators (RSI, MACD)
//! - Composite indicators (distance from MA, Pi-Cycle proximity)
//! - Rule evaluation on the latest row, scoring, and alert classification
//!
//! Fetching prices and rendering results belong to the caller. Nothing here
//! performs I/O, caches, or keeps state between calls.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod signals;

pub use config::{CycleTopConfig, EngineConfig, MacdConfig, PiCycleConfig, RsiConfig, RuleConfig};
pub use domain::{PricePoint, PriceSeries, RawPrice};
pub use engine::{analyze, compute_indicators, evaluate_signals, Analysis};
pub use error::{InvalidInputError, Result};
pub use indicators::{IndicatorRow, IndicatorSet, PiCycleScale, RsiSmoothing};
pub use signals::{
    AlertLevel, ClassificationThresholds, Condition, RuleSpec, Score, ScoringMode, SignalReport,
    SignalRule,
};
