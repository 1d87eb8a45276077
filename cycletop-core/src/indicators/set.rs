//! Aligned indicator container and row views.
//!
//! Every column has exactly one value per price point. Numeric columns use
//! `f64::NAN` for "not yet computable"; flag columns are plain booleans.
//! `BTreeMap` keeps column iteration and serialization order deterministic.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Name under which rules can address the raw close.
pub const CLOSE_COLUMN: &str = "close";

#[derive(Debug, Clone, Default, Serialize)]
pub struct IndicatorSet {
    dates: Vec<NaiveDate>,
    closes: Vec<f64>,
    series: BTreeMap<String, Vec<f64>>,
    flags: BTreeMap<String, Vec<bool>>,
}

impl IndicatorSet {
    /// Start a set aligned with the given dates and closes.
    pub fn new(dates: Vec<NaiveDate>, closes: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), closes.len());
        Self {
            dates,
            closes,
            series: BTreeMap::new(),
            flags: BTreeMap::new(),
        }
    }

    /// Insert a named numeric series.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let name = name.into();
        debug_assert_eq!(
            values.len(),
            self.len(),
            "series '{name}' is not aligned with the price series"
        );
        self.series.insert(name, values);
    }

    /// Insert a named boolean series.
    pub fn insert_flag(&mut self, name: impl Into<String>, values: Vec<bool>) {
        let name = name.into();
        debug_assert_eq!(
            values.len(),
            self.len(),
            "flag '{name}' is not aligned with the price series"
        );
        self.flags.insert(name, values);
    }

    /// Raw value at a position, NaN included. `close` resolves to the price itself.
    pub fn get(&self, name: &str, index: usize) -> Option<f64> {
        if name == CLOSE_COLUMN {
            return self.closes.get(index).copied();
        }
        self.series.get(name).and_then(|v| v.get(index).copied())
    }

    pub fn get_flag(&self, name: &str, index: usize) -> Option<bool> {
        self.flags.get(name).and_then(|v| v.get(index).copied())
    }

    /// Full numeric series for a named column.
    pub fn series(&self, name: &str) -> Option<&[f64]> {
        if name == CLOSE_COLUMN {
            return Some(&self.closes);
        }
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn flag_series(&self, name: &str) -> Option<&[bool]> {
        self.flags.get(name).map(|v| v.as_slice())
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    /// Numeric column names, sorted.
    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Flag column names, sorted.
    pub fn flag_names(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    /// Number of aligned positions (price points).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<IndicatorRow<'_>> {
        (index < self.len()).then_some(IndicatorRow { set: self, index })
    }

    /// Row for the most recent date.
    pub fn latest(&self) -> Option<IndicatorRow<'_>> {
        self.len().checked_sub(1).and_then(|i| self.row(i))
    }
}

/// Read-only view of one aligned position across all columns.
///
/// Lookups return `None` for both unknown columns and undefined (NaN) values,
/// so callers only ever see usable numbers.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorRow<'a> {
    set: &'a IndicatorSet,
    index: usize,
}

impl IndicatorRow<'_> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn date(&self) -> NaiveDate {
        self.set.dates[self.index]
    }

    pub fn close(&self) -> f64 {
        self.set.closes[self.index]
    }

    /// Defined value of a numeric column.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.set
            .get(name, self.index)
            .filter(|v| !v.is_nan())
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.set.get_flag(name, self.index)
    }
}
