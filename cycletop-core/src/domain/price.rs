//! PricePoint and PriceSeries: the validated engine input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{InvalidInputError, Result};

/// A single daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Close as delivered by an ingestion collaborator, before validation.
///
/// A `None` close means the source row had no usable price field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPrice {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

/// Ordered, non-empty close series with strictly increasing dates.
///
/// Immutable once constructed; the engine only ever borrows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Validate and wrap a sequence of points.
    ///
    /// Fails on an empty input, a non-finite or negative close, or a date that
    /// does not strictly follow its predecessor. Gaps between dates are fine.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(InvalidInputError::EmptySeries);
        }

        for (index, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close < 0.0 {
                return Err(InvalidInputError::InvalidClose {
                    index,
                    date: point.date,
                    value: point.close,
                });
            }
            if index > 0 {
                let previous = points[index - 1].date;
                if point.date <= previous {
                    return Err(InvalidInputError::NonIncreasingDate {
                        index,
                        previous,
                        current: point.date,
                    });
                }
            }
        }

        Ok(Self { points })
    }

    /// Build a series from raw ingestion rows, rejecting rows without a close.
    pub fn from_raw(raw: &[RawPrice]) -> Result<Self> {
        let points = raw
            .iter()
            .enumerate()
            .map(|(index, row)| match row.close {
                Some(close) => Ok(PricePoint::new(row.date, close)),
                None => Err(InvalidInputError::MissingClose {
                    index,
                    date: row.date,
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(points)
    }

    /// Convenience constructor: consecutive calendar days starting at `start`.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint::new(start + chrono::Duration::days(i as i64), close))
            .collect();
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed series; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn last(&self) -> &PricePoint {
        // Non-empty by construction.
        &self.points[self.points.len() - 1]
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Unchecked {
            points: Vec<PricePoint>,
        }

        let unchecked = Unchecked::deserialize(deserializer)?;
        PriceSeries::new(unchecked.points).map_err(serde::de::Error::custom)
    }
}
