//! Domain types for CycleTop

pub mod price;

pub use price::{PricePoint, PriceSeries, RawPrice};
