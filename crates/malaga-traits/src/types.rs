//! Common types used throughout the malaga engine.
//!
//! This module defines the identifiers for instruments and dates, and the
//! long-format market data container that price panels are pivoted from.

use chrono::{Datelike, Days};
use polars::prelude::*;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// An instrument identifier, typically a ticker such as "AAPL".
pub type Symbol = String;

/// Long-format market data.
///
/// `MarketData` wraps a Polars DataFrame with one row per (date, symbol)
/// observation. It is the tabular form prices arrive in before they are
/// pivoted into a [`crate::PricePanel`].
///
/// # Expected Schema
///
/// - `date`: trading date (`Date` or an ISO-8601 string)
/// - `symbol`: instrument identifier
/// - `close`: closing price
///
/// # Example
///
/// ```no_run
/// use malaga_traits::MarketData;
/// use polars::prelude::*;
///
/// let df = df! {
///     "date" => &["2024-01-02", "2024-01-02"],
///     "symbol" => &["AAPL", "MSFT"],
///     "close" => &[185.6, 370.9],
/// }.unwrap();
///
/// let market_data = MarketData::new(df);
/// ```
#[derive(Debug, Clone)]
pub struct MarketData {
    data: DataFrame,
}

impl MarketData {
    /// Creates a new `MarketData` instance from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of rows in the market data.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the market data is empty.
    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// Checks if a column exists in the market data.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Gets a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.data.column(name).ok()
    }
}

impl From<DataFrame> for MarketData {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for MarketData {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

/// `num_days_from_ce` of 1970-01-01, the epoch of polars `Date` columns.
pub const CE_TO_UNIX_EPOCH_DAYS: i32 = 719_163;

/// Days since 1970-01-01, the physical value of a polars `Date`.
pub fn epoch_days(date: Date) -> i32 {
    date.num_days_from_ce() - CE_TO_UNIX_EPOCH_DAYS
}

/// Builds `n` consecutive calendar dates starting at `start`.
///
/// Handy for synthetic panels where only the ordering of dates matters.
pub fn date_range(start: Date, n: usize) -> Vec<Date> {
    (0..n)
        .filter_map(|i| start.checked_add_days(Days::new(i as u64)))
        .collect()
}
