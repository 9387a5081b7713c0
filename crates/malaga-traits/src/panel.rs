//! Date × symbol panels.
//!
//! A [`Panel`] is the dense table every stage of the pipeline exchanges: alpha
//! scores, combined scores, target weights and returns. Rows are dates in
//! strictly ascending order, columns are symbols. Missing cells are `NaN` and
//! are never silently read as zero.
//!
//! A [`PricePanel`] is a panel whose present values are strictly positive
//! prices.

use crate::error::{MalagaError, Result};
use crate::types::{Date, MarketData, Symbol};
use ndarray::{Array2, ArrayView1};
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// A dates × symbols table of `f64` values, `NaN` meaning missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    dates: Vec<Date>,
    symbols: Vec<Symbol>,
    values: Array2<f64>,
}

impl Panel {
    /// Creates a panel after checking the index and the shape.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::InvalidData`] when there are no dates or no
    /// symbols, dates are not strictly ascending or symbols repeat, and
    /// [`MalagaError::ShapeMismatch`] when `values` is not `dates × symbols`.
    pub fn new(dates: Vec<Date>, symbols: Vec<Symbol>, values: Array2<f64>) -> Result<Self> {
        if dates.is_empty() {
            return Err(MalagaError::InvalidData("panel has no dates".to_string()));
        }
        if symbols.is_empty() {
            return Err(MalagaError::InvalidData("panel has an empty universe".to_string()));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(MalagaError::InvalidData(format!(
                "dates must be strictly ascending, found {} followed by {}",
                pair[0], pair[1]
            )));
        }
        let mut seen = BTreeSet::new();
        for symbol in &symbols {
            if !seen.insert(symbol.as_str()) {
                return Err(MalagaError::InvalidData(format!("duplicate symbol '{symbol}'")));
            }
        }
        check_shape(&values, dates.len(), symbols.len())?;
        Ok(Self {
            dates,
            symbols,
            values,
        })
    }

    /// Returns a panel on the same index holding `values`.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::ShapeMismatch`] when the shape differs.
    pub fn with_values(&self, values: Array2<f64>) -> Result<Self> {
        check_shape(&values, self.n_dates(), self.n_symbols())?;
        Ok(Self {
            dates: self.dates.clone(),
            symbols: self.symbols.clone(),
            values,
        })
    }

    /// The row dates.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// The column symbols.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// The raw values, `NaN` for missing cells.
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Consumes the panel and returns the raw values.
    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// Number of dates.
    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }

    /// Number of symbols.
    pub fn n_symbols(&self) -> usize {
        self.symbols.len()
    }

    /// The present value at `(t, i)`, `None` when missing or out of range.
    pub fn get(&self, t: usize, i: usize) -> Option<f64> {
        self.values.get((t, i)).copied().filter(|v| !v.is_nan())
    }

    /// One date's cross-section.
    pub fn row(&self, t: usize) -> ArrayView1<'_, f64> {
        self.values.row(t)
    }

    /// One symbol's time series.
    pub fn column(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.column(i)
    }

    /// Column position of `symbol`.
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Whether every cell of row `t` is missing.
    pub fn row_is_missing(&self, t: usize) -> bool {
        self.values.row(t).iter().all(|v| v.is_nan())
    }

    /// Number of present cells.
    pub fn count_present(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Whether both panels share dates and symbols.
    pub fn same_index(&self, other: &Self) -> bool {
        self.dates == other.dates && self.symbols == other.symbols
    }

    /// Fails unless `other` shares this panel's index.
    pub fn ensure_same_index(&self, other: &Self, what: &str) -> Result<()> {
        if self.same_index(other) {
            Ok(())
        } else {
            Err(MalagaError::ShapeMismatch(format!(
                "{what}: expected {}x{} panel on the same index, found {}x{}",
                self.n_dates(),
                self.n_symbols(),
                other.n_dates(),
                other.n_symbols()
            )))
        }
    }
}

fn check_shape(values: &Array2<f64>, rows: usize, cols: usize) -> Result<()> {
    if values.dim() == (rows, cols) {
        Ok(())
    } else {
        let (found_rows, found_cols) = values.dim();
        Err(MalagaError::ShapeMismatch(format!(
            "expected {rows}x{cols} values, found {found_rows}x{found_cols}"
        )))
    }
}

/// A panel of strictly positive prices.
///
/// Present cells are finite and `> 0`; missing cells are `NaN`. The panel is
/// immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePanel {
    inner: Panel,
}

impl PricePanel {
    /// Creates a price panel from dense values.
    ///
    /// # Errors
    ///
    /// Everything [`Panel::new`] rejects, plus [`MalagaError::InvalidData`]
    /// for infinite, zero or negative prices.
    pub fn new(dates: Vec<Date>, symbols: Vec<Symbol>, values: Array2<f64>) -> Result<Self> {
        Self::from_panel(Panel::new(dates, symbols, values)?)
    }

    /// Validates a generic panel as prices.
    pub fn from_panel(panel: Panel) -> Result<Self> {
        for ((t, i), &v) in panel.values.indexed_iter() {
            if !v.is_nan() && (!v.is_finite() || v <= 0.0) {
                return Err(MalagaError::InvalidData(format!(
                    "price for {} on {} must be positive and finite, got {v}",
                    panel.symbols[i], panel.dates[t]
                )));
            }
        }
        Ok(Self { inner: panel })
    }

    /// Pivots long-format market data (`date`, `symbol`, `close`) into a panel.
    ///
    /// Dates and symbols are sorted ascending. A `(date, symbol)` pair with no
    /// row, or a null close, becomes a missing cell.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::MissingColumn`] when a required column is
    /// absent and [`MalagaError::InvalidData`] for null keys, unparseable
    /// dates or duplicated observations.
    pub fn from_market_data(data: &MarketData) -> Result<Self> {
        for name in ["date", "symbol", "close"] {
            if !data.has_column(name) {
                return Err(MalagaError::MissingColumn(name.to_string()));
            }
        }
        let df = data.data();

        let raw_dates = df.column("date")?.as_materialized_series();
        let raw_dates = match raw_dates.dtype() {
            DataType::Datetime(_, _) => raw_dates.cast(&DataType::Date)?,
            _ => raw_dates.clone(),
        };
        let date_strings = raw_dates.cast(&DataType::String)?;
        let symbol_strings = df
            .column("symbol")?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let closes = df
            .column("close")?
            .as_materialized_series()
            .cast(&DataType::Float64)?;

        let mut records = Vec::with_capacity(df.height());
        for ((date, symbol), close) in date_strings
            .str()?
            .into_iter()
            .zip(symbol_strings.str()?)
            .zip(closes.f64()?)
        {
            let date = date.ok_or_else(|| MalagaError::InvalidData("null date".to_string()))?;
            let date = Date::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| MalagaError::InvalidData(format!("invalid date '{date}': {e}")))?;
            let symbol =
                symbol.ok_or_else(|| MalagaError::InvalidData("null symbol".to_string()))?;
            records.push((date, symbol.to_string(), close.unwrap_or(f64::NAN)));
        }

        let dates: Vec<Date> = records
            .iter()
            .map(|r| r.0)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let symbols: Vec<Symbol> = records
            .iter()
            .map(|r| r.1.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let date_pos: HashMap<Date, usize> =
            dates.iter().enumerate().map(|(t, d)| (*d, t)).collect();
        let symbol_pos: HashMap<&str, usize> = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();

        let shape = (dates.len(), symbols.len());
        let mut values = Array2::from_elem(shape, f64::NAN);
        let mut filled = Array2::from_elem(shape, false);
        for (date, symbol, close) in &records {
            let t = date_pos[date];
            let i = symbol_pos[symbol.as_str()];
            if filled[[t, i]] {
                return Err(MalagaError::InvalidData(format!(
                    "duplicate observation for {symbol} on {date}"
                )));
            }
            filled[[t, i]] = true;
            values[[t, i]] = *close;
        }

        Self::new(dates, symbols, values)
    }

    /// The underlying panel.
    pub const fn panel(&self) -> &Panel {
        &self.inner
    }

    /// The row dates.
    pub fn dates(&self) -> &[Date] {
        self.inner.dates()
    }

    /// The column symbols.
    pub fn symbols(&self) -> &[Symbol] {
        self.inner.symbols()
    }

    /// The raw prices, `NaN` for missing.
    pub const fn values(&self) -> &Array2<f64> {
        self.inner.values()
    }

    /// Number of dates.
    pub fn n_dates(&self) -> usize {
        self.inner.n_dates()
    }

    /// Number of symbols.
    pub fn n_symbols(&self) -> usize {
        self.inner.n_symbols()
    }

    /// The present price at `(t, i)`.
    pub fn get(&self, t: usize, i: usize) -> Option<f64> {
        self.inner.get(t, i)
    }

    /// Natural log of every price.
    pub fn log_prices(&self) -> Array2<f64> {
        self.values().mapv(f64::ln)
    }

    /// `ln(p[t] / p[t-1])`; row 0 and cells next to a missing price are `NaN`.
    pub fn log_returns(&self) -> Array2<f64> {
        self.lagged_ratio(f64::ln)
    }

    /// Simple returns `p[t] / p[t-1] - 1` as a panel on the same index.
    pub fn simple_returns(&self) -> Panel {
        let values = self.lagged_ratio(|r| r - 1.0);
        Panel {
            dates: self.inner.dates.clone(),
            symbols: self.inner.symbols.clone(),
            values,
        }
    }

    fn lagged_ratio<F: Fn(f64) -> f64>(&self, f: F) -> Array2<f64> {
        let prices = self.values();
        let mut out = Array2::from_elem(prices.dim(), f64::NAN);
        for t in 1..prices.nrows() {
            for i in 0..prices.ncols() {
                out[[t, i]] = f(prices[[t, i]] / prices[[t - 1, i]]);
            }
        }
        out
    }
}

impl AsRef<Panel> for PricePanel {
    fn as_ref(&self) -> &Panel {
        &self.inner
    }
}
