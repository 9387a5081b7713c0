//! Single-instrument long-only simulator with cash accounting.
//!
//! Each bar trades at the open on the previous bar's signal: `+1` buys with
//! all available cash when flat, `-1` sells the whole position when long.
//! Equity is marked at the close.
//!
//! This simulator is a library entry point only: the multi-instrument
//! pipeline and the CLI do not call it.

use crate::backtest::drawdown_series;
use chrono::NaiveDate;
use log::warn;
use malaga_traits::{MalagaError, Result};
use serde::{Deserialize, Serialize};

/// Long-only simulator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongOnlyConfig {
    /// Starting cash (default: 10 000).
    pub initial_capital: f64,
    /// Flat commission per fill (default: 0).
    pub commission: f64,
    /// Slippage in basis points applied against the trader (default: 0).
    pub slippage_bps: f64,
}

impl Default for LongOnlyConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            commission: 0.0,
            slippage_bps: 0.0,
        }
    }
}

impl LongOnlyConfig {
    /// Checks capital, commission and slippage.
    pub fn validate(&self) -> Result<()> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(MalagaError::InvalidConfig(format!(
                "initial capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if !self.commission.is_finite() || self.commission < 0.0 {
            return Err(MalagaError::InvalidConfig(format!(
                "commission must be non-negative, got {}",
                self.commission
            )));
        }
        if !self.slippage_bps.is_finite() || self.slippage_bps < 0.0 {
            return Err(MalagaError::InvalidConfig(format!(
                "slippage must be non-negative, got {} bps",
                self.slippage_bps
            )));
        }
        Ok(())
    }
}

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

/// One executed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Trade date.
    pub date: NaiveDate,
    /// Direction.
    pub side: Side,
    /// Shares traded.
    pub shares: u64,
    /// Execution price after slippage.
    pub price: f64,
    /// Commission paid.
    pub commission: f64,
    /// Cash after the trade.
    pub cash_after: f64,
    /// Shares held after the trade.
    pub position_after: u64,
}

/// One bar of input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Bar date.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Closing price.
    pub close: f64,
    /// Signal decided at this bar's close: `1` buy, `-1` sell, otherwise hold.
    pub signal: i8,
}

/// Path of the long-only account.
#[derive(Debug, Clone, Default)]
pub struct LongOnlyResult {
    /// Bar dates.
    pub dates: Vec<NaiveDate>,
    /// Cash at each close.
    pub cash: Vec<f64>,
    /// Shares held at each close.
    pub position: Vec<u64>,
    /// `cash + position × close`.
    pub equity: Vec<f64>,
    /// Equity change per bar; the first is 0.
    pub returns: Vec<f64>,
    /// `equity / running_max - 1`.
    pub drawdown: Vec<f64>,
    /// Executed trades.
    pub fills: Vec<Fill>,
}

impl LongOnlyResult {
    /// Compounded return over the run.
    pub fn total_return(&self) -> f64 {
        match (self.equity.first(), self.equity.last()) {
            (Some(first), Some(last)) if *first > 0.0 => last / first - 1.0,
            _ => 0.0,
        }
    }
}

/// Runs the long-only simulation over `bars`.
///
/// # Errors
///
/// Returns [`MalagaError::InvalidConfig`] for a bad configuration and
/// [`MalagaError::InvalidData`] for a non-positive or non-finite price.
pub fn backtest_long_only(bars: &[Bar], config: &LongOnlyConfig) -> Result<LongOnlyResult> {
    config.validate()?;
    if let Some(bar) = bars
        .iter()
        .find(|b| !(b.open.is_finite() && b.open > 0.0 && b.close.is_finite() && b.close > 0.0))
    {
        return Err(MalagaError::InvalidData(format!(
            "bar {} has a non-positive or missing price",
            bar.date
        )));
    }

    let slip = config.slippage_bps / 10_000.0;
    let mut cash = config.initial_capital;
    let mut shares: u64 = 0;
    let mut previous_signal: i8 = 0;
    let mut result = LongOnlyResult::default();

    for bar in bars {
        if previous_signal == 1 && shares == 0 {
            let price = bar.open * (1.0 + slip);
            let available = cash - config.commission;
            let quantity = if available > price {
                (available / price).floor() as u64
            } else {
                0
            };
            if quantity > 0 {
                cash -= quantity as f64 * price + config.commission;
                shares = quantity;
                result.fills.push(Fill {
                    date: bar.date,
                    side: Side::Buy,
                    shares: quantity,
                    price,
                    commission: config.commission,
                    cash_after: cash,
                    position_after: shares,
                });
            } else {
                warn!("{}: cannot afford one share at {price:.4}, staying flat", bar.date);
            }
        } else if previous_signal == -1 && shares > 0 {
            let price = bar.open * (1.0 - slip);
            cash += shares as f64 * price - config.commission;
            result.fills.push(Fill {
                date: bar.date,
                side: Side::Sell,
                shares,
                price,
                commission: config.commission,
                cash_after: cash,
                position_after: 0,
            });
            shares = 0;
        }

        let equity = cash + shares as f64 * bar.close;
        let ret = match result.equity.last() {
            Some(prev) if *prev != 0.0 => equity / prev - 1.0,
            _ => 0.0,
        };
        result.dates.push(bar.date);
        result.cash.push(cash);
        result.position.push(shares);
        result.equity.push(equity);
        result.returns.push(ret);
        previous_signal = bar.signal;
    }

    result.drawdown = drawdown_series(&result.equity, config.initial_capital);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bars(prices: &[(f64, f64, i8)]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &(open, close, signal))| Bar {
                date: start + chrono::Days::new(i as u64),
                open,
                close,
                signal,
            })
            .collect()
    }

    #[test]
    fn test_drawdown_is_measured_from_initial_capital() {
        let config = LongOnlyConfig {
            commission: 5.0,
            ..LongOnlyConfig::default()
        };
        let bars = bars(&[(10.0, 10.0, 1), (10.0, 9.0, 0), (9.0, 9.5, 0)]);
        let result = backtest_long_only(&bars, &config).unwrap();
        assert_eq!(result.drawdown[0], 0.0);
        assert_eq!(result.drawdown, drawdown_series(&result.equity, 10_000.0));
        assert_relative_eq!(result.drawdown[1], result.equity[1] / 10_000.0 - 1.0);
        assert!(result.drawdown.iter().all(|d| *d <= 0.0));
    }

    #[test]
    fn test_trades_on_previous_signal() {
        let bars = bars(&[(10.0, 10.0, 1), (10.0, 11.0, 0), (12.0, 12.0, -1), (13.0, 13.0, 0)]);
        let result = backtest_long_only(&bars, &LongOnlyConfig::default()).unwrap();
        assert_eq!(result.fills.len(), 2);
        assert_eq!(result.fills[0].side, Side::Buy);
        assert_eq!(result.fills[0].shares, 1_000);
        assert_eq!(result.fills[0].date, bars[1].date);
        assert_eq!(result.fills[1].side, Side::Sell);
        assert_eq!(result.fills[1].date, bars[3].date);
        assert_eq!(result.position, vec![0, 1_000, 1_000, 0]);
        assert_relative_eq!(result.equity[1], 11_000.0);
        assert_relative_eq!(result.equity[3], 13_000.0);
        assert_relative_eq!(result.returns[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(result.total_return(), 0.3, epsilon = 1e-12);
        assert_eq!(result.returns[0], 0.0);
    }

    #[test]
    fn test_costs_reduce_fill_size() {
        let bars = bars(&[(100.0, 100.0, 1), (100.0, 100.0, 0)]);
        let config = LongOnlyConfig {
            initial_capital: 1_000.0,
            commission: 5.0,
            slippage_bps: 100.0,
        };
        let result = backtest_long_only(&bars, &config).unwrap();
        let fill = &result.fills[0];
        assert_relative_eq!(fill.price, 101.0);
        assert_eq!(fill.shares, 9);
        assert_relative_eq!(fill.cash_after, 1_000.0 - 9.0 * 101.0 - 5.0);
        assert!(result.drawdown[1] < 0.0);
    }

    #[test]
    fn test_cannot_afford_a_share() {
        let bars = bars(&[(50.0, 50.0, 1), (20_000.0, 20_000.0, 0)]);
        let result = backtest_long_only(&bars, &LongOnlyConfig::default()).unwrap();
        assert!(result.fills.is_empty());
        assert_eq!(result.total_return(), 0.0);
    }

    #[test]
    fn test_sell_without_position_is_ignored() {
        let bars = bars(&[(10.0, 10.0, -1), (10.0, 10.0, -1)]);
        let result = backtest_long_only(&bars, &LongOnlyConfig::default()).unwrap();
        assert!(result.fills.is_empty());
        assert!(result.drawdown.iter().all(|d| *d == 0.0));
    }

    #[test]
    fn test_rejects_bad_prices() {
        let bars = bars(&[(10.0, 0.0, 0)]);
        assert!(matches!(
            backtest_long_only(&bars, &LongOnlyConfig::default()),
            Err(MalagaError::InvalidData(_))
        ));
    }
}
