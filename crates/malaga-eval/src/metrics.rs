//! Portfolio performance metrics.
//!
//! Everything is computed from a series of periodic simple returns:
//! - Return and risk: total and annualised return, annualised volatility
//! - Risk-adjusted: Sharpe, Sortino and Calmar ratios
//! - Path: maximum and average drawdown
//! - Hit statistics: win rate, profit factor, win/loss ratio

use crate::backtest::{drawdown_series, equity_curve};
use malaga_traits::stats::{TRADING_DAYS, mean, sample_std};
use malaga_traits::{MalagaError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for metrics calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Periods per year used for annualisation (default: 252).
    pub annualization: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            annualization: TRADING_DAYS,
        }
    }
}

impl MetricsConfig {
    /// Checks the annualisation factor.
    pub fn validate(&self) -> Result<()> {
        if !self.annualization.is_finite() || self.annualization <= 0.0 {
            return Err(MalagaError::InvalidConfig(format!(
                "annualization must be positive, got {}",
                self.annualization
            )));
        }
        Ok(())
    }
}

/// Summary statistics of one return series.
///
/// `profit_factor` and `win_loss_ratio` are `+inf` when there are gains but
/// no losses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Compounded return over the whole series.
    pub total_return: f64,
    /// Compound annual growth rate.
    pub annual_return: f64,
    /// Annualised sample standard deviation of returns.
    pub annual_volatility: f64,
    /// Annual return over annual volatility.
    pub sharpe: f64,
    /// Annualised mean over annualised downside deviation.
    pub sortino: f64,
    /// Annual return over the absolute maximum drawdown.
    pub calmar: f64,
    /// Deepest drawdown, `<= 0`.
    pub max_drawdown: f64,
    /// Mean of the strictly negative drawdowns.
    pub avg_drawdown: f64,
    /// Share of strictly positive periods.
    pub win_rate: f64,
    /// Gross gains over gross losses.
    pub profit_factor: f64,
    /// Mean gain over mean loss.
    pub win_loss_ratio: f64,
    /// Number of returns the record was computed from.
    pub n_periods: usize,
    /// `n_periods / annualization`.
    pub years: f64,
    /// Mean one-way turnover per rebalancing date.
    pub avg_turnover: f64,
    /// Number of positions opened.
    pub n_trades: usize,
}

/// `gains / |losses|`: `+inf` with gains and no losses, 0 with neither.
fn gain_loss_ratio(gains: f64, losses: f64) -> f64 {
    if losses < 0.0 {
        gains / losses.abs()
    } else if gains > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

impl PerformanceMetrics {
    /// Computes the record for `returns`.
    ///
    /// Non-finite returns are skipped. Fewer than two returns give the
    /// all-zero record.
    ///
    /// # Example
    ///
    /// ```rust
    /// use malaga_eval::{MetricsConfig, PerformanceMetrics};
    ///
    /// let metrics = PerformanceMetrics::from_returns(&[0.01, 0.02, -0.01], &MetricsConfig::default());
    /// assert!((metrics.profit_factor - 3.0).abs() < 1e-12);
    /// ```
    pub fn from_returns(returns: &[f64], config: &MetricsConfig) -> Self {
        let returns: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
        let n = returns.len();
        if n < 2 {
            return Self::default();
        }
        let a = config.annualization;

        let equity = equity_curve(&returns);
        let total_return = equity.last().copied().unwrap_or(1.0) - 1.0;
        let years = n as f64 / a;
        let annual_return = if total_return <= -1.0 {
            -1.0
        } else {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        };
        let annual_volatility = sample_std(&returns).unwrap_or(0.0) * a.sqrt();
        let sharpe = if annual_volatility > 0.0 {
            annual_return / annual_volatility
        } else {
            0.0
        };

        let negatives: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let positives: Vec<f64> = returns.iter().copied().filter(|r| *r > 0.0).collect();
        let downside = sample_std(&negatives).unwrap_or(0.0) * a.sqrt();
        let sortino = if downside > 0.0 {
            mean(&returns).unwrap_or(0.0) * a / downside
        } else {
            0.0
        };

        let drawdown = drawdown_series(&equity, 1.0);
        let max_drawdown = drawdown.iter().copied().fold(0.0, f64::min);
        let underwater: Vec<f64> = drawdown.iter().copied().filter(|d| *d < 0.0).collect();
        let avg_drawdown = mean(&underwater).unwrap_or(0.0);
        let calmar = if max_drawdown < 0.0 {
            annual_return / max_drawdown.abs()
        } else {
            0.0
        };

        let win_rate = positives.len() as f64 / n as f64;
        let profit_factor = gain_loss_ratio(positives.iter().sum(), negatives.iter().sum());
        let win_loss_ratio = gain_loss_ratio(
            mean(&positives).unwrap_or(0.0),
            mean(&negatives).unwrap_or(0.0),
        );

        Self {
            total_return,
            annual_return,
            annual_volatility,
            sharpe,
            sortino,
            calmar,
            max_drawdown,
            avg_drawdown,
            win_rate,
            profit_factor,
            win_loss_ratio,
            n_periods: n,
            years,
            avg_turnover: 0.0,
            n_trades: 0,
        }
    }

    /// Attaches trading activity to the record.
    #[must_use]
    pub const fn with_activity(mut self, avg_turnover: f64, n_trades: usize) -> Self {
        self.avg_turnover = avg_turnover;
        self.n_trades = n_trades;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_profit_factor() {
        let m = PerformanceMetrics::from_returns(&[0.01, 0.02, -0.01], &MetricsConfig::default());
        assert_relative_eq!(m.profit_factor, 3.0, epsilon = 1e-12);
        assert_relative_eq!(m.win_loss_ratio, 1.5, epsilon = 1e-12);
        assert_relative_eq!(m.win_rate, 2.0 / 3.0);
        assert_eq!(m.n_periods, 3);
    }

    #[test]
    fn test_zero_returns() {
        let m = PerformanceMetrics::from_returns(&[0.0; 10], &MetricsConfig::default());
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.annual_return, 0.0);
        assert_eq!(m.sharpe, 0.0);
        assert_eq!(m.sortino, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.profit_factor, 0.0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.n_periods, 10);
    }

    #[test]
    fn test_short_series_gives_zero_record() {
        let m = PerformanceMetrics::from_returns(&[0.05], &MetricsConfig::default());
        assert_eq!(m, PerformanceMetrics::default());
        assert_eq!(m.n_periods, 0);
    }

    #[test]
    fn test_no_losses_gives_infinite_profit_factor() {
        let m = PerformanceMetrics::from_returns(&[0.01, 0.0, 0.02], &MetricsConfig::default());
        assert!(m.profit_factor.is_infinite());
        assert_eq!(m.sortino, 0.0);
        assert_eq!(m.calmar, 0.0);
    }

    #[test]
    fn test_drawdown_and_calmar() {
        let returns = [0.1, -0.2, 0.05, 0.0];
        let m = PerformanceMetrics::from_returns(&returns, &MetricsConfig::default());
        // equity 1.1, 0.88, 0.924, 0.924; peak 1.1
        assert_relative_eq!(m.max_drawdown, 0.88 / 1.1 - 1.0, epsilon = 1e-12);
        let expected_avg = ((0.88 / 1.1 - 1.0) + 2.0 * (0.924 / 1.1 - 1.0)) / 3.0;
        assert_relative_eq!(m.avg_drawdown, expected_avg, epsilon = 1e-12);
        assert_relative_eq!(m.calmar, m.annual_return / m.max_drawdown.abs());
        assert_relative_eq!(m.total_return, 0.924 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cagr_and_sharpe() {
        let returns: Vec<f64> = (0..252)
            .map(|t| if t % 2 == 0 { 0.002 } else { 0.0 })
            .collect();
        let m = PerformanceMetrics::from_returns(&returns, &MetricsConfig::default());
        assert_relative_eq!(m.years, 1.0);
        assert_relative_eq!(m.annual_return, 1.002_f64.powi(126) - 1.0, epsilon = 1e-12);
        assert!(m.annual_volatility > 0.0);
        assert_relative_eq!(m.sharpe, m.annual_return / m.annual_volatility);
        assert_relative_eq!(m.win_rate, 0.5);
    }

    #[test]
    fn test_total_loss() {
        let m = PerformanceMetrics::from_returns(&[0.1, -1.0, 0.0], &MetricsConfig::default());
        assert_eq!(m.annual_return, -1.0);
        assert_relative_eq!(m.max_drawdown, -1.0);
    }

    #[test]
    fn test_with_activity() {
        let m = PerformanceMetrics::default().with_activity(0.25, 4);
        assert_eq!(m.n_trades, 4);
        assert_relative_eq!(m.avg_turnover, 0.25);
    }

    #[test]
    fn test_validate() {
        assert!(MetricsConfig::default().validate().is_ok());
        assert!(MetricsConfig { annualization: 0.0 }.validate().is_err());
    }
}
