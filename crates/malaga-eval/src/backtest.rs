//! Lagged portfolio simulation.
//!
//! Holdings decided at the close of date `t-1` earn the instrument returns of
//! date `t`. A date whose targets are entirely missing keeps the previous
//! holdings; before the first defined target the book is flat.

use crate::weights::gross_exposure;
use log::debug;
use malaga_traits::{Date, MalagaError, Panel, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// How targets become holdings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    /// Hold the continuous weights directly.
    Continuous,
    /// Hold `{-1, 0, +1}` positions.
    #[default]
    Discrete,
}

impl SimulationMode {
    /// Identifier used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Continuous => "continuous",
            Self::Discrete => "discrete",
        }
    }
}

/// Simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Continuous weights or discrete positions (default: discrete).
    pub mode: SimulationMode,
    /// In discrete mode, split unit exposure evenly over the open positions
    /// of each date (default: true).
    pub equal_risk: bool,
    /// Notional used to size share counts in the trade ledger (default: 1e9).
    pub capital: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mode: SimulationMode::default(),
            equal_risk: true,
            capital: 1e9,
        }
    }
}

impl SimulationConfig {
    /// Checks the notional.
    pub fn validate(&self) -> Result<()> {
        if !self.capital.is_finite() || self.capital <= 0.0 {
            return Err(MalagaError::InvalidConfig(format!(
                "capital must be positive, got {}",
                self.capital
            )));
        }
        Ok(())
    }
}

/// Daily path of a simulated portfolio.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Mode the holdings were built in.
    pub mode: SimulationMode,
    /// Holdings at the close of each date.
    pub holdings: Panel,
    /// Portfolio return per date; the first is 0.
    pub returns: Vec<f64>,
    /// Compounded equity starting from 1.
    pub equity: Vec<f64>,
    /// `equity / running_peak - 1`, with the peak starting at 1.
    pub drawdown: Vec<f64>,
    /// `Σ|h[t] - h[t-1]| / 2` per date; the first is 0.
    pub turnover: Vec<f64>,
}

impl Simulation {
    /// Row dates.
    pub fn dates(&self) -> &[Date] {
        self.holdings.dates()
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// Whether the simulation is empty.
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Mean turnover over rebalancing dates (all but the first).
    pub fn avg_turnover(&self) -> f64 {
        if self.turnover.len() < 2 {
            return 0.0;
        }
        self.turnover[1..].iter().sum::<f64>() / (self.turnover.len() - 1) as f64
    }

    /// Last equity value, 1 for an empty simulation.
    pub fn final_equity(&self) -> f64 {
        self.equity.last().copied().unwrap_or(1.0)
    }
}

/// Carries the last fully or partly present target row forward.
///
/// Leading missing rows are flat; missing cells of a present row are 0.
pub fn hold_forward(targets: &Panel) -> Array2<f64> {
    let (n_dates, n_symbols) = (targets.n_dates(), targets.n_symbols());
    let mut held = Array2::zeros((n_dates, n_symbols));
    for t in 0..n_dates {
        if targets.row_is_missing(t) {
            if t > 0 {
                let previous = held.row(t - 1).to_owned();
                held.row_mut(t).assign(&previous);
            }
            continue;
        }
        for (slot, v) in held.row_mut(t).iter_mut().zip(targets.row(t).iter()) {
            *slot = if v.is_nan() { 0.0 } else { *v };
        }
    }
    held
}

/// Divides each row by its number of open positions (at least 1).
fn equal_risk(held: &mut Array2<f64>) {
    for mut row in held.rows_mut() {
        let active = row.iter().filter(|v| **v != 0.0).count().max(1);
        row.mapv_inplace(|v| v / active as f64);
    }
}

/// Compounds period returns into an equity curve starting from 1.
pub fn equity_curve(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |equity, r| {
            *equity *= 1.0 + r;
            Some(*equity)
        })
        .collect()
}

/// Drawdown of each equity point from the running peak, which starts at `initial`.
pub fn drawdown_series(equity: &[f64], initial: f64) -> Vec<f64> {
    let mut peak = initial;
    equity
        .iter()
        .map(|&e| {
            peak = peak.max(e);
            if peak > 0.0 { e / peak - 1.0 } else { 0.0 }
        })
        .collect()
}

/// Simulates the lagged portfolio.
///
/// `targets` holds continuous weights or discrete positions depending on
/// `config.mode`, and `returns` the simple instrument returns on the same
/// index. The return of date `t` is `Σ_i h[t-1, i] · r[t, i]` with missing
/// instrument returns counting as 0.
///
/// # Errors
///
/// Returns [`MalagaError::ShapeMismatch`] if the panels differ in index.
pub fn simulate_returns(
    targets: &Panel,
    returns: &Panel,
    config: &SimulationConfig,
) -> Result<Simulation> {
    config.validate()?;
    targets.ensure_same_index(returns, "returns")?;

    let mut held = hold_forward(targets);
    if config.mode == SimulationMode::Discrete && config.equal_risk {
        equal_risk(&mut held);
    }

    let n_dates = held.nrows();
    let mut portfolio = vec![0.0; n_dates];
    let mut turnover = vec![0.0; n_dates];
    for t in 1..n_dates {
        portfolio[t] = held
            .row(t - 1)
            .iter()
            .zip(returns.row(t).iter())
            .map(|(h, r)| if r.is_nan() { 0.0 } else { h * r })
            .sum();
        let traded = &held.row(t) - &held.row(t - 1);
        turnover[t] = gross_exposure(traded.view()) / 2.0;
    }

    let equity = equity_curve(&portfolio);
    let drawdown = drawdown_series(&equity, 1.0);
    debug!(
        "simulated {n_dates} periods in {} mode, final equity {:.4}",
        config.mode.name(),
        equity.last().copied().unwrap_or(1.0)
    );
    Ok(Simulation {
        mode: config.mode,
        holdings: targets.with_values(held)?,
        returns: portfolio,
        equity,
        drawdown,
        turnover,
    })
}
