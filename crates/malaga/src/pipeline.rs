//! Single-universe backtest pipeline.
//!
//! Prices → alpha scores → combined score → weights and positions →
//! lagged simulation → ledger and metrics.

use crate::config::RunConfig;
use log::{info, warn};
use malaga_combine::LambdaModel;
use malaga_eval::{
    PerformanceMetrics, Simulation, SimulationMode, TradeRecord, build_ledger,
    continuous_weights, count_opens, discrete_positions, hold_forward, simulate_returns,
};
use malaga_signals::compute_alphas;
use malaga_traits::{AlphaSet, Degradation, Fitted, Panel, PricePanel, Result};

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct BacktestRun {
    /// Universe identifier.
    pub universe: String,
    /// Input prices.
    pub prices: PricePanel,
    /// One score panel per alpha.
    pub alphas: AlphaSet,
    /// Fitted alpha weights.
    pub model: Fitted<LambdaModel>,
    /// Combined score panel.
    pub combined: Panel,
    /// Continuous target weights, missing rows not yet held.
    pub weights: Panel,
    /// Discrete `{-1, 0, +1}` targets, missing rows not yet held.
    pub positions: Panel,
    /// Lagged portfolio path.
    pub simulation: Simulation,
    /// Per (date, instrument) actions.
    pub ledger: Vec<TradeRecord>,
    /// Summary statistics.
    pub metrics: PerformanceMetrics,
    /// Every fallback taken during the run.
    pub degradations: Vec<Degradation>,
}

impl BacktestRun {
    /// Simulation mode of the run.
    pub const fn mode(&self) -> SimulationMode {
        self.simulation.mode
    }
}

/// Runs the full pipeline on one price panel.
///
/// # Errors
///
/// Fails fast on an invalid configuration, and propagates data errors from
/// any stage. Numerical trouble degrades instead of failing and is listed
/// in [`BacktestRun::degradations`].
pub fn run_backtest(universe: &str, prices: &PricePanel, config: &RunConfig) -> Result<BacktestRun> {
    config.validate()?;
    info!(
        "{universe}: running {} dates x {} symbols in {} mode",
        prices.n_dates(),
        prices.n_symbols(),
        config.simulation.mode.name()
    );

    let output = compute_alphas(prices, &config.alphas)?;
    let alphas = output.alphas;
    let mut degradations = output.degradations;

    let combiner = config.combine.build();
    let model = combiner.fit(&alphas, prices)?;
    if let Some(reason) = model.reason() {
        warn!("{universe}: {} combiner fell back to equal weights: {reason}", combiner.name());
        degradations.push(Degradation::new(combiner.name(), reason.clone()));
    }
    let combined = model.value().predict(&alphas)?;

    let weights = continuous_weights(&combined, config.weights.gross_cap)?;
    let positions = discrete_positions(&weights, config.weights.threshold)?;
    let targets = match config.simulation.mode {
        SimulationMode::Continuous => &weights,
        SimulationMode::Discrete => &positions,
    };
    let simulation = simulate_returns(targets, &prices.simple_returns(), &config.simulation)?;

    let held_weights = weights.with_values(hold_forward(&weights))?;
    let held_positions = positions.with_values(hold_forward(&positions))?;
    let ledger = build_ledger(
        &held_weights,
        &held_positions,
        prices,
        &alphas,
        config.simulation.capital,
    )?;

    let metrics = PerformanceMetrics::from_returns(&simulation.returns, &config.metrics)
        .with_activity(simulation.avg_turnover(), count_opens(&ledger));
    info!(
        "{universe}: total return {:.2}%, sharpe {:.2}, max drawdown {:.2}%, {} trades",
        metrics.total_return * 100.0,
        metrics.sharpe,
        metrics.max_drawdown * 100.0,
        metrics.n_trades
    );

    Ok(BacktestRun {
        universe: universe.to_string(),
        prices: prices.clone(),
        alphas,
        model,
        combined,
        weights,
        positions,
        simulation,
        ledger,
        metrics,
        degradations,
    })
}
