//! CLI subcommand modules.
//!
//! Holds the options shared by `run` and `batch` and the printing helpers
//! both commands use.

pub(crate) mod alphas;
pub(crate) mod batch;
pub(crate) mod run;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use malaga::RunConfig;
use malaga::combine::CombineMethod;
use malaga::eval::{PerformanceMetrics, SimulationMode};
use std::path::PathBuf;

/// Simulation mode as given on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum ModeArg {
    /// Hold the capped continuous weights
    Continuous,
    /// Hold thresholded {-1, 0, +1} positions
    Discrete,
}

impl From<ModeArg> for SimulationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Continuous => Self::Continuous,
            ModeArg::Discrete => Self::Discrete,
        }
    }
}

/// Combination method as given on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum MethodArg {
    /// Ridge regression of forward returns on the alphas
    Ridge,
    /// Equal weight on every alpha
    EqualWeight,
}

impl From<MethodArg> for CombineMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Ridge => Self::Ridge,
            MethodArg::EqualWeight => Self::EqualWeight,
        }
    }
}

/// How results are printed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable tables
    #[default]
    Text,
    /// JSON summary rows
    Json,
}

/// Options shared by `run` and `batch`.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct RunOptions {
    /// TOML configuration file
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Directory for CSV reports (nothing is written when omitted)
    #[arg(short, long)]
    pub(crate) output: Option<PathBuf>,

    /// Simulation mode
    #[arg(long, value_enum)]
    pub(crate) mode: Option<ModeArg>,

    /// Signal combination method
    #[arg(long, value_enum)]
    pub(crate) method: Option<MethodArg>,

    /// Discrete position threshold in [0, 1)
    #[arg(long)]
    pub(crate) threshold: Option<f64>,

    /// Gross exposure cap on target weights
    #[arg(long)]
    pub(crate) gross_cap: Option<f64>,

    /// Momentum lookback in trading days
    #[arg(long)]
    pub(crate) momentum_window: Option<usize>,

    /// Cointegration estimation window in trading days
    #[arg(long)]
    pub(crate) coint_window: Option<usize>,

    /// Spread z-score window in trading days
    #[arg(long)]
    pub(crate) z_window: Option<usize>,

    /// Value range window in trading days
    #[arg(long)]
    pub(crate) value_window: Option<usize>,

    /// Capital used to size ledger share counts
    #[arg(long)]
    pub(crate) capital: Option<f64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

impl RunOptions {
    /// Loads the configuration file, if any, and applies the overrides.
    pub(crate) fn build_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RunConfig::default(),
        };
        if let Some(mode) = self.mode {
            config.simulation.mode = mode.into();
        }
        if let Some(method) = self.method {
            config.combine.method = method.into();
        }
        if let Some(threshold) = self.threshold {
            config.weights.threshold = threshold;
        }
        if let Some(cap) = self.gross_cap {
            config.weights.gross_cap = cap;
        }
        if let Some(window) = self.momentum_window {
            config.alphas.momentum.window = window;
        }
        if let Some(window) = self.coint_window {
            config.alphas.mean_reversion.coint_window = window;
        }
        if let Some(window) = self.z_window {
            config.alphas.mean_reversion.z_window = window;
        }
        if let Some(window) = self.value_window {
            config.alphas.value.window = window;
        }
        if let Some(capital) = self.capital {
            config.simulation.capital = capital;
        }
        config.validate()?;
        Ok(config)
    }
}

fn percent(value: f64) -> String {
    format!("{:>10.2}%", value * 100.0)
}

fn ratio(value: f64) -> String {
    if value.is_infinite() {
        format!("{:>10}", "inf")
    } else {
        format!("{value:>10.2}")
    }
}

/// Prints the metrics block of one run.
pub(crate) fn print_metrics(metrics: &PerformanceMetrics) {
    println!("Performance Metrics:");
    println!("  Total Return:      {}", percent(metrics.total_return));
    println!("  Annualized Return: {}", percent(metrics.annual_return));
    println!("  Annualized Vol:    {}", percent(metrics.annual_volatility));
    println!("  Sharpe Ratio:      {}", ratio(metrics.sharpe));
    println!("  Sortino Ratio:     {}", ratio(metrics.sortino));
    println!("  Calmar Ratio:      {}", ratio(metrics.calmar));
    println!("  Max Drawdown:      {}", percent(metrics.max_drawdown));
    println!("  Avg Drawdown:      {}", percent(metrics.avg_drawdown));
    println!();

    println!("Trading Metrics:");
    println!("  Win Rate:          {}", percent(metrics.win_rate));
    println!("  Profit Factor:     {}", ratio(metrics.profit_factor));
    println!("  Win/Loss Ratio:    {}", ratio(metrics.win_loss_ratio));
    println!("  Avg Turnover:      {}", percent(metrics.avg_turnover));
    println!("  Number of Trades:  {:>10}", metrics.n_trades);
    println!(
        "  Periods:           {:>10} ({:.1} years)",
        metrics.n_periods, metrics.years
    );
    println!();
}

/// Prints a boxed section title.
pub(crate) fn print_banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║ {title:^60} ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}
