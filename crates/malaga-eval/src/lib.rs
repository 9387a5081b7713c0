//! Portfolio construction, backtesting and performance evaluation for malaga.
//!
//! This crate covers everything after the combined score:
//! - Target weights under a gross exposure cap, and discrete positions
//! - Lagged multi-instrument simulation with hold-forward of missing rows
//! - A per-instrument trade ledger with share counts
//! - A single-instrument long-only simulator with cash accounting, a
//!   library-only entry point that the multi-instrument pipeline does not use
//! - Performance metrics and a ranked summary of many runs
//!
//! # Example
//!
//! ```rust
//! use malaga_eval::{MetricsConfig, PerformanceMetrics, equity_curve};
//!
//! let returns = [0.0, 0.01, -0.005, 0.02];
//! let equity = equity_curve(&returns);
//! let metrics = PerformanceMetrics::from_returns(&returns, &MetricsConfig::default());
//! assert!((equity[3] - 1.0 - metrics.total_return).abs() < 1e-12);
//! ```

pub mod backtest;
pub mod ledger;
pub mod long_only;
pub mod metrics;
pub mod summary;
pub mod weights;

// Re-export main types
pub use backtest::{
    Simulation, SimulationConfig, SimulationMode, drawdown_series, equity_curve, hold_forward,
    simulate_returns,
};
pub use ledger::{Action, TradeRecord, build_ledger, count_opens, latest_actions, share_count};
pub use long_only::{Bar, Fill, LongOnlyConfig, LongOnlyResult, Side, backtest_long_only};
pub use metrics::{MetricsConfig, PerformanceMetrics};
pub use summary::{MetricsSummary, RunStatus, RunSummary};
pub use weights::{
    PositionClass, WeightConfig, continuous_weights, discrete_positions, gross_exposure,
};
