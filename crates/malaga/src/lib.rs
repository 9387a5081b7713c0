#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # malaga
//!
//! Multi-alpha long/short equity backtest engine.
//!
//! malaga is an umbrella crate: it re-exports the sub-crates and adds the
//! run configuration, the single-universe pipeline, the batch runner and the
//! tabular reports.
//!
//! ## Quick Start
//!
//! ```no_run
//! use malaga::{PricePanel, RunConfig, Result, run_backtest};
//! use malaga::report::{summary_frame, write_run_reports};
//!
//! # fn main() -> Result<()> {
//! # let prices: PricePanel = unimplemented!();
//! let config = RunConfig::default();
//! let run = run_backtest("tech", &prices, &config)?;
//! println!("sharpe {:.2}", run.metrics.sharpe);
//! write_run_reports(&run, std::path::Path::new("out"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - panels, errors, the degraded-result tag, numeric helpers
//! - [`signals`] - the five alpha scorers
//! - [`combine`] - ridge and equal-weight signal combination
//! - [`eval`] - weights, simulators, ledger and metrics
//!
//! ## Architecture
//!
//! 1. **Alphas** score every (date, symbol) cell in `[-1, 1]`
//! 2. **The combiner** learns one weight per alpha and blends the scores
//! 3. **The weight builder** caps gross exposure and thresholds positions
//! 4. **The simulator** applies holdings with a one-period lag
//! 5. **The evaluator** summarises the return series

/// Version information for the malaga crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod batch;
pub mod config;
pub mod pipeline;
pub mod report;

/// Shared types: panels, errors and numeric helpers.
pub mod traits {
    pub use malaga_traits::*;
}

/// Alpha scorers and the alpha registry.
pub mod signals {
    pub use malaga_signals::*;
}

/// Signal combination.
pub mod combine {
    pub use malaga_combine::*;
}

/// Portfolio construction, simulation and evaluation.
pub mod eval {
    pub use malaga_eval::*;
}

pub use batch::{BatchOutcome, run_batch};
pub use config::RunConfig;
pub use pipeline::{BacktestRun, run_backtest};

// Re-export common types
pub use malaga_combine::{Combiner, LambdaModel};
pub use malaga_eval::{MetricsSummary, PerformanceMetrics, SimulationMode};
pub use malaga_traits::{
    AlphaKind, AlphaSet, Date, Degradation, Fitted, MalagaError, MarketData, Panel, PricePanel,
    Result, Symbol,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        AlphaKind, BacktestRun, MalagaError, PricePanel, Result, RunConfig, run_backtest,
        run_batch,
    };
}
