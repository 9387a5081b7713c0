//! Alpha scorers for the malaga backtest engine.
//!
//! This crate provides the five alpha families scored over a whole
//! [`PricePanel`](malaga_traits::PricePanel):
//! - Mean reversion: z-score of a Johansen cointegration spread
//! - Momentum: volatility-adjusted trailing log return, ranked
//! - Volatility regime: short over long realised volatility, z-scored
//! - Reversal: negated one-day return, ranked
//! - Value: negated position in the trailing price range, ranked
//!
//! Every score lies in `[-1, 1]` and only uses prices at or before its date.
//!
//! # Example
//!
//! ```ignore
//! use malaga_signals::{AlphaConfig, compute_alphas};
//!
//! let output = compute_alphas(&prices, &AlphaConfig::default())?;
//! let momentum = output.alphas.get(AlphaKind::Momentum);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod mean_reversion;
pub mod momentum;
mod rank;
pub mod registry;
pub mod reversal;
pub mod set;
pub mod value;
pub mod volatility;

#[cfg(test)]
mod testing;

// Re-export key types
pub use malaga_traits::{AlphaKind, AlphaScorer, AlphaSet, ScoreOutput};
pub use mean_reversion::{MeanReversion, MeanReversionConfig};
pub use momentum::{Momentum, MomentumConfig};
pub use registry::{AlphaCategory, AlphaInfo, available_alphas};
pub use reversal::{Reversal, ReversalConfig};
pub use set::{AlphaConfig, AlphaOutput, compute_alphas};
pub use value::{Value, ValueConfig};
pub use volatility::{VolatilityRegime, VolatilityRegimeConfig};
