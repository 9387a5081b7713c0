//! Signal combination for the malaga backtest engine.
//!
//! This crate turns the five alpha score panels into one combined score
//! panel. A [`Combiner`] learns one weight per alpha, producing a
//! [`LambdaModel`]; the model then forms the weighted sum, centres it on the
//! cross-sectional median and scales it into `[-1, 1]`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use malaga_combine::{Combiner, RidgeCombiner};
//! # fn demo(alphas: &malaga_traits::AlphaSet, prices: &malaga_traits::PricePanel) -> malaga_traits::Result<()> {
//! let fitted = RidgeCombiner::default().fit(alphas, prices)?;
//! if let Some(reason) = fitted.reason() {
//!     eprintln!("falling back to equal weights: {reason}");
//! }
//! let combined = fitted.value().predict(alphas)?;
//! # Ok(())
//! # }
//! ```

mod combiner;
mod config;
mod equal_weight;
mod model;
mod ridge;

// Re-export main types
pub use combiner::Combiner;
pub use config::{CombineConfig, CombineMethod};
pub use equal_weight::EqualWeightCombiner;
pub use model::{LambdaModel, SCALE_QUANTILE};
pub use ridge::{RidgeCombiner, RidgeConfig};
