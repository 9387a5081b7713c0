#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for the malaga multi-alpha backtest engine.
//!
//! This crate provides the foundational data structures shared by every stage
//! of the pipeline: the price and score panels, the error type, the tagged
//! result used for graceful numerical fallbacks, and the small numeric kernels
//! (rolling windows, cross-sectional ranks, dense linear algebra) that the
//! alpha scorers and the combiner are built from.

/// The version of the malaga-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod alpha;
pub mod error;
pub mod fitted;
pub mod linalg;
pub mod panel;
pub mod stats;
pub mod types;

pub use alpha::{AlphaKind, AlphaScorer, AlphaSet, ScoreOutput};
pub use error::{MalagaError, Result};
pub use fitted::{DegradeReason, Degradation, Fitted};
pub use panel::{Panel, PricePanel};
pub use types::{CE_TO_UNIX_EPOCH_DAYS, Date, MarketData, Symbol, date_range, epoch_days};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
