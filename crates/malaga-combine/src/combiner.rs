//! Core trait definition for signal combiners.

use crate::model::LambdaModel;
use malaga_traits::{AlphaSet, Fitted, PricePanel, Result};

/// Learns per-alpha weights from a full alpha set and its price panel.
///
/// A combiner produces a [`LambdaModel`]; the model turns any alpha set on
/// the same universe into a combined score panel. Fits that cannot run on
/// the data return a degraded model instead of an error.
///
/// # Examples
///
/// ```rust,no_run
/// use malaga_combine::{Combiner, LambdaModel};
/// use malaga_traits::{AlphaSet, Fitted, PricePanel, Result};
///
/// struct MomentumOnly;
///
/// impl Combiner for MomentumOnly {
///     fn fit(&self, _alphas: &AlphaSet, _prices: &PricePanel) -> Result<Fitted<LambdaModel>> {
///         Ok(Fitted::Estimated(LambdaModel::new([0.0, 1.0, 0.0, 0.0, 0.0])))
///     }
///
///     fn name(&self) -> &str {
///         "momentum_only"
///     }
/// }
/// ```
pub trait Combiner: Send + Sync {
    /// Fit alpha weights.
    ///
    /// # Errors
    ///
    /// Returns an error if the alpha set and the prices are not on the same
    /// index.
    fn fit(&self, alphas: &AlphaSet, prices: &PricePanel) -> Result<Fitted<LambdaModel>>;

    /// Name of this combination strategy.
    fn name(&self) -> &str;
}
