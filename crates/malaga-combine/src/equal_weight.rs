//! Equal-weighted signal combination strategy.

use crate::combiner::Combiner;
use crate::model::LambdaModel;
use malaga_traits::{AlphaKind, AlphaSet, Fitted, PricePanel, Result};

/// Combiner that puts `1/K` on every alpha without looking at returns.
///
/// This is the same model the ridge combiner falls back to, offered as a
/// method of its own so runs can skip the regression entirely.
///
/// # Examples
///
/// ```rust,no_run
/// use malaga_combine::{Combiner, EqualWeightCombiner};
/// # fn demo(alphas: &malaga_traits::AlphaSet, prices: &malaga_traits::PricePanel) -> malaga_traits::Result<()> {
/// let model = EqualWeightCombiner.fit(alphas, prices)?.into_value();
/// let combined = model.predict(alphas)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWeightCombiner;

impl Combiner for EqualWeightCombiner {
    fn fit(&self, alphas: &AlphaSet, prices: &PricePanel) -> Result<Fitted<LambdaModel>> {
        prices
            .panel()
            .ensure_same_index(alphas.get(AlphaKind::Momentum), "alpha set")?;
        Ok(Fitted::Estimated(LambdaModel::equal()))
    }

    fn name(&self) -> &str {
        "equal_weight"
    }
}
