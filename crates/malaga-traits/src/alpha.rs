//! The alpha scoring abstraction.
//!
//! An alpha scorer turns a [`PricePanel`] into a score panel on the same
//! index whose present cells lie in `[-1, 1]`. The set of alphas is closed:
//! [`AlphaKind`] enumerates them and [`AlphaSet`] stores exactly one score
//! panel per kind.

use crate::error::{MalagaError, Result};
use crate::fitted::Degradation;
use crate::panel::{Panel, PricePanel};
use crate::types::{Date, Symbol};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five alpha families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaKind {
    /// Spread z-score of a cointegrating combination of the universe.
    MeanReversion,
    /// Volatility-adjusted trailing log return, ranked.
    Momentum,
    /// Short over long realised volatility, z-scored per instrument.
    VolatilityRegime,
    /// Negated one-period return, ranked.
    Reversal,
    /// Negated position within the trailing price range, ranked.
    Value,
}

impl AlphaKind {
    /// Number of alpha kinds.
    pub const COUNT: usize = 5;

    /// Every kind, in storage and export order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::MeanReversion,
        Self::Momentum,
        Self::VolatilityRegime,
        Self::Reversal,
        Self::Value,
    ];

    /// Position of this kind in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::MeanReversion => 0,
            Self::Momentum => 1,
            Self::VolatilityRegime => 2,
            Self::Reversal => 3,
            Self::Value => 4,
        }
    }

    /// Short code used as a column prefix in exported tables.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MeanReversion => "MR",
            Self::Momentum => "Mom",
            Self::VolatilityRegime => "VB",
            Self::Reversal => "XSR",
            Self::Value => "Val",
        }
    }

    /// Snake-case identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MeanReversion => "mean_reversion",
            Self::Momentum => "momentum",
            Self::VolatilityRegime => "volatility_regime",
            Self::Reversal => "reversal",
            Self::Value => "value",
        }
    }
}

impl fmt::Display for AlphaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlphaKind {
    type Err = MalagaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s || k.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| MalagaError::InvalidConfig(format!("unknown alpha '{s}'")))
    }
}

/// A score panel plus the fallbacks taken while computing it.
#[derive(Debug, Clone)]
pub struct ScoreOutput {
    /// Scores in `[-1, 1]`, `NaN` where undefined.
    pub scores: Panel,
    /// Fallback branches taken.
    pub degradations: Vec<Degradation>,
}

impl ScoreOutput {
    /// A score panel with no fallbacks.
    pub const fn new(scores: Panel) -> Self {
        Self {
            scores,
            degradations: Vec::new(),
        }
    }
}

/// Computes one alpha over a whole price panel.
///
/// Implementations must be causal: the cell at date `t` may only depend on
/// prices at or before `t`.
pub trait AlphaScorer: Send + Sync {
    /// Which alpha this scorer produces.
    fn kind(&self) -> AlphaKind;

    /// Number of periods of history needed before the first non-neutral score.
    fn lookback(&self) -> usize;

    /// Scores every (date, symbol) cell.
    ///
    /// # Errors
    ///
    /// Only on malformed input. Numerical trouble is reported through
    /// [`ScoreOutput::degradations`].
    fn score(&self, prices: &PricePanel) -> Result<ScoreOutput>;

    /// Identifier used in logs.
    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// One score panel per [`AlphaKind`], all on the same index.
#[derive(Debug, Clone)]
pub struct AlphaSet {
    panels: [Panel; AlphaKind::COUNT],
}

impl AlphaSet {
    /// Builds a set from panels given in [`AlphaKind::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::ShapeMismatch`] if the panels do not share an index.
    pub fn new(panels: [Panel; AlphaKind::COUNT]) -> Result<Self> {
        let (first, rest) = panels.split_first().ok_or("empty alpha set")?;
        for (kind, panel) in AlphaKind::ALL[1..].iter().zip(rest) {
            first.ensure_same_index(panel, kind.name())?;
        }
        Ok(Self { panels })
    }

    /// The score panel of `kind`.
    pub const fn get(&self, kind: AlphaKind) -> &Panel {
        &self.panels[kind.index()]
    }

    /// Iterates `(kind, panel)` in [`AlphaKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (AlphaKind, &Panel)> {
        AlphaKind::ALL.into_iter().zip(self.panels.iter())
    }

    /// Shared row dates.
    pub fn dates(&self) -> &[Date] {
        self.panels[0].dates()
    }

    /// Shared column symbols.
    pub fn symbols(&self) -> &[Symbol] {
        self.panels[0].symbols()
    }

    /// Number of dates.
    pub fn n_dates(&self) -> usize {
        self.panels[0].n_dates()
    }

    /// Number of symbols.
    pub fn n_symbols(&self) -> usize {
        self.panels[0].n_symbols()
    }

    /// A panel on the shared index holding `values`.
    pub fn panel_with(&self, values: Array2<f64>) -> Result<Panel> {
        self.panels[0].with_values(values)
    }
}
