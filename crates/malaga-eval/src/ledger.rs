//! Per-instrument trade ledger.

use crate::weights::PositionClass;
use malaga_traits::{AlphaKind, AlphaSet, Date, MalagaError, Panel, PricePanel, Result, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to an instrument's position on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// A long position was opened, possibly reversing a short.
    OpenLong,
    /// A short position was opened, possibly reversing a long.
    OpenShort,
    /// An open position was closed.
    Close,
    /// A long position was kept.
    HoldLong,
    /// A short position was kept.
    HoldShort,
    /// Flat before and after.
    Wait,
}

impl Action {
    /// Derives the action from the previous and current position class.
    #[must_use]
    pub const fn from_transition(previous: PositionClass, current: PositionClass) -> Self {
        match (previous, current) {
            (PositionClass::Long, PositionClass::Long) => Self::HoldLong,
            (PositionClass::Short, PositionClass::Short) => Self::HoldShort,
            (_, PositionClass::Long) => Self::OpenLong,
            (_, PositionClass::Short) => Self::OpenShort,
            (PositionClass::Flat, PositionClass::Flat) => Self::Wait,
            (_, PositionClass::Flat) => Self::Close,
        }
    }

    /// Label used in exported tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenLong => "OPEN_LONG",
            Self::OpenShort => "OPEN_SHORT",
            Self::Close => "CLOSE",
            Self::HoldLong => "HOLD_LONG",
            Self::HoldShort => "HOLD_SHORT",
            Self::Wait => "WAIT",
        }
    }

    /// Whether the action opens a position.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::OpenLong | Self::OpenShort)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (date, instrument) line of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Decision date.
    pub date: Date,
    /// Instrument.
    pub symbol: Symbol,
    /// Position change.
    pub action: Action,
    /// `floor(|weight| × capital / close)`, 0 without a usable close.
    pub shares: u64,
    /// Closing price, `None` when missing.
    pub close: Option<f64>,
    /// Effective target weight.
    pub weight: f64,
    /// Position class after the decision.
    pub position: PositionClass,
    /// Alpha scores in [`AlphaKind::ALL`] order, `None` when missing.
    pub scores: [Option<f64>; AlphaKind::COUNT],
}

/// Share count for a weight at a closing price.
#[must_use]
pub fn share_count(weight: f64, capital: f64, close: Option<f64>) -> u64 {
    match close {
        Some(price) if price > 0.0 && weight.is_finite() => {
            (weight.abs() * capital / price).floor() as u64
        }
        _ => 0,
    }
}

/// Builds the ledger from effective weights and position classes.
///
/// `weights` are the held weights and `positions` the held `{-1, 0, +1}`
/// classes, both on the price index. The class before the first date is
/// flat. Records are ordered by date, then symbol.
///
/// # Errors
///
/// Returns [`MalagaError::ShapeMismatch`] if any input is on another index.
pub fn build_ledger(
    weights: &Panel,
    positions: &Panel,
    prices: &PricePanel,
    alphas: &AlphaSet,
    capital: f64,
) -> Result<Vec<TradeRecord>> {
    let index = prices.panel();
    index.ensure_same_index(weights, "weights")?;
    index.ensure_same_index(positions, "positions")?;
    if alphas.dates() != index.dates() || alphas.symbols() != index.symbols() {
        return Err(MalagaError::ShapeMismatch(
            "alpha set is not on the price index".to_string(),
        ));
    }

    let (n_dates, n_symbols) = (index.n_dates(), index.n_symbols());
    let mut ledger = Vec::with_capacity(n_dates * n_symbols);
    let mut previous = vec![PositionClass::Flat; n_symbols];
    for (t, date) in index.dates().iter().enumerate() {
        for (i, symbol) in index.symbols().iter().enumerate() {
            let current = class_of(positions.get(t, i));
            let weight = weights.get(t, i).unwrap_or(0.0);
            let close = prices.get(t, i);
            ledger.push(TradeRecord {
                date: *date,
                symbol: symbol.clone(),
                action: Action::from_transition(previous[i], current),
                shares: share_count(weight, capital, close),
                close,
                weight,
                position: current,
                scores: AlphaKind::ALL.map(|kind| alphas.get(kind).get(t, i)),
            });
            previous[i] = current;
        }
    }
    Ok(ledger)
}

fn class_of(value: Option<f64>) -> PositionClass {
    match value {
        Some(v) if v > 0.0 => PositionClass::Long,
        Some(v) if v < 0.0 => PositionClass::Short,
        _ => PositionClass::Flat,
    }
}

/// Number of positions opened.
pub fn count_opens(ledger: &[TradeRecord]) -> usize {
    ledger.iter().filter(|r| r.action.is_open()).count()
}

/// Records of the last date whose action is not [`Action::Wait`].
pub fn latest_actions(ledger: &[TradeRecord]) -> Vec<&TradeRecord> {
    let Some(last) = ledger.iter().map(|r| r.date).max() else {
        return Vec::new();
    };
    ledger
        .iter()
        .filter(|r| r.date == last && r.action != Action::Wait)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use malaga_traits::date_range;
    use ndarray::{Array2, array};

    #[test]
    fn test_transitions() {
        use PositionClass::{Flat, Long, Short};
        assert_eq!(Action::from_transition(Flat, Long), Action::OpenLong);
        assert_eq!(Action::from_transition(Short, Long), Action::OpenLong);
        assert_eq!(Action::from_transition(Long, Short), Action::OpenShort);
        assert_eq!(Action::from_transition(Long, Flat), Action::Close);
        assert_eq!(Action::from_transition(Short, Flat), Action::Close);
        assert_eq!(Action::from_transition(Long, Long), Action::HoldLong);
        assert_eq!(Action::from_transition(Short, Short), Action::HoldShort);
        assert_eq!(Action::from_transition(Flat, Flat), Action::Wait);
        assert_eq!(Action::OpenShort.to_string(), "OPEN_SHORT");
    }

    #[test]
    fn test_share_count() {
        assert_eq!(share_count(0.5, 1e9, Some(100.0)), 5_000_000);
        assert_eq!(share_count(-0.25, 1000.0, Some(3.0)), 83);
        assert_eq!(share_count(0.5, 1e9, None), 0);
        assert_eq!(share_count(0.5, 1e9, Some(0.0)), 0);
    }

    #[test]
    fn test_build_ledger() {
        let dates = date_range(Date::from_ymd_opt(2024, 2, 1).unwrap(), 3);
        let symbols = vec!["AAA".to_string(), "BBB".to_string()];
        let panel = |values: Array2<f64>| Panel::new(dates.clone(), symbols.clone(), values).unwrap();

        let weights = panel(array![[0.5, -0.5], [0.5, -0.5], [0.0, 1.0]]);
        let positions = panel(array![[1.0, -1.0], [1.0, -1.0], [0.0, 1.0]]);
        let prices = PricePanel::new(
            dates.clone(),
            symbols.clone(),
            array![[10.0, 20.0], [11.0, f64::NAN], [12.0, 25.0]],
        )
        .unwrap();
        let scores = panel(Array2::from_elem((3, 2), 0.25));
        let alphas = AlphaSet::new(std::array::from_fn(|_| scores.clone())).unwrap();

        let ledger = build_ledger(&weights, &positions, &prices, &alphas, 1000.0).unwrap();
        assert_eq!(ledger.len(), 6);
        let actions: Vec<Action> = ledger.iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            vec![
                Action::OpenLong,
                Action::OpenShort,
                Action::HoldLong,
                Action::HoldShort,
                Action::Close,
                Action::OpenLong,
            ]
        );
        assert_eq!(ledger[0].shares, 50);
        assert_eq!(ledger[3].shares, 0);
        assert_eq!(ledger[3].close, None);
        assert_eq!(ledger[5].shares, 40);
        assert_eq!(ledger[5].scores, [Some(0.25); AlphaKind::COUNT]);
        assert_eq!(count_opens(&ledger), 3);

        let latest = latest_actions(&ledger);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].action, Action::Close);
    }
}
