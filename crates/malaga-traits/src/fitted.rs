//! Tagged results for estimators that may fall back to a default.
//!
//! Estimation steps such as the cointegration fit or the ridge regression do
//! not fail the run when the data is too short or numerically degenerate.
//! They return a [`Fitted::Degraded`] value carrying the fallback together with
//! the reason, so callers can log it and surface it in reports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an estimator returned its fallback value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegradeReason {
    /// Fewer usable observations than the estimator needs.
    InsufficientData {
        /// Observations required.
        required: usize,
        /// Observations available.
        available: usize,
    },
    /// The estimation window contains missing or non-finite values.
    NonFiniteInput,
    /// A matrix that must be positive definite is not.
    Singular,
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData {
                required,
                available,
            } => write!(
                f,
                "insufficient data ({available} usable rows, {required} required)"
            ),
            Self::NonFiniteInput => write!(f, "non-finite values in estimation window"),
            Self::Singular => write!(f, "singular system"),
        }
    }
}

/// The outcome of an estimation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Fitted<T> {
    /// The estimator ran on the data as intended.
    Estimated(T),
    /// The estimator could not run and returned a documented fallback.
    Degraded {
        /// The fallback value.
        value: T,
        /// Why the fallback was used.
        reason: DegradeReason,
    },
}

impl<T> Fitted<T> {
    /// Wraps a fallback value.
    pub const fn degraded(value: T, reason: DegradeReason) -> Self {
        Self::Degraded { value, reason }
    }

    /// Returns the fitted or fallback value.
    pub const fn value(&self) -> &T {
        match self {
            Self::Estimated(value) | Self::Degraded { value, .. } => value,
        }
    }

    /// Consumes the tag and returns the value.
    pub fn into_value(self) -> T {
        match self {
            Self::Estimated(value) | Self::Degraded { value, .. } => value,
        }
    }

    /// Returns `true` when the fallback was used.
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// The fallback reason, if any.
    pub const fn reason(&self) -> Option<&DegradeReason> {
        match self {
            Self::Estimated(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// A fallback taken somewhere in a run, as recorded in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
    /// The component that degraded, e.g. `"mean_reversion"` or `"ridge"`.
    pub source: String,
    /// Why it degraded.
    pub reason: DegradeReason,
}

impl Degradation {
    /// Creates a new degradation note.
    pub fn new(source: impl Into<String>, reason: DegradeReason) -> Self {
        Self {
            source: source.into(),
            reason,
        }
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_accessors() {
        let fitted = Fitted::Estimated(vec![0.5, 0.5]);
        assert!(!fitted.is_degraded());
        assert!(fitted.reason().is_none());
        assert_eq!(fitted.value(), &vec![0.5, 0.5]);
    }

    #[test]
    fn test_reason_display() {
        let reason = DegradeReason::InsufficientData {
            required: 252,
            available: 40,
        };
        assert_eq!(
            reason.to_string(),
            "insufficient data (40 usable rows, 252 required)"
        );
        let note = Degradation::new("ridge", reason);
        assert!(note.to_string().starts_with("ridge: "));
    }
}
