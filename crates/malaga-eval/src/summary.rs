//! Ranking many runs side by side.

use crate::backtest::SimulationMode;
use crate::metrics::PerformanceMetrics;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Outcome of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The run produced metrics.
    Succeeded,
    /// The run stopped with an error.
    Failed,
}

impl RunStatus {
    /// Label used in exported tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// One line of a [`MetricsSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Universe identifier.
    pub universe: String,
    /// Outcome.
    pub status: RunStatus,
    /// Simulation mode, when the run got that far.
    pub mode: Option<SimulationMode>,
    /// Metrics of a successful run.
    pub metrics: Option<PerformanceMetrics>,
    /// Number of degraded fits in the run.
    pub degradations: usize,
    /// Error message of a failed run.
    pub error: Option<String>,
}

impl RunSummary {
    /// A successful run.
    pub fn succeeded(
        universe: impl Into<String>,
        mode: SimulationMode,
        metrics: PerformanceMetrics,
        degradations: usize,
    ) -> Self {
        Self {
            universe: universe.into(),
            status: RunStatus::Succeeded,
            mode: Some(mode),
            metrics: Some(metrics),
            degradations,
            error: None,
        }
    }

    /// A failed run.
    pub fn failed(universe: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            universe: universe.into(),
            status: RunStatus::Failed,
            mode: None,
            metrics: None,
            degradations: 0,
            error: Some(error.into()),
        }
    }

    fn sharpe(&self) -> Option<f64> {
        self.metrics.as_ref().map(|m| m.sharpe)
    }
}

/// Runs ranked by Sharpe ratio, best first, with failed runs last.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
    rows: Vec<RunSummary>,
}

impl MetricsSummary {
    /// Ranks `rows`. Ties and failed runs are ordered by universe name.
    pub fn new(mut rows: Vec<RunSummary>) -> Self {
        rows.sort_by(|a, b| match (a.sharpe(), b.sharpe()) {
            (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.universe.cmp(&b.universe)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.universe.cmp(&b.universe),
        });
        Self { rows }
    }

    /// All rows in rank order.
    pub fn rows(&self) -> &[RunSummary] {
        &self.rows
    }

    /// Successful runs in rank order.
    pub fn succeeded(&self) -> impl Iterator<Item = &RunSummary> {
        self.rows.iter().filter(|r| r.status == RunStatus::Succeeded)
    }

    /// Failed runs.
    pub fn failed(&self) -> impl Iterator<Item = &RunSummary> {
        self.rows.iter().filter(|r| r.status == RunStatus::Failed)
    }

    /// The highest-ranked successful run.
    pub fn best(&self) -> Option<&RunSummary> {
        self.succeeded().next()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
