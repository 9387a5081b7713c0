//! Running many universes side by side.

use crate::config::RunConfig;
use crate::pipeline::{BacktestRun, run_backtest};
use log::{error, info};
use malaga_eval::{MetricsSummary, RunSummary};
use malaga_traits::{PricePanel, Result};
use rayon::prelude::*;

/// Results of a batch: the runs that completed and the ones that did not.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Completed runs, ordered by universe name.
    pub runs: Vec<BacktestRun>,
    /// `(universe, error message)` of every failed run.
    pub failures: Vec<(String, String)>,
}

impl BatchOutcome {
    /// Records a universe that failed before or during its run.
    pub fn push_failure(&mut self, universe: impl Into<String>, message: impl Into<String>) {
        self.failures.push((universe.into(), message.into()));
    }

    /// Ranked summary of every universe, failures included.
    pub fn summary(&self) -> MetricsSummary {
        let succeeded = self.runs.iter().map(|run| {
            RunSummary::succeeded(
                run.universe.clone(),
                run.mode(),
                run.metrics.clone(),
                run.degradations.len(),
            )
        });
        let failed = self
            .failures
            .iter()
            .map(|(universe, message)| RunSummary::failed(universe.clone(), message.clone()));
        MetricsSummary::new(succeeded.chain(failed).collect())
    }

    /// Whether no universe completed.
    pub fn all_failed(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Runs every universe in parallel with the same configuration.
///
/// The configuration is shared by every universe and validated once up
/// front. Each universe is then isolated: an error is logged with the
/// universe name and recorded in [`BatchOutcome::failures`] while the others
/// continue.
///
/// # Errors
///
/// Returns [`malaga_traits::MalagaError::InvalidConfig`] before any universe
/// runs when the configuration is invalid.
pub fn run_batch(universes: &[(String, PricePanel)], config: &RunConfig) -> Result<BatchOutcome> {
    config.validate()?;
    info!("running batch of {} universes", universes.len());
    let results: Vec<_> = universes
        .par_iter()
        .map(|(name, prices)| (name, run_backtest(name, prices, config)))
        .collect();

    let mut outcome = BatchOutcome::default();
    for (name, result) in results {
        match result {
            Ok(run) => outcome.runs.push(run),
            Err(e) => {
                error!("{name}: run failed: {e}");
                outcome.push_failure(name.clone(), e.to_string());
            }
        }
    }
    outcome.runs.sort_by(|a, b| a.universe.cmp(&b.universe));
    outcome.failures.sort();
    info!(
        "batch finished: {} succeeded, {} failed",
        outcome.runs.len(),
        outcome.failures.len()
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use malaga_eval::RunStatus;
    use malaga_traits::MalagaError;
    use malaga_traits::{Date, date_range};
    use ndarray::Array2;

    fn universe(name: &str, drift: f64) -> (String, PricePanel) {
        let n_dates = 90;
        let dates = date_range(Date::from_ymd_opt(2021, 3, 1).unwrap(), n_dates);
        let symbols = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let values = Array2::from_shape_fn((n_dates, 3), |(t, i)| {
            let noise = ((t * 13 + i * 7) % 17) as f64 * 0.05;
            (100.0 + 10.0 * i as f64) * (1.0 + drift * i as f64).powi(t as i32) + noise
        });
        (name.to_string(), PricePanel::new(dates, symbols, values).unwrap())
    }

    #[test]
    fn test_failure_is_isolated() {
        let universes = vec![universe("tech", 0.001), universe("energy", -0.001)];
        let mut config = RunConfig::default();
        config.alphas.momentum.window = 20;
        let mut outcome = run_batch(&universes, &config).unwrap();
        assert_eq!(outcome.runs.len(), 2);
        assert_eq!(outcome.runs[0].universe, "energy");

        outcome.push_failure("broken", "missing column 'close'");
        let summary = outcome.summary();
        assert_eq!(summary.len(), 3);
        assert_eq!(summary.rows()[2].status, RunStatus::Failed);
        assert_eq!(summary.rows()[2].universe, "broken");
        assert!(!outcome.all_failed());
    }

    #[test]
    fn test_invalid_config_fails_before_any_run() {
        let universes = vec![universe("tech", 0.001), universe("energy", -0.001)];
        let mut config = RunConfig::default();
        config.alphas.momentum.window = 0;
        let err = run_batch(&universes, &config).unwrap_err();
        assert!(matches!(err, MalagaError::InvalidConfig(ref msg) if msg.contains("momentum.window")));
    }
}
