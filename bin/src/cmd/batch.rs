//! Batch backtest command implementation.

use super::{OutputFormat, RunOptions, print_banner};
use crate::data;
use anyhow::{Context, Result, bail};
use log::{error, info};
use malaga::eval::{MetricsSummary, RunStatus};
use malaga::report::{summary_frame, write_csv, write_run_reports};
use malaga::run_batch;
use std::path::Path;

/// Backtest every price CSV in `dir`, one universe per file.
///
/// An invalid configuration stops the command before any file is read. A
/// file that fails to load or run is reported as a failed row; the command
/// only fails when no universe completes.
pub(crate) fn run_directory(dir: &Path, options: &RunOptions) -> Result<()> {
    let config = options.build_config()?;
    let files = data::price_files(dir)?;
    if files.is_empty() {
        bail!("no price CSVs found in {}", dir.display());
    }

    let mut universes = Vec::with_capacity(files.len());
    let mut load_failures = Vec::new();
    for path in &files {
        let name = data::universe_name(path);
        match data::load_prices(path) {
            Ok(prices) => universes.push((name, prices)),
            Err(e) => {
                error!("{name}: {e:#}");
                load_failures.push((name, format!("{e:#}")));
            }
        }
    }

    let mut outcome = run_batch(&universes, &config)?;
    for (name, message) in load_failures {
        outcome.push_failure(name, message);
    }

    if let Some(out) = &options.output {
        for run in &outcome.runs {
            write_run_reports(run, out)
                .with_context(|| format!("writing reports for {}", run.universe))?;
        }
        let mut df = summary_frame(&outcome.summary())?;
        let path = out.join("summary.csv");
        write_csv(&mut df, &path)?;
        info!("wrote {} universes to {}", outcome.runs.len(), out.display());
    }

    let summary = outcome.summary();
    match options.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary.rows())?),
        OutputFormat::Text => print_summary(&summary),
    }

    if outcome.all_failed() {
        bail!("all {} universes failed", summary.len());
    }
    Ok(())
}

fn print_summary(summary: &MetricsSummary) {
    print_banner("Batch Summary");

    println!(
        "{:<16} {:>10} {:>10} {:>8} {:>8} {:>10} {:>8}",
        "Universe", "Return", "Ann.Vol", "Sharpe", "Sortino", "MaxDD", "Trades"
    );
    println!("{}", "-".repeat(76));
    for row in summary.rows() {
        match (&row.metrics, row.status) {
            (Some(m), RunStatus::Succeeded) => println!(
                "{:<16} {:>9.2}% {:>9.2}% {:>8.2} {:>8.2} {:>9.2}% {:>8}",
                row.universe,
                m.annual_return * 100.0,
                m.annual_volatility * 100.0,
                m.sharpe,
                m.sortino,
                m.max_drawdown * 100.0,
                m.n_trades
            ),
            _ => println!(
                "{:<16} FAILED: {}",
                row.universe,
                row.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    println!();

    if let Some(best) = summary.best() {
        println!("Best Sharpe: {}", best.universe);
    }
    println!(
        "Completed:   {} of {}",
        summary.succeeded().count(),
        summary.len()
    );
    println!();
}
