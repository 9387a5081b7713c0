//! Single-universe backtest command implementation.

use super::{OutputFormat, RunOptions, print_banner, print_metrics};
use crate::data;
use anyhow::{Context, Result};
use log::info;
use malaga::eval::RunSummary;
use malaga::report::write_run_reports;
use malaga::{AlphaKind, BacktestRun, run_backtest};
use std::path::Path;

/// Backtest the universe in `prices` and print or export the results.
pub(crate) fn run_universe(
    prices: &Path,
    universe: Option<String>,
    options: &RunOptions,
) -> Result<()> {
    let config = options.build_config()?;
    let universe = universe.unwrap_or_else(|| data::universe_name(prices));
    let panel = data::load_prices(prices)?;
    info!(
        "{universe}: loaded {} dates x {} symbols from {}",
        panel.n_dates(),
        panel.n_symbols(),
        prices.display()
    );

    let run = run_backtest(&universe, &panel, &config)
        .with_context(|| format!("backtesting {universe}"))?;

    if let Some(dir) = &options.output {
        let written = write_run_reports(&run, dir)
            .with_context(|| format!("writing reports to {}", dir.display()))?;
        info!("{universe}: wrote {} reports to {}", written.len(), dir.display());
    }

    match options.format {
        OutputFormat::Json => {
            let summary = RunSummary::succeeded(
                run.universe.clone(),
                run.mode(),
                run.metrics.clone(),
                run.degradations.len(),
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => print_run(&run),
    }
    Ok(())
}

fn print_run(run: &BacktestRun) {
    print_banner("Backtest");

    let dates = run.prices.dates();
    println!("Universe: {}", run.universe);
    println!("Symbols:  {}", run.prices.symbols().join(", "));
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        println!("Period:   {first} to {last}");
    }
    println!("Mode:     {}", run.mode().name());
    println!();

    println!("Alpha Weights:");
    let model = run.model.value();
    for kind in AlphaKind::ALL {
        println!("  {:20} {:>10.4}", kind.name(), model.lambda(kind));
    }
    if let Some(reason) = run.model.reason() {
        println!("  (fallback: {reason})");
    }
    println!();

    print_metrics(&run.metrics);

    if !run.degradations.is_empty() {
        println!("Degraded Fits:");
        for degradation in &run.degradations {
            println!("  {degradation}");
        }
        println!();
    }
}
