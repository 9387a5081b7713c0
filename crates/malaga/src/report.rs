//! Tabular reports as polars data frames, and CSV export.
//!
//! Column names follow the layout downstream spreadsheets expect: alpha
//! score columns are `{code}_{symbol}` (e.g. `Mom_AAPL`), position columns
//! `Weight_{symbol}`, `Pos_{symbol}` and `Close_{symbol}`.

use crate::pipeline::BacktestRun;
use malaga_eval::{
    MetricsSummary, Simulation, TradeRecord, hold_forward, latest_actions,
};
use malaga_traits::{AlphaKind, AlphaSet, Date, Result, epoch_days};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

fn date_column(name: &str, dates: &[Date]) -> Result<Column> {
    let days: Vec<i32> = dates.iter().copied().map(epoch_days).collect();
    Ok(Column::new(name.into(), days).cast(&DataType::Date)?)
}

/// One value column per present cell, missing as null.
fn value_column(name: String, values: impl Iterator<Item = f64>) -> Column {
    let values: Vec<Option<f64>> = values.map(|v| (!v.is_nan()).then_some(v)).collect();
    Column::new(name.into(), values)
}

/// `Date` plus one `{code}_{symbol}` column per alpha and symbol.
pub fn signals_frame(alphas: &AlphaSet) -> Result<DataFrame> {
    let mut columns = vec![date_column("Date", alphas.dates())?];
    for (kind, panel) in alphas.iter() {
        for (i, symbol) in panel.symbols().iter().enumerate() {
            columns.push(value_column(
                format!("{}_{symbol}", kind.code()),
                panel.column(i).iter().copied(),
            ));
        }
    }
    Ok(DataFrame::new(columns)?)
}

/// `Date` plus held `Weight_`, `Pos_` and `Close_` columns per symbol.
pub fn positions_frame(run: &BacktestRun) -> Result<DataFrame> {
    let weights = hold_forward(&run.weights);
    let positions = hold_forward(&run.positions);
    let mut columns = vec![date_column("Date", run.prices.dates())?];
    for (i, symbol) in run.prices.symbols().iter().enumerate() {
        columns.push(Column::new(
            format!("Weight_{symbol}").into(),
            weights.column(i).to_vec(),
        ));
        columns.push(Column::new(
            format!("Pos_{symbol}").into(),
            positions.column(i).iter().map(|p| *p as i32).collect::<Vec<_>>(),
        ));
        columns.push(value_column(
            format!("Close_{symbol}"),
            run.prices.values().column(i).iter().copied(),
        ));
    }
    Ok(DataFrame::new(columns)?)
}

/// The trade ledger, one row per record.
pub fn trades_frame(universe: &str, ledger: &[TradeRecord]) -> Result<DataFrame> {
    let records: Vec<&TradeRecord> = ledger.iter().collect();
    ledger_frame(universe, &records)
}

/// Ledger rows of the last date whose action is not `WAIT`.
pub fn latest_signals_frame(universe: &str, ledger: &[TradeRecord]) -> Result<DataFrame> {
    ledger_frame(universe, &latest_actions(ledger))
}

fn ledger_frame(universe: &str, records: &[&TradeRecord]) -> Result<DataFrame> {
    let dates: Vec<Date> = records.iter().map(|r| r.date).collect();
    let mut columns = vec![
        date_column("Date", &dates)?,
        Column::new("Universe".into(), vec![universe; records.len()]),
        Column::new(
            "Ticker".into(),
            records.iter().map(|r| r.symbol.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "Action".into(),
            records.iter().map(|r| r.action.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "Shares_Qty".into(),
            records.iter().map(|r| r.shares).collect::<Vec<_>>(),
        ),
        Column::new(
            "Close".into(),
            records.iter().map(|r| r.close).collect::<Vec<_>>(),
        ),
        Column::new(
            "Final_Weight".into(),
            records.iter().map(|r| r.weight).collect::<Vec<_>>(),
        ),
        Column::new(
            "Position".into(),
            records
                .iter()
                .map(|r| r.position.signum() as i32)
                .collect::<Vec<_>>(),
        ),
    ];
    for kind in AlphaKind::ALL {
        columns.push(Column::new(
            format!("Score_{}", kind.code()).into(),
            records
                .iter()
                .map(|r| r.scores[kind.index()])
                .collect::<Vec<_>>(),
        ));
    }
    Ok(DataFrame::new(columns)?)
}

/// `Date`, `Cumulative_Return`, `Daily_Return`, `Drawdown`.
///
/// `Cumulative_Return` is the compounded equity level, starting at 1.
pub fn equity_frame(simulation: &Simulation) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        date_column("Date", simulation.dates())?,
        Column::new("Cumulative_Return".into(), simulation.equity.clone()),
        Column::new("Daily_Return".into(), simulation.returns.clone()),
        Column::new("Drawdown".into(), simulation.drawdown.clone()),
    ])?)
}

/// Alpha weights of a run, one row per alpha.
pub fn lambdas_frame(run: &BacktestRun) -> Result<DataFrame> {
    let model = run.model.value();
    let reason = run.model.reason().map(ToString::to_string);
    Ok(DataFrame::new(vec![
        Column::new(
            "alpha".into(),
            AlphaKind::ALL.iter().map(|k| k.name()).collect::<Vec<_>>(),
        ),
        Column::new(
            "code".into(),
            AlphaKind::ALL.iter().map(|k| k.code()).collect::<Vec<_>>(),
        ),
        Column::new("lambda".into(), model.lambdas().to_vec()),
        Column::new(
            "degraded".into(),
            vec![reason.as_deref(); AlphaKind::COUNT],
        ),
    ])?)
}

/// One row per run in rank order, with a `status` column.
///
/// Metric columns are null for failed runs.
pub fn summary_frame(summary: &MetricsSummary) -> Result<DataFrame> {
    let rows = summary.rows();
    let metric = |f: fn(&malaga_eval::PerformanceMetrics) -> f64| -> Vec<Option<f64>> {
        rows.iter().map(|r| r.metrics.as_ref().map(f)).collect()
    };
    let count = |f: fn(&malaga_eval::PerformanceMetrics) -> usize| -> Vec<Option<u64>> {
        rows.iter()
            .map(|r| r.metrics.as_ref().map(|m| f(m) as u64))
            .collect()
    };
    Ok(DataFrame::new(vec![
        Column::new(
            "universe".into(),
            rows.iter().map(|r| r.universe.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "status".into(),
            rows.iter().map(|r| r.status.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "mode".into(),
            rows.iter()
                .map(|r| r.mode.map(|m| m.name()))
                .collect::<Vec<_>>(),
        ),
        Column::new("total_return".into(), metric(|m| m.total_return)),
        Column::new("annual_return".into(), metric(|m| m.annual_return)),
        Column::new("annual_volatility".into(), metric(|m| m.annual_volatility)),
        Column::new("sharpe".into(), metric(|m| m.sharpe)),
        Column::new("sortino".into(), metric(|m| m.sortino)),
        Column::new("calmar".into(), metric(|m| m.calmar)),
        Column::new("max_drawdown".into(), metric(|m| m.max_drawdown)),
        Column::new("avg_drawdown".into(), metric(|m| m.avg_drawdown)),
        Column::new("win_rate".into(), metric(|m| m.win_rate)),
        Column::new("profit_factor".into(), metric(|m| m.profit_factor)),
        Column::new("win_loss_ratio".into(), metric(|m| m.win_loss_ratio)),
        Column::new("n_periods".into(), count(|m| m.n_periods)),
        Column::new("years".into(), metric(|m| m.years)),
        Column::new("avg_turnover".into(), metric(|m| m.avg_turnover)),
        Column::new("n_trades".into(), count(|m| m.n_trades)),
        Column::new(
            "degradations".into(),
            rows.iter().map(|r| r.degradations as u64).collect::<Vec<_>>(),
        ),
        Column::new(
            "error".into(),
            rows.iter().map(|r| r.error.as_deref()).collect::<Vec<_>>(),
        ),
    ])?)
}

/// Writes `df` as CSV with a header row. Infinite values are written as `inf`.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Writes every report of one run into `dir` as `{universe}_{report}.csv`.
///
/// Returns the paths written.
pub fn write_run_reports(run: &BacktestRun, dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let last = run.prices.dates().last().map(ToString::to_string).unwrap_or_default();
    let reports = [
        ("signals".to_string(), signals_frame(&run.alphas)?),
        ("positions".to_string(), positions_frame(run)?),
        ("trades".to_string(), trades_frame(&run.universe, &run.ledger)?),
        (
            format!("trade_signals_{last}"),
            latest_signals_frame(&run.universe, &run.ledger)?,
        ),
        ("equity".to_string(), equity_frame(&run.simulation)?),
        ("lambdas".to_string(), lambdas_frame(run)?),
    ];
    let mut written = Vec::with_capacity(reports.len());
    for (name, mut df) in reports {
        let path = dir.join(format!("{}_{name}.csv", run.universe));
        write_csv(&mut df, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::pipeline::run_backtest;
    use malaga_eval::{MetricsSummary, PerformanceMetrics, RunSummary, SimulationMode};
    use malaga_traits::{PricePanel, date_range};
    use ndarray::Array2;

    fn run() -> BacktestRun {
        let n_dates = 80;
        let dates = date_range(Date::from_ymd_opt(2022, 9, 1).unwrap(), n_dates);
        let symbols = vec!["AAA".to_string(), "BBB".to_string()];
        let values = Array2::from_shape_fn((n_dates, 2), |(t, i)| {
            50.0 + i as f64 * 5.0 + ((t * (3 + i)) % 7) as f64
        });
        let prices = PricePanel::new(dates, symbols, values).unwrap();
        let mut config = RunConfig::default();
        config.alphas.momentum.window = 10;
        run_backtest("toy", &prices, &config).unwrap()
    }

    #[test]
    fn test_frame_shapes() {
        let run = run();
        let signals = signals_frame(&run.alphas).unwrap();
        assert_eq!(signals.shape(), (80, 1 + AlphaKind::COUNT * 2));
        assert!(signals.column("Mom_AAA").is_ok());
        assert!(signals.column("XSR_BBB").is_ok());
        assert_eq!(signals.column("Date").unwrap().dtype(), &DataType::Date);

        let positions = positions_frame(&run).unwrap();
        assert_eq!(positions.shape(), (80, 1 + 3 * 2));
        assert!(positions.column("Pos_BBB").is_ok());

        let trades = trades_frame(&run.universe, &run.ledger).unwrap();
        assert_eq!(trades.height(), 160);
        assert_eq!(trades.width(), 8 + AlphaKind::COUNT);

        let equity = equity_frame(&run.simulation).unwrap();
        assert_eq!(equity.get_column_names().len(), 4);
        assert_eq!(lambdas_frame(&run).unwrap().height(), AlphaKind::COUNT);
    }

    #[test]
    fn test_cumulative_return_is_equity_level() {
        let n_dates = 30;
        let dates = date_range(Date::from_ymd_opt(2022, 1, 3).unwrap(), n_dates);
        let symbols = vec!["AAA".to_string(), "BBB".to_string()];
        let prices = PricePanel::new(dates, symbols, Array2::from_elem((n_dates, 2), 40.0)).unwrap();
        let mut config = RunConfig::default();
        config.alphas.momentum.window = 10;
        let run = run_backtest("flat", &prices, &config).unwrap();

        let equity = equity_frame(&run.simulation).unwrap();
        let levels: Vec<f64> = equity
            .column("Cumulative_Return")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(levels.len(), n_dates);
        assert_eq!(levels[0], 1.0);
        assert!(levels.iter().all(|e| *e == 1.0));
    }

    #[test]
    fn test_summary_frame_has_nulls_for_failures() {
        let summary = MetricsSummary::new(vec![
            RunSummary::succeeded("a", SimulationMode::Discrete, PerformanceMetrics::default(), 1),
            RunSummary::failed("b", "boom"),
        ]);
        let df = summary_frame(&summary).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("sharpe").unwrap().null_count(), 1);
        assert_eq!(df.column("error").unwrap().null_count(), 1);
    }

    #[test]
    fn test_write_run_reports() {
        let run = run();
        let dir = tempfile::tempdir().unwrap();
        let written = write_run_reports(&run, dir.path()).unwrap();
        assert_eq!(written.len(), 6);
        assert!(written.iter().all(|p| p.exists()));
        let trades = std::fs::read_to_string(dir.path().join("toy_trades.csv")).unwrap();
        assert!(trades.starts_with("Date,Universe,Ticker,Action,Shares_Qty,Close"));
    }
}
