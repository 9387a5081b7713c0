//! Loading long-format price CSVs for the malaga CLI.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use malaga::{MarketData, PricePanel};
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Accepted header spellings, compared case-insensitively, per canonical column.
const COLUMN_ALIASES: [(&str, &[&str]); 3] = [
    ("date", &["date"]),
    ("symbol", &["ticker", "symbol"]),
    ("close", &["close"]),
];

/// Renames the first header matching each alias list to its canonical name.
fn normalize_columns(df: &mut DataFrame) -> Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    for (canonical, aliases) in COLUMN_ALIASES {
        let Some(found) = names
            .iter()
            .find(|name| aliases.iter().any(|a| name.eq_ignore_ascii_case(a)))
        else {
            bail!("missing column '{canonical}' (accepted headers: {})", aliases.join(", "));
        };
        if found != canonical {
            df.rename(found, canonical.into())?;
        }
    }
    Ok(())
}

/// Load a price CSV with `Date`, `ticker` and `Close` columns into a panel.
///
/// Extra columns are ignored. Dates may be plain `YYYY-MM-DD` strings or
/// anything polars recognises as a date or timestamp.
pub(crate) fn load_prices(path: &Path) -> Result<PricePanel> {
    let mut df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_try_parse_dates(true)
        .finish()
        .and_then(LazyFrame::collect)
        .with_context(|| format!("reading {}", path.display()))?;
    normalize_columns(&mut df).with_context(|| format!("in {}", path.display()))?;
    let df = df.select(["date", "symbol", "close"])?;
    PricePanel::from_market_data(&MarketData::new(df))
        .with_context(|| format!("building price panel from {}", path.display()))
}

/// Universe name of a price file: its file stem.
pub(crate) fn universe_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "universe".to_string())
}

/// Every `*.csv` file directly inside `dir`, sorted by name.
pub(crate) fn price_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{date_str}', expected YYYY-MM-DD"))
}
