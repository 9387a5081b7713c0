//! Alpha listing command implementation.

use super::print_banner;
use anyhow::Result;
use malaga::signals::{AlphaCategory, available_alphas};

const CATEGORIES: [(AlphaCategory, &str); 4] = [
    (AlphaCategory::Momentum, "Momentum"),
    (AlphaCategory::Reversion, "Reversion"),
    (AlphaCategory::Volatility, "Volatility"),
    (AlphaCategory::Value, "Value"),
];

/// List the alphas, grouped by category.
pub(crate) fn list_alphas(category: Option<String>, verbose: bool) -> Result<()> {
    print_banner("Available Alphas");

    let alphas = available_alphas();
    for (cat, cat_name) in CATEGORIES {
        if let Some(ref filter) = category
            && !cat_name.to_lowercase().contains(&filter.to_lowercase())
        {
            continue;
        }

        let members: Vec<_> = alphas.iter().filter(|a| a.category == cat).collect();
        if members.is_empty() {
            continue;
        }

        println!("{cat_name}: {}", cat.description());
        println!("{}", "-".repeat(60));
        for alpha in members {
            if verbose {
                let scope = if alpha.cross_sectional {
                    "cross-sectional"
                } else {
                    "per instrument"
                };
                println!(
                    "  {:4} {:20} - {} (lookback: {} days, {scope})",
                    alpha.code,
                    alpha.kind.name(),
                    alpha.description,
                    alpha.typical_lookback
                );
            } else {
                println!("  {:4} {}", alpha.code, alpha.kind.name());
            }
        }
        println!();
    }

    if !verbose {
        println!("Use --verbose for detailed alpha descriptions.\n");
    }

    Ok(())
}
