//! malaga CLI binary.
//!
//! Runs multi-alpha backtests on long-format price CSVs and writes the
//! reports next to a printed summary.

mod cmd;
mod data;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::RunOptions;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "malaga")]
#[command(about = "Multi-alpha long/short equity backtests", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available alphas
    Alphas {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Backtest one universe from a price CSV
    Run {
        /// Price CSV with Date, ticker and Close columns
        prices: PathBuf,

        /// Universe name (defaults to the file stem)
        #[arg(short, long)]
        universe: Option<String>,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Backtest every price CSV in a directory
    Batch {
        /// Directory of price CSVs, one universe per file
        dir: PathBuf,

        #[command(flatten)]
        options: RunOptions,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Alphas { category, verbose } => cmd::alphas::list_alphas(category, verbose),
        Commands::Run {
            prices,
            universe,
            options,
        } => cmd::run::run_universe(&prices, universe, &options),
        Commands::Batch { dir, options } => cmd::batch::run_directory(&dir, &options),
    }
}
