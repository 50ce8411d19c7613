//! CLI argument definitions for riskcalc.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `compute` | Beta, CAPM expected return and Sharpe ratio against a benchmark |
//! | `closes` | Daily closes a computation would use |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--source` | `yahoo` | Price source |
//! | `--mock` | `false` | Shorthand for `--source synthetic` |
//! | `--timeout-ms` | `RISKCALC_TIMEOUT_MS` or 10000 | Per-request timeout |
//!
//! # Examples
//!
//! ```bash
//! riskcalc compute AAPL
//! riskcalc compute MSFT --benchmark ^NDX --calendar-years 3 --format json --pretty
//! riskcalc closes ^GSPC --lookback-days 30 --mock
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use riskcalc_core::ProviderId;

/// Beta, CAPM and Sharpe ratio calculator
///
/// Measures a ticker against a benchmark index from daily closing prices.
#[derive(Debug, Parser)]
#[command(name = "riskcalc", author, version, about = "Beta, CAPM and Sharpe ratio calculator")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Price source.
    #[arg(long, global = true, value_enum, default_value_t = SourceSelector::Yahoo)]
    pub source: SourceSelector,

    /// Use deterministic synthetic prices instead of a live source.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn provider(&self) -> ProviderId {
        if self.mock {
            return ProviderId::Synthetic;
        }
        match self.source {
            SourceSelector::Yahoo => ProviderId::Yahoo,
            SourceSelector::Synthetic => ProviderId::Synthetic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Table,
    /// JSON envelope with metadata.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// Yahoo Finance chart API.
    Yahoo,
    /// Deterministic offline prices.
    Synthetic,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute beta, CAPM expected return and Sharpe ratio.
    ///
    /// # Examples
    ///
    ///   riskcalc compute AAPL
    ///   riskcalc compute AAPL --benchmark ^NDX --risk-free-rate 0.04
    Compute(ComputeArgs),

    /// Print the daily closes for a ticker over the lookback window.
    Closes(ClosesArgs),
}

#[derive(Debug, Args)]
pub struct ComputeArgs {
    /// Instrument ticker, e.g. AAPL.
    pub ticker: String,

    /// Benchmark ticker [default: RISKCALC_BENCHMARK or ^GSPC].
    #[arg(long)]
    pub benchmark: Option<String>,

    /// Annual risk-free rate as a fraction (0.0137 = 1.37%).
    #[arg(long)]
    pub risk_free_rate: Option<f64>,

    /// Trading days per year used to annualise.
    #[arg(long)]
    pub trading_days: Option<u32>,

    #[command(flatten)]
    pub window: WindowArgs,
}

#[derive(Debug, Args)]
pub struct ClosesArgs {
    /// Ticker, e.g. ^GSPC.
    pub ticker: String,

    #[command(flatten)]
    pub window: WindowArgs,
}

#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// Lookback as a day count [default: RISKCALC_LOOKBACK_DAYS or 1825].
    #[arg(long, conflicts_with = "calendar_years")]
    pub lookback_days: Option<u32>,

    /// Lookback as whole calendar years.
    #[arg(long)]
    pub calendar_years: Option<u8>,

    /// Last day of the window (YYYY-MM-DD) [default: today, UTC].
    #[arg(long)]
    pub end: Option<String>,
}
