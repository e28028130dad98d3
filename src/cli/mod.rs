//! Command-line parsing for the APAC FX dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetching/analysis code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{ChartMode, Currency, PerfWindow};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fxdash", version, about = "APAC currencies vs USD: charts and trailing performance")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print one ASCII line chart per selected currency.
    Chart(ChartArgs),
    /// Print YTD/1M/3M/6M/12M performance and best/worst performers.
    Perf(PerfArgs),
    /// Write the raw FX table and/or the performance table to CSV.
    Export(ExportArgs),
    /// List supported currencies.
    List,
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as the other commands, but renders
    /// results in a terminal UI using Ratatui.
    Tui(SelectionArgs),
}

/// Where rates come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Yahoo Finance chart API (network).
    Yahoo,
    /// Deterministic synthetic data (offline).
    Sample,
    /// Replay a raw CSV written by `fxdash export` (requires `--csv`).
    Csv,
}

/// Date range, currency subset and data source.
#[derive(Debug, Args, Clone)]
pub struct SelectionArgs {
    /// First date (inclusive). Defaults to `--days` before `--end`.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<NaiveDate>,

    /// Last date (exclusive). Defaults to today.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<NaiveDate>,

    /// Range length in days when `--start` is not given.
    #[arg(long, default_value_t = 365)]
    pub days: i64,

    /// Currencies to include (comma-separated ISO codes). Defaults to all.
    #[arg(short = 'c', long, value_enum, value_delimiter = ',', ignore_case = true)]
    pub currencies: Vec<Currency>,

    /// Data source.
    #[arg(long, value_enum, default_value_t = SourceKind::Yahoo)]
    pub source: SourceKind,

    /// Raw FX CSV to replay (implies `--source csv`).
    #[arg(long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Seed for `--source sample`.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Options for `fxdash chart`.
#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Plot the rate level or the % change since the first date.
    #[arg(long, value_enum, default_value_t = ChartMode::Level)]
    pub mode: ChartMode,

    /// Panel width (columns).
    #[arg(long, default_value_t = 30)]
    pub width: usize,

    /// Panel plot height (rows).
    #[arg(long, default_value_t = 8)]
    pub height: usize,

    /// Maximum panels per row.
    #[arg(long, default_value_t = 4)]
    pub cols: usize,

    /// Panel rows per page.
    #[arg(long, default_value_t = 3)]
    pub rows_per_page: usize,

    /// Also print the last N rows of the aligned table.
    #[arg(long, value_name = "N")]
    pub table: Option<usize>,
}

/// Options for `fxdash perf`.
#[derive(Debug, Args, Clone)]
pub struct PerfArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Best/worst performers shown per side.
    #[arg(long, default_value_t = 3)]
    pub top: usize,

    /// Window used to rank best/worst performers.
    #[arg(long, value_enum, default_value_t = PerfWindow::TwelveMonths)]
    pub rank_by: PerfWindow,

    /// Also write the performance table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Options for `fxdash export`.
///
/// With neither `--raw` nor `--performance`, both files are written with
/// their default names.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Raw FX table output path.
    #[arg(long, value_name = "CSV")]
    pub raw: Option<PathBuf>,

    /// Performance table output path.
    #[arg(long, value_name = "CSV")]
    pub performance: Option<PathBuf>,
}
