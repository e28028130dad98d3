//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the date range, currency subset and rate source
//! - runs the shared dashboard pipeline
//! - prints charts/tables or writes CSV exports

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::cli::{ChartArgs, Command, ExportArgs, PerfArgs, SelectionArgs, SourceKind};
use crate::data::{RateSource, SampleSource, YahooSource};
use crate::domain::{Currency, DashConfig, DateRange, Selection};
use crate::error::AppError;
use crate::io::{CsvSource, DEFAULT_RAW_FILE, default_performance_path};

pub mod pipeline;

/// Entry point for the `fxdash` binary.
pub fn run() -> Result<(), AppError> {
    // We want `fxdash` and `fxdash -c IDR,JPY` to behave like `fxdash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Chart(args) => handle_chart(args),
        Command::Perf(args) => handle_perf(args),
        Command::Export(args) => handle_export(args),
        Command::List => {
            print!("{}", crate::report::format_currency_list());
            Ok(())
        }
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_chart(args: ChartArgs) -> Result<(), AppError> {
    let config = DashConfig {
        max_cols: args.cols.max(1),
        rows_per_page: args.rows_per_page.max(1),
        mode: args.mode,
        ..DashConfig::default()
    };
    let run = fetch_run(&args.selection, &config)?;

    println!("{}", crate::report::format_run_summary(&run));
    let panels = run.panels(config.mode);
    let grid = run.grid(&config);
    print!(
        "{}",
        crate::plot::render_grid(&panels, &grid, args.width, args.height)
    );

    if let Some(n) = args.table {
        println!("{}", crate::report::format_table_tail(&run.table, n));
    }
    Ok(())
}

fn handle_perf(args: PerfArgs) -> Result<(), AppError> {
    let config = DashConfig {
        top_n: args.top,
        rank_window: args.rank_by,
        ..DashConfig::default()
    };
    let run = fetch_run(&args.selection, &config)?;

    println!("{}", crate::report::format_run_summary(&run));
    println!("{}", crate::report::format_performance(&run.performance));
    println!("{}", crate::report::format_performers(&run.performers));
    print!("{}", crate::report::format_latest_moves(&run.table));

    if let Some(path) = &args.export {
        crate::io::write_performance_csv(path, &run.performance)?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let run = fetch_run(&args.selection, &DashConfig::default())?;

    let (raw, performance) = match (args.raw, args.performance) {
        (None, None) => (
            Some(PathBuf::from(DEFAULT_RAW_FILE)),
            Some(default_performance_path(&run.selection.range)),
        ),
        other => other,
    };

    for w in &run.warnings {
        log::warn!("{w}");
    }
    if let Some(path) = raw {
        crate::io::write_raw_csv(&path, &run.series)?;
        println!("wrote {}", path.display());
    }
    if let Some(path) = performance {
        crate::io::write_performance_csv(&path, &run.performance)?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn handle_tui(args: SelectionArgs) -> Result<(), AppError> {
    let (source, defaults) = open_source(&args)?;
    let selection = resolve_selection(&args, today(), &defaults)?;
    crate::tui::run(source, selection)
}

fn fetch_run(
    args: &SelectionArgs,
    config: &DashConfig,
) -> Result<pipeline::DashboardOutput, AppError> {
    let (source, defaults) = open_source(args)?;
    let selection = resolve_selection(args, today(), &defaults)?;
    log::info!(
        "source={} range={}..{} currencies={}",
        source.name(),
        selection.range.start(),
        selection.range.end(),
        selection.currencies.len()
    );
    pipeline::run_dashboard(source.as_ref(), &selection, config)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Build the rate source named by the flags, plus the currencies selected by
/// default when `-c` is not given.
///
/// `--csv PATH` implies `--source csv`; replaying a file defaults to the
/// currencies it contains.
pub fn open_source(args: &SelectionArgs) -> Result<(Box<dyn RateSource>, Vec<Currency>), AppError> {
    let kind = if args.csv.is_some() {
        SourceKind::Csv
    } else {
        args.source
    };

    match kind {
        SourceKind::Yahoo => Ok((Box::new(YahooSource::from_env()?), Currency::ALL.to_vec())),
        SourceKind::Sample => Ok((Box::new(SampleSource::new(args.seed)), Currency::ALL.to_vec())),
        SourceKind::Csv => {
            let path = args.csv.as_ref().ok_or_else(|| {
                AppError::new(AppError::USAGE, "--source csv requires --csv PATH")
            })?;
            let source = CsvSource::open(path)?;
            log::debug!("replaying {}", source.path().display());
            let defaults = source.currencies();
            Ok((Box::new(source), defaults))
        }
    }
}

/// Resolve `--start/--end/--days/-c` into a validated selection.
pub fn resolve_selection(
    args: &SelectionArgs,
    today: NaiveDate,
    defaults: &[Currency],
) -> Result<Selection, AppError> {
    let end = args.end.unwrap_or(today);
    let range = match args.start {
        Some(start) => DateRange::new(start, end)?,
        None => DateRange::trailing(end, args.days)?,
    };

    let currencies = if args.currencies.is_empty() {
        defaults.to_vec()
    } else {
        args.currencies.clone()
    };
    Ok(Selection::new(range, currencies))
}

/// Rewrite argv so `fxdash` defaults to `fxdash tui`.
///
/// Rules:
/// - `fxdash`                      -> `fxdash tui`
/// - `fxdash -c IDR ...`           -> `fxdash tui -c IDR ...`
/// - `fxdash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "chart" | "perf" | "export" | "list" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn selection_args(args: &[&str]) -> SelectionArgs {
        let mut full = vec!["fxdash", "tui"];
        full.extend_from_slice(args);
        match Cli::parse_from(full).command {
            Command::Tui(a) => a,
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn bare_invocation_and_leading_flags_open_the_tui() {
        assert_eq!(rewrite_args(argv(&["fxdash"])), argv(&["fxdash", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["fxdash", "-c", "IDR"])),
            argv(&["fxdash", "tui", "-c", "IDR"])
        );
        assert_eq!(rewrite_args(argv(&["fxdash", "perf"])), argv(&["fxdash", "perf"]));
        assert_eq!(rewrite_args(argv(&["fxdash", "--help"])), argv(&["fxdash", "--help"]));
    }

    #[test]
    fn default_range_is_trailing_year_ending_today() {
        let args = selection_args(&[]);
        let sel = resolve_selection(&args, d(2024, 6, 30), &Currency::ALL).unwrap();
        assert_eq!(sel.range.end(), d(2024, 6, 30));
        assert_eq!(sel.range.start(), d(2023, 7, 1));
        assert_eq!(sel.currencies.len(), 12);
    }

    #[test]
    fn explicit_currencies_override_defaults() {
        let args = selection_args(&["-c", "JPY,IDR,JPY", "--start", "2024-01-01", "--end", "2024-02-01"]);
        let sel = resolve_selection(&args, d(2024, 6, 30), &Currency::ALL).unwrap();
        assert_eq!(sel.currencies, vec![Currency::Jpy, Currency::Idr]);
        assert_eq!(sel.range.start(), d(2024, 1, 1));
    }

    #[test]
    fn inverted_range_is_a_usage_error() {
        let args = selection_args(&["--start", "2024-03-01", "--end", "2024-02-01"]);
        let err = resolve_selection(&args, d(2024, 6, 30), &Currency::ALL).unwrap_err();
        assert_eq!(err.exit_code(), AppError::USAGE);
        assert!(err.message().starts_with("Start date must be before end date"));
    }

    #[test]
    fn huge_day_counts_are_usage_errors() {
        for days in ["200000000", "9223372036854775807"] {
            let args = selection_args(&["--days", days]);
            let err = resolve_selection(&args, d(2024, 6, 30), &Currency::ALL).unwrap_err();
            assert_eq!(err.exit_code(), AppError::USAGE);
            assert!(err.message().contains("out of the supported date range"));
        }
    }

    #[test]
    fn csv_source_without_path_is_a_usage_error() {
        let args = selection_args(&["--source", "csv"]);
        let err = open_source(&args).err().unwrap();
        assert_eq!(err.exit_code(), AppError::USAGE);
    }

    #[test]
    fn sample_source_defaults_to_all_currencies() {
        let args = selection_args(&["--source", "sample", "--seed", "7"]);
        let (source, defaults) = open_source(&args).unwrap();
        assert_eq!(source.name(), "sample");
        assert_eq!(defaults, Currency::ALL.to_vec());
    }
}
