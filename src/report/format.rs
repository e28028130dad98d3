//! Formatted terminal output: run summary, performance tables, data preview.
//!
//! We keep formatting code in one place so:
//! - the analysis code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::analysis::{Performers, pct_change};
use crate::app::pipeline::DashboardOutput;
use crate::domain::{Currency, FxTable, PerfCell, PerfWindow, PerformanceRow};

/// Header block: source, range, selection, coverage and warnings.
pub fn format_run_summary(run: &DashboardOutput) -> String {
    let mut out = String::new();

    out.push_str("=== fxdash - 1 USD in Local Currency ===\n");
    out.push_str(&format!("Source: {}\n", run.source));
    out.push_str(&format!(
        "Range: {} .. {}\n",
        run.selection.range.start(),
        run.selection.range.end()
    ));
    out.push_str(&format!(
        "Currencies: {} selected | {} with data\n",
        run.selection.currencies.len(),
        run.series.iter().filter(|s| !s.is_empty()).count()
    ));
    if let (Some(first), Some(last)) = (run.table.dates.first(), run.table.dates.last()) {
        out.push_str(&format!(
            "Rows: {} trading days ({first} .. {last})\n",
            run.table.dates.len()
        ));
    }
    for w in &run.warnings {
        out.push_str(&format!("warning: {w}\n"));
    }

    out
}

/// Percentage change table (local currency vs USD).
pub fn format_performance(rows: &[PerformanceRow]) -> String {
    let mut out = String::new();

    out.push_str("Percentage Change (Local Currency vs USD)\n");
    let mut header = format!("{:<14}", "Currency");
    for w in PerfWindow::ALL {
        header.push_str(&format!(" {:>9}", w.label()));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    let mut rule = format!("{:-<14}", "");
    for _ in PerfWindow::ALL {
        rule.push_str(&format!(" {:-<9}", ""));
    }
    out.push_str(&rule);
    out.push('\n');

    for row in rows {
        let mut line = format!("{:<14}", row.currency.country());
        for w in PerfWindow::ALL {
            line.push_str(&format!(" {:>9}", fmt_cell(row.get(w))));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if rows
        .iter()
        .any(|r| PerfWindow::ALL.iter().any(|w| r.get(*w).is_some_and(|c| c.partial)))
    {
        out.push_str("* series starts after the window start; change covers available data only\n");
    }

    out
}

/// Best/worst performers for the ranking window.
pub fn format_performers(performers: &Performers) -> String {
    let label = performers.window.label();
    let mut out = String::new();

    out.push_str(&format!("Best Performers ({label}):\n"));
    out.push_str(&format_ranked(&performers.best, performers.window));
    out.push('\n');
    out.push_str(&format!("Worst Performers ({label}):\n"));
    out.push_str(&format_ranked(&performers.worst, performers.window));

    out
}

fn format_ranked(rows: &[PerformanceRow], window: PerfWindow) -> String {
    if rows.is_empty() {
        return "  (no data for this window)\n".to_string();
    }
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}) {:<14} {:>9}\n",
            i + 1,
            row.currency.country(),
            fmt_cell(row.get(window))
        ));
    }
    out
}

/// The last `max_rows` rows of the aligned table.
pub fn format_table_tail(table: &FxTable, max_rows: usize) -> String {
    let mut out = String::new();

    let mut header = format!("{:<10}", "Date");
    for c in &table.currencies {
        header.push_str(&format!(" {:>11}", c.code()));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    let start = table.dates.len().saturating_sub(max_rows);
    for (row, date) in table.dates.iter().enumerate().skip(start) {
        let mut line = date.to_string();
        for col in &table.columns {
            let cell = col
                .get(row)
                .copied()
                .flatten()
                .map(fmt_rate)
                .unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {cell:>11}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Last close and last day-over-day move per currency.
pub fn format_latest_moves(table: &FxTable) -> String {
    let mut out = String::from("Latest close (1 USD in local, day change):\n");
    for &c in &table.currencies {
        let points = table.series_points(c);
        let Some(&(date, close)) = points.last() else {
            out.push_str(&format!("  {:<14} {:>11}\n", c.country(), "-"));
            continue;
        };
        let move_pct = pct_change(&points)
            .last()
            .map(|&(_, v)| format!("{v:+.2}%"))
            .unwrap_or_else(|| "n/a".to_string());
        out.push_str(&format!(
            "  {:<14} {:>11} {:>8}  ({date})\n",
            c.country(),
            fmt_rate(close),
            move_pct
        ));
    }
    out
}

/// The currency list (`fxdash list`).
pub fn format_currency_list() -> String {
    let mut out = String::new();
    for c in Currency::ALL {
        out.push_str(&format!("{}  {:<12} {}\n", c.code(), c.country(), c.symbol()));
    }
    out
}

pub fn fmt_cell(cell: Option<PerfCell>) -> String {
    match cell {
        Some(c) if c.partial => format!("{:+.2}%*", c.pct),
        Some(c) => format!("{:+.2}%", c.pct),
        None => "n/a".to_string(),
    }
}

/// Rates span 1.3 (SGD) to 25,000 (VND); show fewer decimals for big numbers.
pub fn fmt_rate(v: f64) -> String {
    if v.abs() >= 1000.0 {
        format!("{v:.1}")
    } else if v.abs() >= 10.0 {
        format!("{v:.3}")
    } else {
        format!("{v:.4}")
    }
}
