//! CSV exports: the aligned raw table and the performance table.
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts,
//! and the raw export can be replayed with `--source csv`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::{DateRange, PerfWindow, PerformanceRow, RateSeries};
use crate::error::AppError;

pub const DEFAULT_RAW_FILE: &str = "fx_data.csv";

/// `currency_performance_YYYYMMDD_YYYYMMDD.csv` for the selected range.
pub fn default_performance_path(range: &DateRange) -> PathBuf {
    PathBuf::from(format!(
        "currency_performance_{}_{}.csv",
        range.start().format("%Y%m%d"),
        range.end().format("%Y%m%d")
    ))
}

/// Write observed closes (`Date` + one column per country) to `path`.
///
/// Only real observations are written; days a currency did not trade stay
/// blank, so replaying the file reproduces the same series.
pub fn write_raw_csv(path: &Path, series: &[RateSeries]) -> Result<(), AppError> {
    let file = create(path)?;
    write_raw(file, series)
}

pub fn write_raw(out: impl Write, series: &[RateSeries]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["Date".to_string()];
    header.extend(series.iter().map(|s| s.currency.country().to_string()));
    writer.write_record(&header).map_err(write_err)?;

    let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for (col, s) in series.iter().enumerate() {
        for p in s.points() {
            rows.entry(p.date).or_insert_with(|| vec![None; series.len()])[col] = Some(p.close);
        }
    }

    for (date, values) in rows {
        let mut record = vec![date.to_string()];
        record.extend(values.into_iter().map(|v| v.map(|v| v.to_string()).unwrap_or_default()));
        writer.write_record(&record).map_err(write_err)?;
    }

    writer.flush().map_err(|e| AppError::new(AppError::RUNTIME, format!("Failed to flush CSV: {e}")))
}

/// Write `Currency,YTD,1M,3M,6M,12M` rows to `path`. Missing windows are blank.
pub fn write_performance_csv(path: &Path, rows: &[PerformanceRow]) -> Result<(), AppError> {
    let file = create(path)?;
    write_performance(file, rows)
}

pub fn write_performance(out: impl Write, rows: &[PerformanceRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["Currency"];
    header.extend(PerfWindow::ALL.iter().map(|w| w.label()));
    writer.write_record(&header).map_err(write_err)?;

    for row in rows {
        let mut record = vec![row.currency.country().to_string()];
        for window in PerfWindow::ALL {
            record.push(row.get(window).map(|c| format!("{:.2}", c.pct)).unwrap_or_default());
        }
        writer.write_record(&record).map_err(write_err)?;
    }

    writer.flush().map_err(|e| AppError::new(AppError::RUNTIME, format!("Failed to flush CSV: {e}")))
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|e| {
        AppError::new(AppError::RUNTIME, format!("Failed to create CSV '{}': {e}", path.display()))
    })
}

fn write_err(e: csv::Error) -> AppError {
    AppError::new(AppError::RUNTIME, format!("Failed to write CSV row: {e}"))
}
