//! Raw FX CSV ingest (replay of a previous export).
//!
//! Expected layout is the one `export::write_raw_csv` produces, which also
//! matches the dashboard's "Download FX Data as CSV" file:
//!
//! ```text
//! Date,Indonesia,Japan
//! 2024-01-02,15400.5,141.2
//! 2024-01-03,,142.0
//! ```
//!
//! Value columns are matched to currencies by country label or ISO code.
//! Unknown columns are ignored; unparseable rows are reported, not fatal.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::data::source::RateSource;
use crate::domain::{Currency, DateRange, RateSeries};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: one series per recognised column plus row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub series: Vec<RateSeries>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a raw FX CSV from disk.
pub fn load_raw_csv(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(AppError::USAGE, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    read_raw_csv(file)
}

/// Parse a raw FX CSV from any reader.
pub fn read_raw_csv(reader: impl std::io::Read) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(AppError::USAGE, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let date_idx = headers
        .iter()
        .position(|h| normalize_header_name(h) == "date")
        .ok_or_else(|| AppError::new(AppError::USAGE, "Missing required column: `Date`"))?;

    let columns = currency_columns(&headers, date_idx);
    if columns.is_empty() {
        return Err(AppError::new(
            AppError::USAGE,
            "No currency columns recognised. Use country names (e.g. `Indonesia`) or ISO codes (e.g. `IDR`).",
        ));
    }

    let mut rows: HashMap<Currency, Vec<(NaiveDate, f64)>> = HashMap::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let date = match record.get(date_idx).map(parse_date) {
            Some(Ok(d)) => d,
            Some(Err(message)) => {
                row_errors.push(RowError { line, message });
                continue;
            }
            None => {
                row_errors.push(RowError {
                    line,
                    message: "Missing `Date` value.".to_string(),
                });
                continue;
            }
        };

        for &(col, currency) in &columns {
            if let Some(v) = parse_opt_f64(record.get(col)) {
                rows.entry(currency).or_default().push((date, v));
            }
        }
    }

    for err in &row_errors {
        log::warn!("line {}: {}", err.line, err.message);
    }

    let series = columns
        .iter()
        .map(|&(_, currency)| {
            RateSeries::from_points(currency, rows.remove(&currency).unwrap_or_default())
        })
        .collect();

    Ok(IngestedData {
        series,
        row_errors,
        rows_read,
    })
}

/// `RateSource` serving a previously exported CSV.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    name: String,
    data: IngestedData,
}

impl CsvSource {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let data = load_raw_csv(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            name: format!("csv:{}", path.display()),
            data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Currencies present in the file, in column order.
    pub fn currencies(&self) -> Vec<Currency> {
        self.data.series.iter().map(|s| s.currency).collect()
    }
}

impl RateSource for CsvSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_series(&self, currency: Currency, range: &DateRange) -> Result<RateSeries, AppError> {
        Ok(self
            .data
            .series
            .iter()
            .find(|s| s.currency == currency)
            .map(|s| s.clipped(range))
            .unwrap_or_else(|| RateSeries::empty(currency)))
    }
}

fn currency_columns(headers: &StringRecord, date_idx: usize) -> Vec<(usize, Currency)> {
    let mut out: Vec<(usize, Currency)> = Vec::new();
    for (idx, name) in headers.iter().enumerate() {
        if idx == date_idx {
            continue;
        }
        let name = name.trim().trim_start_matches('\u{feff}');
        match Currency::from_label(name) {
            Some(c) if !out.iter().any(|(_, seen)| *seen == c) => out.push((idx, c)),
            Some(c) => log::warn!("duplicate column for {}; keeping the first", c.code()),
            None => log::warn!("ignoring unrecognised CSV column '{name}'"),
        }
    }
    out
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. Strip it before matching.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    // pandas writes datetime indexes as `YYYY-MM-DD HH:MM:SS`.
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, YYYY/MM/DD."
    ))
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
