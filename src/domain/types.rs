//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - produced by any `RateSource` (network, synthetic, CSV replay)
//! - reshaped by the analysis code without copying more than needed
//! - exported to CSV or rendered by the CLI and TUI front-ends

use chrono::{Datelike, Duration, NaiveDate};
use clap::ValueEnum;

use crate::error::AppError;

/// Supported APAC currencies, quoted against USD.
///
/// Declaration order is the display order used everywhere (tables, subplots).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum Currency {
    Idr,
    Myr,
    Sgd,
    Vnd,
    Thb,
    Php,
    Krw,
    Jpy,
    Cny,
    Inr,
    Aud,
    Nzd,
}

impl Currency {
    pub const ALL: [Currency; 12] = [
        Currency::Idr,
        Currency::Myr,
        Currency::Sgd,
        Currency::Vnd,
        Currency::Thb,
        Currency::Php,
        Currency::Krw,
        Currency::Jpy,
        Currency::Cny,
        Currency::Inr,
        Currency::Aud,
        Currency::Nzd,
    ];

    /// ISO 4217 code.
    pub fn code(self) -> &'static str {
        match self {
            Currency::Idr => "IDR",
            Currency::Myr => "MYR",
            Currency::Sgd => "SGD",
            Currency::Vnd => "VND",
            Currency::Thb => "THB",
            Currency::Php => "PHP",
            Currency::Krw => "KRW",
            Currency::Jpy => "JPY",
            Currency::Cny => "CNY",
            Currency::Inr => "INR",
            Currency::Aud => "AUD",
            Currency::Nzd => "NZD",
        }
    }

    /// Country label used as chart title and CSV column name.
    pub fn country(self) -> &'static str {
        match self {
            Currency::Idr => "Indonesia",
            Currency::Myr => "Malaysia",
            Currency::Sgd => "Singapore",
            Currency::Vnd => "Vietnam",
            Currency::Thb => "Thailand",
            Currency::Php => "Philippines",
            Currency::Krw => "South Korea",
            Currency::Jpy => "Japan",
            Currency::Cny => "China",
            Currency::Inr => "India",
            Currency::Aud => "Australia",
            Currency::Nzd => "New Zealand",
        }
    }

    /// Upstream ticker for "1 USD in local currency".
    pub fn symbol(self) -> String {
        format!("USD{}=X", self.code())
    }

    /// Axis label, e.g. `USD/IDR`.
    pub fn pair_label(self) -> String {
        format!("USD/{}", self.code())
    }

    /// Resolve a currency from its code or its country label (case-insensitive).
    pub fn from_label(label: &str) -> Option<Currency> {
        let label = label.trim();
        Currency::ALL.into_iter().find(|c| {
            c.code().eq_ignore_ascii_case(label) || c.country().eq_ignore_ascii_case(label)
        })
    }
}

/// Requested date range: `start` inclusive, `end` exclusive (as sent upstream).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start >= end {
            return Err(AppError::new(
                AppError::USAGE,
                format!("Start date must be before end date (got {start} .. {end})."),
            ));
        }
        Ok(Self { start, end })
    }

    /// The `days`-long window ending at `end`.
    pub fn trailing(end: NaiveDate, days: i64) -> Result<Self, AppError> {
        let start = Duration::try_days(days.max(1))
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| {
                AppError::new(
                    AppError::USAGE,
                    format!("Range of {days} days before {end} is out of the supported date range."),
                )
            })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// The user's current selection: date range plus an ordered currency subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub range: DateRange,
    pub currencies: Vec<Currency>,
}

impl Selection {
    /// Build a selection, dropping duplicate currencies while preserving order.
    pub fn new(range: DateRange, currencies: impl IntoIterator<Item = Currency>) -> Self {
        let mut out: Vec<Currency> = Vec::new();
        for c in currencies {
            if !out.contains(&c) {
                out.push(c);
            }
        }
        Self {
            range,
            currencies: out,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}

/// One daily close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Daily closes for one currency (units: local currency per 1 USD).
///
/// Invariant: dates strictly increasing, closes finite and positive.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSeries {
    pub currency: Currency,
    points: Vec<RatePoint>,
}

impl RateSeries {
    /// Normalize raw `(date, close)` rows into a series.
    ///
    /// Rows with a non-finite or non-positive close are dropped; rows are sorted
    /// by date and a repeated date keeps the last value seen.
    pub fn from_points(currency: Currency, raw: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        let mut points: Vec<RatePoint> = raw
            .into_iter()
            .filter(|(_, close)| close.is_finite() && *close > 0.0)
            .map(|(date, close)| RatePoint { date, close })
            .collect();
        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<RatePoint> = Vec::with_capacity(points.len());
        for p in points {
            match deduped.last_mut() {
                Some(last) if last.date == p.date => *last = p,
                _ => deduped.push(p),
            }
        }

        Self {
            currency,
            points: deduped,
        }
    }

    pub fn empty(currency: Currency) -> Self {
        Self {
            currency,
            points: Vec::new(),
        }
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<RatePoint> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<RatePoint> {
        self.points.last().copied()
    }

    /// Keep only the points inside `range`.
    pub fn clipped(&self, range: &DateRange) -> Self {
        Self {
            currency: self.currency,
            points: self
                .points
                .iter()
                .copied()
                .filter(|p| range.contains(p.date))
                .collect(),
        }
    }
}

/// Aligned wide table: one row per date, one column per currency.
#[derive(Debug, Clone, PartialEq)]
pub struct FxTable {
    pub dates: Vec<NaiveDate>,
    pub currencies: Vec<Currency>,
    /// `columns[i][j]` is the rate of `currencies[i]` on `dates[j]`.
    pub columns: Vec<Vec<Option<f64>>>,
}

impl FxTable {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, currency: Currency) -> Option<&[Option<f64>]> {
        let idx = self.currencies.iter().position(|c| *c == currency)?;
        self.columns.get(idx).map(Vec::as_slice)
    }

    /// `(date, value)` pairs for one currency, skipping empty cells.
    pub fn series_points(&self, currency: Currency) -> Vec<(NaiveDate, f64)> {
        let Some(col) = self.column(currency) else {
            return Vec::new();
        };
        self.dates
            .iter()
            .zip(col.iter())
            .filter_map(|(d, v)| v.map(|v| (*d, v)))
            .collect()
    }
}

/// Trailing performance windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PerfWindow {
    #[value(name = "ytd")]
    Ytd,
    #[value(name = "1m")]
    OneMonth,
    #[value(name = "3m")]
    ThreeMonths,
    #[value(name = "6m")]
    SixMonths,
    #[value(name = "12m")]
    TwelveMonths,
}

impl PerfWindow {
    pub const ALL: [PerfWindow; 5] = [
        PerfWindow::Ytd,
        PerfWindow::OneMonth,
        PerfWindow::ThreeMonths,
        PerfWindow::SixMonths,
        PerfWindow::TwelveMonths,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PerfWindow::Ytd => "YTD",
            PerfWindow::OneMonth => "1M",
            PerfWindow::ThreeMonths => "3M",
            PerfWindow::SixMonths => "6M",
            PerfWindow::TwelveMonths => "12M",
        }
    }

    /// Calendar start of the window ending at `latest`.
    pub fn reference_date(self, latest: NaiveDate) -> NaiveDate {
        let days = match self {
            PerfWindow::Ytd => {
                return NaiveDate::from_ymd_opt(latest.year(), 1, 1).unwrap_or(latest);
            }
            PerfWindow::OneMonth => 30,
            PerfWindow::ThreeMonths => 90,
            PerfWindow::SixMonths => 180,
            PerfWindow::TwelveMonths => 365,
        };
        latest - Duration::days(days)
    }

    fn index(self) -> usize {
        match self {
            PerfWindow::Ytd => 0,
            PerfWindow::OneMonth => 1,
            PerfWindow::ThreeMonths => 2,
            PerfWindow::SixMonths => 3,
            PerfWindow::TwelveMonths => 4,
        }
    }
}

/// Percentage change of local currency vs USD over one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerfCell {
    /// Rounded to two decimals; positive means local currency appreciated.
    pub pct: f64,
    /// Date of the observation used as the window start.
    pub since: NaiveDate,
    /// The series starts well after the window reference date.
    pub partial: bool,
}

/// Per-currency performance across all windows.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRow {
    pub currency: Currency,
    cells: [Option<PerfCell>; 5],
}

impl PerformanceRow {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            cells: [None; 5],
        }
    }

    pub fn get(&self, window: PerfWindow) -> Option<PerfCell> {
        self.cells[window.index()]
    }

    pub fn set(&mut self, window: PerfWindow, cell: Option<PerfCell>) {
        self.cells[window.index()] = cell;
    }
}

/// What the line charts plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartMode {
    /// Raw rate, local currency per 1 USD.
    Level,
    /// Percent change relative to the first observation in range.
    Change,
}

impl ChartMode {
    pub fn toggle(self) -> Self {
        match self {
            ChartMode::Level => ChartMode::Change,
            ChartMode::Change => ChartMode::Level,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ChartMode::Level => "level",
            ChartMode::Change => "% change",
        }
    }
}

/// Presentation settings shared by the CLI and TUI.
#[derive(Debug, Clone)]
pub struct DashConfig {
    /// Maximum subplot columns per row.
    pub max_cols: usize,
    /// Subplot rows per page before paginating.
    pub rows_per_page: usize,
    pub mode: ChartMode,
    /// Best/worst performers shown per side.
    pub top_n: usize,
    /// Window used to rank best/worst performers.
    pub rank_window: PerfWindow,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            max_cols: 4,
            rows_per_page: 3,
            mode: ChartMode::Level,
            top_n: 3,
            rank_window: PerfWindow::TwelveMonths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn date_range_rejects_inverted_or_empty() {
        assert!(DateRange::new(d(2024, 1, 2), d(2024, 1, 1)).is_err());
        let err = DateRange::new(d(2024, 1, 1), d(2024, 1, 1)).unwrap_err();
        assert_eq!(err.exit_code(), AppError::USAGE);
        assert!(DateRange::new(d(2024, 1, 1), d(2024, 1, 2)).is_ok());
    }

    #[test]
    fn currency_labels_resolve_by_code_or_country() {
        assert_eq!(Currency::from_label("idr"), Some(Currency::Idr));
        assert_eq!(Currency::from_label("South Korea"), Some(Currency::Krw));
        assert_eq!(Currency::from_label(" new zealand "), Some(Currency::Nzd));
        assert_eq!(Currency::from_label("EUR"), None);
        assert_eq!(Currency::Thb.symbol(), "USDTHB=X");
        assert_eq!(Currency::Thb.pair_label(), "USD/THB");
    }

    #[test]
    fn selection_dedupes_but_keeps_order() {
        let range = DateRange::new(d(2024, 1, 1), d(2024, 2, 1)).unwrap();
        let sel = Selection::new(range, [Currency::Jpy, Currency::Idr, Currency::Jpy]);
        assert_eq!(sel.currencies, vec![Currency::Jpy, Currency::Idr]);
    }

    #[test]
    fn rate_series_drops_invalid_and_sorts() {
        let s = RateSeries::from_points(
            Currency::Sgd,
            vec![
                (d(2024, 1, 3), 1.34),
                (d(2024, 1, 1), 1.33),
                (d(2024, 1, 2), f64::NAN),
                (d(2024, 1, 4), -1.0),
                (d(2024, 1, 3), 1.35),
            ],
        );
        let dates: Vec<_> = s.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 3)]);
        assert_eq!(s.last().unwrap().close, 1.35);
    }

    #[test]
    fn window_reference_dates() {
        let latest = d(2024, 6, 30);
        assert_eq!(PerfWindow::Ytd.reference_date(latest), d(2024, 1, 1));
        assert_eq!(PerfWindow::OneMonth.reference_date(latest), d(2024, 5, 31));
        assert_eq!(PerfWindow::TwelveMonths.reference_date(latest), d(2023, 7, 1));
    }
}
