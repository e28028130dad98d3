//! The `RateSource` seam and the per-selection fetch loop.

use crate::domain::{Currency, DateRange, RateSeries, Selection};
use crate::error::AppError;

/// Anything that can produce daily closes for one currency over a date range.
pub trait RateSource {
    /// Short human-readable name (shown in status lines and summaries).
    fn name(&self) -> &str;

    /// Fetch daily closes for `currency` in `range`.
    ///
    /// An empty series is a valid answer ("no trading data"); `Err` means the
    /// source itself failed.
    fn fetch_series(&self, currency: Currency, range: &DateRange) -> Result<RateSeries, AppError>;
}

/// Result of fetching every currency in a selection.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// One series per selected currency, in selection order (possibly empty).
    pub series: Vec<RateSeries>,
    /// Per-currency problems that did not abort the fetch.
    pub warnings: Vec<String>,
    /// How many currencies failed outright at the source.
    pub failures: usize,
    /// First source error, kept for the "everything failed" report.
    pub first_error: Option<AppError>,
}

impl FetchOutcome {
    pub fn all_failed(&self) -> bool {
        !self.series.is_empty() && self.failures == self.series.len()
    }

    pub fn has_data(&self) -> bool {
        self.series.iter().any(|s| !s.is_empty())
    }
}

/// Fetch each selected currency in order.
///
/// Failures for one currency are recorded as warnings and the loop moves on;
/// the caller decides whether the overall outcome is usable.
pub fn fetch_selection(source: &dyn RateSource, selection: &Selection) -> FetchOutcome {
    let mut series = Vec::with_capacity(selection.currencies.len());
    let mut warnings = Vec::new();
    let mut failures = 0usize;
    let mut first_error = None;

    for &currency in &selection.currencies {
        log::debug!(
            "fetching {} from {} ({} .. {})",
            currency.symbol(),
            source.name(),
            selection.range.start(),
            selection.range.end()
        );
        match source.fetch_series(currency, &selection.range) {
            Ok(s) => {
                if s.is_empty() {
                    let msg = format!("No data available for {} ({})", currency.code(), currency.country());
                    log::warn!("{msg}");
                    warnings.push(msg);
                } else {
                    log::info!("{}: {} rows", currency.symbol(), s.len());
                }
                series.push(s);
            }
            Err(err) => {
                let msg = format!(
                    "Error fetching data for {} ({}): {err}",
                    currency.code(),
                    currency.country()
                );
                log::warn!("{msg}");
                warnings.push(msg);
                failures += 1;
                if first_error.is_none() {
                    first_error = Some(err);
                }
                series.push(RateSeries::empty(currency));
            }
        }
    }

    FetchOutcome {
        series,
        warnings,
        failures,
        first_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct FlakySource;

    impl RateSource for FlakySource {
        fn name(&self) -> &str {
            "flaky"
        }

        fn fetch_series(&self, currency: Currency, range: &DateRange) -> Result<RateSeries, AppError> {
            match currency {
                Currency::Jpy => Err(AppError::new(AppError::RUNTIME, "boom")),
                Currency::Vnd => Ok(RateSeries::empty(currency)),
                _ => Ok(RateSeries::from_points(currency, vec![(range.start(), 1.0)])),
            }
        }
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn per_currency_failures_are_not_fatal() {
        let sel = Selection::new(range(), [Currency::Idr, Currency::Jpy, Currency::Vnd]);
        let out = fetch_selection(&FlakySource, &sel);

        assert_eq!(out.series.len(), 3);
        assert_eq!(out.failures, 1);
        assert_eq!(out.warnings.len(), 2);
        assert!(out.warnings[0].contains("JPY (Japan)"));
        assert!(out.warnings[1].starts_with("No data available for VND"));
        assert!(out.has_data());
        assert!(!out.all_failed());
    }

    #[test]
    fn all_failed_is_detected() {
        let sel = Selection::new(range(), [Currency::Jpy]);
        let out = fetch_selection(&FlakySource, &sel);
        assert!(out.all_failed());
        assert!(!out.has_data());
        assert_eq!(out.first_error.unwrap().message(), "boom");
    }
}
