//! Trailing window performance of local currencies against USD.
//!
//! Upstream quotes are USD/local (how many local units buy one USD). Performance
//! is reported from the local holder's side, so rates are inverted first: a
//! positive number means the local currency appreciated against USD.

use std::cmp::Ordering;

use chrono::{Duration, NaiveDate};

use crate::domain::{PerfCell, PerfWindow, PerformanceRow, RateSeries};

/// A series starting more than this many days after the window reference date
/// is flagged as only partially covering the window.
const PARTIAL_TOLERANCE_DAYS: i64 = 4;

/// Compute YTD/1M/3M/6M/12M changes for every non-empty series.
///
/// The anchor ("latest") date is the latest observation across all series so
/// every currency is measured over the same calendar windows. For each window
/// the start value is the first observation on or after the reference date.
pub fn calculate_performance(series: &[RateSeries]) -> Vec<PerformanceRow> {
    let Some(latest) = series.iter().filter_map(|s| s.last()).map(|p| p.date).max() else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for s in series {
        let Some(last) = s.last() else {
            continue;
        };
        let latest_value = 1.0 / last.close;

        let mut row = PerformanceRow::new(s.currency);
        for window in PerfWindow::ALL {
            let reference = window.reference_date(latest);
            let cell = s
                .points()
                .iter()
                .find(|p| p.date >= reference)
                .map(|start| {
                    let start_value = 1.0 / start.close;
                    PerfCell {
                        pct: round2((latest_value - start_value) / start_value * 100.0),
                        since: start.date,
                        partial: starts_late(s, reference),
                    }
                });
            row.set(window, cell);
        }
        rows.push(row);
    }
    rows
}

fn starts_late(series: &RateSeries, reference: NaiveDate) -> bool {
    series
        .first()
        .is_some_and(|p| p.date > reference + Duration::days(PARTIAL_TOLERANCE_DAYS))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Best and worst performers for one window.
#[derive(Debug, Clone, PartialEq)]
pub struct Performers {
    pub window: PerfWindow,
    /// Highest change first.
    pub best: Vec<PerformanceRow>,
    /// Lowest change first.
    pub worst: Vec<PerformanceRow>,
}

/// Rank rows by `window`, ignoring rows without a value for it.
pub fn best_worst(rows: &[PerformanceRow], window: PerfWindow, n: usize) -> Performers {
    let mut ranked: Vec<(f64, &PerformanceRow)> = rows
        .iter()
        .filter_map(|r| r.get(window).map(|c| (c.pct, r)))
        .collect();
    // Stable sorts keep display order among ties on both sides.
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    let best = ranked.iter().take(n).map(|(_, r)| (*r).clone()).collect();

    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    let worst = ranked.iter().take(n).map(|(_, r)| (*r).clone()).collect();

    Performers { window, best, worst }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Currency;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn inverts_quotes_before_measuring() {
        // USD/IDR from 16000 to 15000: rupiah strengthened by 1/15000 / (1/16000) - 1 = 6.67%.
        let s = RateSeries::from_points(
            Currency::Idr,
            vec![(d(2024, 1, 2), 16_000.0), (d(2024, 6, 28), 15_000.0)],
        );
        let rows = calculate_performance(&[s]);
        assert_eq!(rows.len(), 1);

        let ytd = rows[0].get(PerfWindow::Ytd).unwrap();
        assert_eq!(ytd.pct, 6.67);
        assert_eq!(ytd.since, d(2024, 1, 2));
        assert!(!ytd.partial);
    }

    #[test]
    fn window_starts_at_first_observation_on_or_after_reference() {
        // latest = 2024-03-31, 1M reference = 2024-03-01.
        let s = RateSeries::from_points(
            Currency::Sgd,
            vec![
                (d(2024, 2, 28), 1.00),
                (d(2024, 3, 4), 1.25),
                (d(2024, 3, 31), 1.00),
            ],
        );
        let rows = calculate_performance(&[s]);
        let m1 = rows[0].get(PerfWindow::OneMonth).unwrap();
        assert_eq!(m1.since, d(2024, 3, 4));
        assert_eq!(m1.pct, 25.0);
        assert!(!m1.partial);

        // 12M reference (2023-04-01) predates the series by far.
        let m12 = rows[0].get(PerfWindow::TwelveMonths).unwrap();
        assert_eq!(m12.since, d(2024, 2, 28));
        assert!(m12.partial);
    }

    #[test]
    fn latest_date_is_shared_across_series() {
        // JPY stops early: its 1M window has no observation on/after the reference.
        let idr = RateSeries::from_points(Currency::Idr, vec![(d(2024, 1, 2), 1.0), (d(2024, 6, 28), 1.0)]);
        let jpy = RateSeries::from_points(Currency::Jpy, vec![(d(2024, 1, 2), 150.0), (d(2024, 4, 1), 151.0)]);

        let rows = calculate_performance(&[idr, jpy]);
        assert!(rows[1].get(PerfWindow::OneMonth).is_none());
        assert!(rows[1].get(PerfWindow::Ytd).is_some());
    }

    #[test]
    fn empty_series_are_skipped() {
        let rows = calculate_performance(&[RateSeries::empty(Currency::Vnd)]);
        assert!(rows.is_empty());
    }

    #[test]
    fn best_worst_ignores_missing_cells() {
        let mk = |c: Currency, pct: Option<f64>| {
            let mut row = PerformanceRow::new(c);
            row.set(
                PerfWindow::TwelveMonths,
                pct.map(|pct| PerfCell {
                    pct,
                    since: d(2024, 1, 1),
                    partial: false,
                }),
            );
            row
        };
        let rows = vec![
            mk(Currency::Idr, Some(-3.0)),
            mk(Currency::Myr, Some(2.5)),
            mk(Currency::Sgd, None),
            mk(Currency::Jpy, Some(-8.1)),
            mk(Currency::Inr, Some(0.4)),
        ];

        let p = best_worst(&rows, PerfWindow::TwelveMonths, 3);
        let best: Vec<_> = p.best.iter().map(|r| r.currency).collect();
        let worst: Vec<_> = p.worst.iter().map(|r| r.currency).collect();
        assert_eq!(best, vec![Currency::Myr, Currency::Inr, Currency::Idr]);
        assert_eq!(worst, vec![Currency::Jpy, Currency::Idr, Currency::Inr]);
    }

    #[test]
    fn ties_keep_display_order_on_both_sides() {
        let mk = |c: Currency, pct: f64| {
            let mut row = PerformanceRow::new(c);
            row.set(
                PerfWindow::OneMonth,
                Some(PerfCell {
                    pct,
                    since: d(2024, 1, 1),
                    partial: false,
                }),
            );
            row
        };
        let rows = vec![
            mk(Currency::Thb, -1.0),
            mk(Currency::Php, -1.0),
            mk(Currency::Krw, 2.0),
            mk(Currency::Aud, 2.0),
        ];

        let p = best_worst(&rows, PerfWindow::OneMonth, 2);
        let best: Vec<_> = p.best.iter().map(|r| r.currency).collect();
        let worst: Vec<_> = p.worst.iter().map(|r| r.currency).collect();
        assert_eq!(best, vec![Currency::Krw, Currency::Aud]);
        assert_eq!(worst, vec![Currency::Thb, Currency::Php]);
    }
}
