//! Align per-currency series onto a shared date axis.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::{FxTable, RateSeries};

/// Build a wide table over the union of all observed dates.
///
/// Each column is forward-filled: a date missing for one currency (local
/// holiday, upstream gap) carries the previous close. Dates before a
/// currency's first observation stay empty.
pub fn build_table(series: &[RateSeries]) -> FxTable {
    let dates: Vec<NaiveDate> = series
        .iter()
        .flat_map(|s| s.points().iter().map(|p| p.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut columns = Vec::with_capacity(series.len());
    for s in series {
        let mut col = Vec::with_capacity(dates.len());
        let mut points = s.points().iter().peekable();
        let mut carry: Option<f64> = None;
        for date in &dates {
            while let Some(p) = points.next_if(|p| p.date <= *date) {
                carry = Some(p.close);
            }
            col.push(carry);
        }
        columns.push(col);
    }

    FxTable {
        dates,
        currencies: series.iter().map(|s| s.currency).collect(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Currency;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn forward_fills_gaps_and_keeps_leading_gaps_empty() {
        let idr = RateSeries::from_points(Currency::Idr, vec![(d(2), 100.0), (d(4), 104.0)]);
        let jpy = RateSeries::from_points(Currency::Jpy, vec![(d(3), 150.0), (d(4), 151.0), (d(5), 152.0)]);

        let table = build_table(&[idr, jpy]);
        assert_eq!(table.dates, vec![d(2), d(3), d(4), d(5)]);
        assert_eq!(
            table.column(Currency::Idr).unwrap(),
            &[Some(100.0), Some(100.0), Some(104.0), Some(104.0)]
        );
        assert_eq!(
            table.column(Currency::Jpy).unwrap(),
            &[None, Some(150.0), Some(151.0), Some(152.0)]
        );
    }

    #[test]
    fn empty_series_yield_empty_columns() {
        let idr = RateSeries::from_points(Currency::Idr, vec![(d(2), 100.0)]);
        let vnd = RateSeries::empty(Currency::Vnd);

        let table = build_table(&[idr, vnd]);
        assert_eq!(table.currencies, vec![Currency::Idr, Currency::Vnd]);
        assert_eq!(table.column(Currency::Vnd).unwrap(), &[None]);
        assert!(table.series_points(Currency::Vnd).is_empty());
    }

    #[test]
    fn no_series_is_an_empty_table() {
        assert!(build_table(&[]).is_empty());
    }
}
