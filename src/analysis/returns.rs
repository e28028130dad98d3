//! Percentage-change series.

use chrono::NaiveDate;

/// Day-over-day percent change. The first point has no predecessor and is omitted.
pub fn pct_change(points: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    points
        .windows(2)
        .filter(|w| w[0].1 != 0.0)
        .map(|w| (w[1].0, (w[1].1 / w[0].1 - 1.0) * 100.0))
        .collect()
}

/// Percent change of every point relative to the first one.
pub fn rebased(points: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    let Some(&(_, base)) = points.first() else {
        return Vec::new();
    };
    if base == 0.0 {
        return Vec::new();
    }
    points
        .iter()
        .map(|&(d, v)| (d, (v / base - 1.0) * 100.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    #[test]
    fn pct_change_basic() {
        let out = pct_change(&[(d(1), 100.0), (d(2), 110.0), (d(3), 99.0)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].0, d(2));
        assert!((out[0].1 - 10.0).abs() < 1e-9);
        assert!((out[1].1 + 10.0).abs() < 1e-9);
    }

    #[test]
    fn rebased_starts_at_zero() {
        let out = rebased(&[(d(1), 4.0), (d(2), 5.0), (d(3), 3.0)]);
        assert_eq!(out[0], (d(1), 0.0));
        assert!((out[1].1 - 25.0).abs() < 1e-9);
        assert!((out[2].1 + 25.0).abs() < 1e-9);
        assert!(rebased(&[]).is_empty());
    }
}
