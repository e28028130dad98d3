//! Shared dashboard pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate selection -> fetch -> align -> performance -> panels
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::NaiveDate;

use crate::analysis::{
    Performers, SubplotGrid, best_worst, build_table, calculate_performance, rebased,
};
use crate::data::{RateSource, fetch_selection};
use crate::domain::{ChartMode, Currency, DashConfig, FxTable, PerformanceRow, RateSeries, Selection};
use crate::error::AppError;

/// All computed outputs of a single dashboard refresh.
#[derive(Debug, Clone)]
pub struct DashboardOutput {
    pub source: String,
    pub selection: Selection,
    /// One series per selected currency (selection order), possibly empty.
    pub series: Vec<RateSeries>,
    pub table: FxTable,
    pub performance: Vec<PerformanceRow>,
    pub performers: Performers,
    pub warnings: Vec<String>,
}

/// Data for one subplot.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub currency: Currency,
    /// `Country (USD/CODE)` in every chart mode.
    pub title: String,
    /// Y-axis unit: `USD/CODE` or `% chg`.
    pub y_label: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl DashboardOutput {
    /// One panel per selected currency, in selection order.
    ///
    /// Currencies without data still get a (empty) panel so the grid always
    /// matches the selection.
    pub fn panels(&self, mode: ChartMode) -> Vec<Panel> {
        self.selection
            .currencies
            .iter()
            .map(|&currency| {
                let level = self.table.series_points(currency);
                let (points, y_label) = match mode {
                    ChartMode::Level => (level, currency.pair_label()),
                    ChartMode::Change => (rebased(&level), "% chg".to_string()),
                };
                Panel {
                    currency,
                    title: format!("{} ({})", currency.country(), currency.pair_label()),
                    y_label,
                    points,
                }
            })
            .collect()
    }

    pub fn grid(&self, config: &DashConfig) -> SubplotGrid {
        SubplotGrid::new(self.selection.currencies.len(), config.max_cols, config.rows_per_page)
    }
}

/// Fetch and compute everything the dashboard shows for `selection`.
pub fn run_dashboard(
    source: &dyn RateSource,
    selection: &Selection,
    config: &DashConfig,
) -> Result<DashboardOutput, AppError> {
    // 1) Validate the selection before touching the network.
    if selection.is_empty() {
        return Err(AppError::no_currency_selected());
    }

    // 2) Fetch every selected currency.
    let outcome = fetch_selection(source, selection);
    if outcome.all_failed() {
        let detail = outcome
            .first_error
            .as_ref()
            .map(|e| e.message().to_string())
            .unwrap_or_default();
        return Err(AppError::new(
            AppError::RUNTIME,
            format!("Upstream fetch failed: {detail}"),
        ));
    }
    if !outcome.has_data() {
        return Err(AppError::no_data());
    }

    // 3) Align onto one date axis; 4) compute window returns.
    let table = build_table(&outcome.series);
    let performance = calculate_performance(&outcome.series);
    let performers = best_worst(&performance, config.rank_window, config.top_n);

    Ok(DashboardOutput {
        source: source.name().to_string(),
        selection: selection.clone(),
        series: outcome.series,
        table,
        performance,
        performers,
        warnings: outcome.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SampleSource;
    use crate::domain::{DateRange, PerfWindow};

    fn range(a: (i32, u32, u32), b: (i32, u32, u32)) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(a.0, a.1, a.2).unwrap(),
            NaiveDate::from_ymd_opt(b.0, b.1, b.2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn subplot_count_matches_selection() {
        let source = SampleSource::new(42);
        let config = DashConfig::default();
        let r = range((2024, 1, 1), (2024, 3, 1));

        for n in 1..=Currency::ALL.len() {
            let sel = Selection::new(r, Currency::ALL.into_iter().take(n));
            let run = run_dashboard(&source, &sel, &config).unwrap();

            for mode in [ChartMode::Level, ChartMode::Change] {
                assert_eq!(run.panels(mode).len(), n);
            }
            let grid = run.grid(&config);
            let rendered: usize = (0..grid.page_count()).map(|p| grid.page(p).len()).sum();
            assert_eq!(rendered, n);
        }
    }

    #[test]
    fn empty_selection_reports_no_currency_selected() {
        let sel = Selection::new(range((2024, 1, 1), (2024, 3, 1)), Vec::<Currency>::new());
        let err = run_dashboard(&SampleSource::new(0), &sel, &DashConfig::default()).unwrap_err();
        assert_eq!(err, AppError::no_currency_selected());
    }

    #[test]
    fn range_without_trading_days_reports_no_data() {
        // Saturday .. Monday (exclusive).
        let sel = Selection::new(range((2024, 1, 6), (2024, 1, 8)), [Currency::Idr, Currency::Jpy]);
        let err = run_dashboard(&SampleSource::new(0), &sel, &DashConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), AppError::NO_DATA);
    }

    struct DownSource;

    impl RateSource for DownSource {
        fn name(&self) -> &str {
            "down"
        }

        fn fetch_series(&self, _: Currency, _: &DateRange) -> Result<RateSeries, AppError> {
            Err(AppError::new(AppError::RUNTIME, "connection refused"))
        }
    }

    #[test]
    fn all_fetches_failing_is_an_upstream_error() {
        let sel = Selection::new(range((2024, 1, 1), (2024, 3, 1)), [Currency::Sgd]);
        let err = run_dashboard(&DownSource, &sel, &DashConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), AppError::RUNTIME);
        assert_eq!(err.message(), "Upstream fetch failed: connection refused");
    }

    #[test]
    fn change_mode_rebases_to_zero() {
        let sel = Selection::new(range((2024, 1, 1), (2024, 2, 1)), [Currency::Thb]);
        let run = run_dashboard(&SampleSource::new(3), &sel, &DashConfig::default()).unwrap();
        let panel = &run.panels(ChartMode::Change)[0];
        assert_eq!(panel.points[0].1, 0.0);
        assert_eq!(panel.y_label, "% chg");
        assert_eq!(panel.title, "Thailand (USD/THB)");
        assert_eq!(run.panels(ChartMode::Level)[0].y_label, "USD/THB");
        assert_eq!(run.performers.window, PerfWindow::TwelveMonths);
    }
}
