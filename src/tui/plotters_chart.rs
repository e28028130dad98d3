//! Plotters-powered FX line chart widget for Ratatui.
//!
//! One widget draws one subplot: a single line series against calendar days.
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct FxLineChart<'a> {
    /// `(days since base_date, value)` pairs.
    pub line: &'a [(f64, f64)],
    /// Date at x = 0, used for tick labels.
    pub base_date: NaiveDate,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
    pub fmt_y: fn(f64) -> String,
    pub color: RGBColor,
}

/// Owned data behind an [`FxLineChart`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub line: Vec<(f64, f64)>,
    pub base_date: NaiveDate,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartSeries {
    /// Build chart data from dated points. Returns `None` without points.
    pub fn from_points(points: &[(NaiveDate, f64)]) -> Option<Self> {
        let &(base_date, _) = points.first()?;
        let &(last, _) = points.last()?;

        let line: Vec<(f64, f64)> = points
            .iter()
            .map(|&(d, v)| ((d - base_date).num_days() as f64, v))
            .collect();

        let span = ((last - base_date).num_days() as f64).max(1.0);

        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(_, y) in &line {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if !y_min.is_finite() || !y_max.is_finite() {
            y_min = 0.0;
            y_max = 1.0;
        }
        let pad = ((y_max - y_min).abs() * 0.05).max(y_max.abs() * 0.001).max(1e-9);

        Some(Self {
            line,
            base_date,
            x_bounds: [0.0, span],
            y_bounds: [y_min - pad, y_max + pad],
        })
    }

    pub fn widget<'a>(&'a self, y_label: &'a str, fmt_y: fn(f64) -> String, color: RGBColor) -> FxLineChart<'a> {
        FxLineChart {
            line: &self.line,
            base_date: self.base_date,
            x_bounds: self.x_bounds,
            y_bounds: self.y_bounds,
            y_label,
            fmt_y,
            color,
        }
    }
}

impl Widget for FxLineChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out axes in a tiny area.
        if area.width < 16 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "too small",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let base = self.base_date;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(3)
                .y_labels(4)
                .x_label_formatter(&|v| {
                    (base + Duration::days(v.round() as i64)).format("%y-%m-%d").to_string()
                })
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            chart.draw_series(LineSeries::new(self.line.iter().copied(), &self.color))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
