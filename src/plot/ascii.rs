//! ASCII small-multiples for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid per panel), optimized for:
//! - quick visual sanity checks in a terminal or a log file
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observations: `*`
//! - connecting segments: `.`

use chrono::NaiveDate;

use crate::analysis::SubplotGrid;
use crate::app::pipeline::Panel;
use crate::report::fmt_rate;

const PANEL_GAP: &str = "   ";

/// Render all panels laid out on `grid`, page by page.
pub fn render_grid(panels: &[Panel], grid: &SubplotGrid, width: usize, height: usize) -> String {
    let mut out = String::new();
    let pages = grid.page_count();

    for page in 0..pages {
        if pages > 1 {
            out.push_str(&format!("--- page {}/{} ---\n", page + 1, pages));
        }
        let slots = grid.page(page);
        for row in 0..grid.rows_on_page(page) {
            let blocks: Vec<Vec<String>> = slots
                .iter()
                .filter(|s| s.row == row)
                .filter_map(|s| panels.get(s.index))
                .map(|p| render_panel_lines(p, width, height))
                .collect();
            let Some(n_lines) = blocks.first().map(Vec::len) else {
                continue;
            };
            for i in 0..n_lines {
                let line: Vec<&str> = blocks.iter().map(|b| b[i].as_str()).collect();
                out.push_str(line.join(PANEL_GAP).trim_end());
                out.push('\n');
            }
            out.push('\n');
        }
    }

    out
}

/// Render one panel as `height + 3` lines, each exactly `width` chars wide:
/// title, y-range, plot rows, date range.
pub fn render_panel_lines(panel: &Panel, width: usize, height: usize) -> Vec<String> {
    let width = width.max(10);
    let height = height.max(3);

    let mut lines = Vec::with_capacity(height + 3);
    lines.push(fit(&panel.title, width));

    let (Some(&(first, _)), Some(&(last, _))) = (panel.points.first(), panel.points.last()) else {
        lines.push(fit("", width));
        for i in 0..height {
            let text = if i == height / 2 { "(no data)" } else { "" };
            lines.push(fit(&format!("{text:^width$}"), width));
        }
        lines.push(fit("", width));
        return lines;
    };

    let (y_min, y_max) = y_range(&panel.points);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    lines.push(fit(
        &format!("y=[{}, {}] {}", fmt_rate(y_min), fmt_rate(y_max), panel.y_label),
        width,
    ));

    let span = (last - first).num_days().max(1) as f64;
    let mut grid = vec![vec![' '; width]; height];
    let mut prev = None;
    for &(date, y) in &panel.points {
        let x = map_x(days_since(first, date), span, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(&mut grid, x0, y0, x, yy, '.');
        }
        prev = Some((x, yy));
    }
    // Observations overlay the connecting segments.
    for &(date, y) in &panel.points {
        let x = map_x(days_since(first, date), span, width);
        let yy = map_y(y, y_min, y_max, height);
        grid[yy][x] = '*';
    }

    for row in grid {
        lines.push(row.into_iter().collect());
    }
    lines.push(fit(&format!("{first} .. {last}"), width));

    lines
}

fn days_since(first: NaiveDate, date: NaiveDate) -> f64 {
    (date - first).num_days() as f64
}

fn fit(s: &str, width: usize) -> String {
    let mut out: String = s.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

fn y_range(points: &[(NaiveDate, f64)]) -> (f64, f64) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_y.is_finite() && max_y.is_finite() {
        (min_y, max_y)
    } else {
        (0.0, 1.0)
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    // Flat series still need a visible band around the line.
    let pad = (span * frac).max(max.abs() * 0.001).max(1e-9);
    (min - pad, max + pad)
}

fn map_x(t: f64, span: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (t / span).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only blank cells are written.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Currency;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn panel(currency: Currency, points: Vec<(NaiveDate, f64)>) -> Panel {
        Panel {
            currency,
            title: format!("{} ({})", currency.country(), currency.pair_label()),
            y_label: currency.pair_label(),
            points,
        }
    }

    #[test]
    fn panel_golden_snapshot_small() {
        let p = panel(Currency::Sgd, vec![(d(1), 1.0), (d(10), 2.0)]);
        let lines = render_panel_lines(&p, 10, 3);
        let expected = vec![
            "Singapore ",
            "y=[0.9500,",
            "       ..*",
            "   ....   ",
            "*..       ",
            "2024-01-01",
        ];
        assert_eq!(lines, expected);
    }

    #[test]
    fn every_line_has_panel_width() {
        let p = panel(Currency::Krw, vec![(d(2), 1300.0), (d(3), 1310.0), (d(4), 1305.0)]);
        let lines = render_panel_lines(&p, 24, 6);
        assert_eq!(lines.len(), 6 + 3);
        assert!(lines.iter().all(|l| l.chars().count() == 24));
        assert_eq!(lines[0].trim_end(), "South Korea (USD/KRW)");
    }

    #[test]
    fn empty_panel_says_no_data() {
        let p = panel(Currency::Vnd, Vec::new());
        let lines = render_panel_lines(&p, 20, 5);
        assert_eq!(lines.len(), 8);
        assert!(lines[4].contains("(no data)"));
    }

    #[test]
    fn grid_renders_side_by_side_and_pages() {
        let panels = vec![
            panel(Currency::Idr, vec![(d(2), 1.0), (d(3), 2.0)]),
            panel(Currency::Myr, vec![(d(2), 1.0), (d(3), 2.0)]),
            panel(Currency::Php, vec![(d(2), 1.0), (d(3), 2.0)]),
        ];
        let grid = SubplotGrid::new(panels.len(), 2, 1);
        let txt = render_grid(&panels, &grid, 12, 3);

        assert!(txt.starts_with("--- page 1/2 ---\n"));
        let first_row = txt.lines().nth(1).unwrap();
        assert!(first_row.starts_with("Indonesia (U"));
        assert!(first_row.contains("Malaysia (US"));
        assert!(txt.contains("--- page 2/2 ---\nPhilippines\n"));
    }

    #[test]
    fn change_mode_keeps_pair_in_title() {
        let mut p = panel(Currency::Sgd, vec![(d(1), 0.0), (d(10), 1.5)]);
        p.y_label = "% chg".to_string();
        let lines = render_panel_lines(&p, 30, 3);
        assert_eq!(lines[0].trim_end(), "Singapore (USD/SGD)");
        assert!(lines[1].trim_end().ends_with("% chg"));
    }
}
