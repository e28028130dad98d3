//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing the date range and the
//! currency subset, then renders one line chart per selected currency
//! (paginated) and the trailing performance table.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs},
};

use crate::app::pipeline::{DashboardOutput, run_dashboard};
use crate::data::RateSource;
use crate::domain::{ChartMode, Currency, DashConfig, DateRange, PerfWindow, PerformanceRow, Selection};
use crate::error::AppError;
use crate::io::{DEFAULT_RAW_FILE, default_performance_path, write_performance_csv, write_raw_csv};
use crate::report::fmt_rate;

mod plotters_chart;

use plotters_chart::ChartSeries;

/// Settings rows before the currency checklist.
const DATE_FIELDS: usize = 2;

const PALETTE: [RGBColor; 6] = [
    RGBColor(0, 255, 255),
    RGBColor(255, 200, 0),
    RGBColor(120, 220, 120),
    RGBColor(255, 120, 200),
    RGBColor(140, 160, 255),
    RGBColor(255, 140, 80),
];

/// Start the TUI with `selection` preloaded into the settings panel.
pub fn run(source: Box<dyn RateSource>, selection: Selection) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(AppError::RUNTIME, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(source, &selection);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::new(AppError::RUNTIME, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(
                AppError::RUNTIME,
                format!("Failed to enter alternate screen: {e}"),
            ));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Home,
    Charts,
    Performance,
}

impl Page {
    const ALL: [Page; 3] = [Page::Home, Page::Charts, Page::Performance];

    fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Charts => "Charts",
            Page::Performance => "Performance",
        }
    }

    fn index(self) -> usize {
        match self {
            Page::Home => 0,
            Page::Charts => 1,
            Page::Performance => 2,
        }
    }

    fn next(self) -> Self {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }
}

struct App {
    source: Box<dyn RateSource>,
    config: DashConfig,
    start_input: String,
    end_input: String,
    /// Checked state per `Currency::ALL` entry.
    checked: [bool; 12],
    selected_field: usize,
    editing: bool,
    edit_buffer: String,
    page: Page,
    chart_page: usize,
    pending_fetch: bool,
    status: String,
    /// Last successful fetch; kept until the next one succeeds.
    run: Option<DashboardOutput>,
}

impl App {
    fn new(source: Box<dyn RateSource>, selection: &Selection) -> Self {
        let checked = Currency::ALL.map(|c| selection.currencies.contains(&c));
        Self {
            source,
            config: DashConfig::default(),
            start_input: selection.range.start().to_string(),
            end_input: selection.range.end().to_string(),
            checked,
            selected_field: 0,
            editing: false,
            edit_buffer: String::new(),
            page: Page::Home,
            chart_page: 0,
            pending_fetch: false,
            status: "Press f to fetch data.".to_string(),
            run: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(AppError::RUNTIME, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            // Fetch after the "Fetching..." status has been drawn; the request blocks.
            if self.pending_fetch {
                self.pending_fetch = false;
                self.fetch();
                needs_redraw = true;
                continue;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(AppError::RUNTIME, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(AppError::RUNTIME, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.page = self.page.next(),
            KeyCode::Char('1') => self.page = Page::Home,
            KeyCode::Char('2') => self.page = Page::Charts,
            KeyCode::Char('3') => self.page = Page::Performance,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < DATE_FIELDS + Currency::ALL.len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Enter => {
                if self.selected_field < DATE_FIELDS {
                    self.editing = true;
                    self.edit_buffer = self.date_input(self.selected_field).to_string();
                    self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
                } else {
                    self.toggle_selected();
                }
            }
            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('a') => {
                let all = self.checked.iter().all(|&c| c);
                self.checked = [!all; 12];
                self.status = if all { "Cleared all currencies." } else { "Selected all currencies." }.to_string();
            }
            KeyCode::Char('f') => {
                self.pending_fetch = true;
                self.status = format!("Fetching from {}...", self.source.name());
            }
            KeyCode::Char('v') => {
                self.config.mode = self.config.mode.toggle();
                self.status = format!("chart mode: {}", self.config.mode.display_name());
            }
            KeyCode::PageDown => {
                if let Some(run) = &self.run {
                    let pages = run.grid(&self.config).page_count();
                    self.chart_page = (self.chart_page + 1).min(pages - 1);
                }
            }
            KeyCode::PageUp => {
                self.chart_page = self.chart_page.saturating_sub(1);
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                match parse_date(&self.edit_buffer) {
                    Ok(date) => {
                        let value = date.to_string();
                        if self.selected_field == 0 {
                            self.start_input = value;
                        } else {
                            self.end_input = value;
                        }
                        self.status = "Date updated. Press f to fetch.".to_string();
                    }
                    Err(e) => self.status = e.message().to_string(),
                }
            }
            KeyCode::Backspace => {
                self.edit_buffer.pop();
            }
            KeyCode::Char(c) => {
                if (c.is_ascii_digit() || c == '-') && self.edit_buffer.len() < 10 {
                    self.edit_buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn date_input(&self, field: usize) -> &str {
        if field == 0 { &self.start_input } else { &self.end_input }
    }

    fn toggle_selected(&mut self) {
        let Some(idx) = self.selected_field.checked_sub(DATE_FIELDS) else {
            return;
        };
        if let Some(flag) = self.checked.get_mut(idx) {
            *flag = !*flag;
        }
    }

    /// The selection described by the settings panel.
    fn selection(&self) -> Result<Selection, AppError> {
        let range = DateRange::new(parse_date(&self.start_input)?, parse_date(&self.end_input)?)?;
        let currencies = Currency::ALL
            .into_iter()
            .zip(self.checked)
            .filter_map(|(c, on)| on.then_some(c));
        Ok(Selection::new(range, currencies))
    }

    fn fetch(&mut self) {
        let result = self
            .selection()
            .and_then(|sel| run_dashboard(self.source.as_ref(), &sel, &self.config));

        match result {
            Ok(run) => {
                for w in &run.warnings {
                    log::warn!("{w}");
                }
                self.status = match run.warnings.first() {
                    Some(first) => format!(
                        "Fetched {} currencies ({} warnings; {first})",
                        run.selection.currencies.len(),
                        run.warnings.len()
                    ),
                    None => format!(
                        "Fetched {} currencies, {} rows.",
                        run.selection.currencies.len(),
                        run.table.dates.len()
                    ),
                };
                self.run = Some(run);
                self.chart_page = 0;
            }
            Err(err) => {
                log::warn!("fetch failed: {err}");
                self.status = err.message().to_string();
            }
        }
    }

    fn export(&mut self) {
        let Some(run) = &self.run else {
            self.status = "Nothing to export yet. Press f to fetch.".to_string();
            return;
        };
        let raw = PathBuf::from(DEFAULT_RAW_FILE);
        let perf = default_performance_path(&run.selection.range);
        let result = write_raw_csv(&raw, &run.series).and_then(|()| write_performance_csv(&perf, &run.performance));
        self.status = match result {
            Ok(()) => format!("Wrote {} and {}", raw.display(), perf.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.page {
            Page::Home => self.draw_home(frame, chunks[1]),
            Page::Charts => self.draw_charts(frame, chunks[1]),
            Page::Performance => self.draw_performance(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(Span::styled(
            "fxdash - 1 USD in local currency",
            Style::default().fg(Color::Cyan),
        ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let tabs = Tabs::new(Page::ALL.iter().map(|p| p.title()))
            .select(self.page.index())
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, rows[0]);

        let selected = self.checked.iter().filter(|&&c| c).count();
        let info = format!(
            "source: {} | {} .. {} | {selected} currencies | mode: {}",
            self.source.name(),
            self.start_input,
            self.end_input,
            self.config.mode.display_name(),
        );
        frame.render_widget(Paragraph::new(info).style(Style::default().fg(Color::Gray)), rows[1]);
    }

    fn draw_home(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(0)])
            .split(area);

        self.draw_settings(frame, chunks[0]);

        let text = match &self.run {
            Some(run) => {
                let mut s = crate::report::format_run_summary(run);
                s.push('\n');
                s.push_str(&crate::report::format_latest_moves(&run.table));
                Text::from(s)
            }
            None => Text::from(vec![
                Line::from("Pick a date range and currencies, then press f to fetch."),
                Line::from(""),
                Line::from("Rates are quoted as local currency per 1 USD."),
                Line::from("Performance is measured for the local currency against USD."),
            ]),
        };
        let p = Paragraph::new(text).block(Block::default().title("Summary").borders(Borders::ALL));
        frame.render_widget(p, chunks[1]);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::with_capacity(DATE_FIELDS + Currency::ALL.len());
        for (field, label) in ["Start", "End"].into_iter().enumerate() {
            let value = if self.editing && self.selected_field == field {
                format!("{}_", self.edit_buffer)
            } else {
                self.date_input(field).to_string()
            };
            items.push(ListItem::new(format!("{label:<6}{value}")));
        }
        for (c, on) in Currency::ALL.into_iter().zip(self.checked) {
            let mark = if on { "[x]" } else { "[ ]" };
            items.push(ListItem::new(format!("{mark} {} {}", c.code(), c.country())));
        }

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing {
            let hint = Paragraph::new("Editing date…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_charts(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(run) = &self.run else {
            draw_waiting(frame, area, "Charts");
            return;
        };

        let grid = run.grid(&self.config);
        let pages = grid.page_count();
        let page = self.chart_page.min(pages - 1);

        let block = Block::default()
            .title(format!(
                "Charts ({}) - page {}/{pages}",
                self.config.mode.display_name(),
                page + 1
            ))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let panels = run.panels(self.config.mode);
        let n_rows = grid.rows_on_page(page).max(1);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints((0..n_rows).map(|_| Constraint::Ratio(1, n_rows as u32)))
            .split(inner);

        let fmt_y: fn(f64) -> String = match self.config.mode {
            ChartMode::Level => fmt_rate,
            ChartMode::Change => fmt_pct,
        };

        for slot in grid.page(page) {
            let Some(panel) = panels.get(slot.index) else {
                continue;
            };
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints((0..grid.cols).map(|_| Constraint::Ratio(1, grid.cols as u32)))
                .split(rows[slot.row]);
            let cell = cols[slot.col];

            let panel_block = Block::default()
                .title(panel.title.clone())
                .borders(Borders::ALL);
            let chart_area = panel_block.inner(cell);
            frame.render_widget(panel_block, cell);

            match ChartSeries::from_points(&panel.points) {
                Some(series) => {
                    let color = PALETTE[slot.index % PALETTE.len()];
                    frame.render_widget(series.widget(&panel.y_label, fmt_y, color), chart_area);
                }
                None => {
                    let msg = Paragraph::new("(no data)")
                        .alignment(Alignment::Center)
                        .style(Style::default().fg(Color::Yellow));
                    frame.render_widget(msg, chart_area);
                }
            }
        }
    }

    fn draw_performance(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(run) = &self.run else {
            draw_waiting(frame, area, "Performance");
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(self.config.top_n as u16 + 2),
            ])
            .split(area);

        let header = Row::new(
            std::iter::once(Cell::from("Currency"))
                .chain(PerfWindow::ALL.iter().map(|w| Cell::from(w.label()))),
        )
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = run.performance.iter().map(|row| {
            let cells = std::iter::once(Cell::from(row.currency.country()))
                .chain(PerfWindow::ALL.iter().map(|&w| perf_cell(row, w)));
            Row::new(cells)
        });

        let widths = std::iter::once(Constraint::Length(14)).chain(PerfWindow::ALL.iter().map(|_| Constraint::Length(10)));
        let table = Table::new(rows, widths).header(header).block(
            Block::default()
                .title("Percentage Change (Local Currency vs USD)")
                .borders(Borders::ALL),
        );
        frame.render_widget(table, chunks[0]);

        let sides = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
            .split(chunks[1]);
        let window = run.performers.window;
        for (rect, title, rows) in [
            (sides[0], "Best", &run.performers.best),
            (sides[1], "Worst", &run.performers.worst),
        ] {
            let items: Vec<ListItem> = rows
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    ListItem::new(Line::from(vec![
                        Span::raw(format!("{}) {:<14} ", i + 1, r.currency.country())),
                        perf_span(r, window),
                    ]))
                })
                .collect();
            let list = List::new(items).block(
                Block::default()
                    .title(format!("{title} Performers ({})", window.label()))
                    .borders(Borders::ALL),
            );
            frame.render_widget(list, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab page  ↑/↓ select  Enter edit  space toggle  a all  f fetch  v mode  PgUp/PgDn  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_waiting(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str) {
    let msg = Paragraph::new("No data yet. Press f to fetch.")
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(msg, area);
}

fn parse_date(input: &str) -> Result<NaiveDate, AppError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|e| AppError::new(AppError::USAGE, format!("Invalid date '{trimmed}': {e}")))
}

fn fmt_pct(v: f64) -> String {
    format!("{v:+.1}%")
}

/// Green for local appreciation, red for depreciation.
fn perf_style(pct: f64) -> Style {
    if pct > 0.0 {
        Style::default().fg(Color::Green)
    } else if pct < 0.0 {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    }
}

fn perf_cell(row: &PerformanceRow, window: PerfWindow) -> Cell<'static> {
    let cell = row.get(window);
    let text = crate::report::fmt_cell(cell);
    match cell {
        Some(c) => Cell::from(text).style(perf_style(c.pct)),
        None => Cell::from(text).style(Style::default().fg(Color::DarkGray)),
    }
}

fn perf_span(row: &PerformanceRow, window: PerfWindow) -> Span<'static> {
    let cell = row.get(window);
    let style = cell.map(|c| perf_style(c.pct)).unwrap_or_default();
    Span::styled(crate::report::fmt_cell(cell), style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SampleSource;

    fn app(currencies: &[Currency]) -> App {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        )
        .unwrap();
        App::new(
            Box::new(SampleSource::new(11)),
            &Selection::new(range, currencies.iter().copied()),
        )
    }

    #[test]
    fn settings_mirror_initial_selection() {
        let app = app(&[Currency::Sgd, Currency::Jpy]);
        let sel = app.selection().unwrap();
        // Checklist order is the display order, not the CLI order.
        assert_eq!(sel.currencies, vec![Currency::Sgd, Currency::Jpy]);
        assert_eq!(app.start_input, "2024-01-01");
    }

    #[test]
    fn fetch_populates_run_and_pages() {
        let mut app = app(&Currency::ALL);
        assert!(!app.handle_key(KeyCode::Char('f')));
        assert!(app.pending_fetch);
        app.fetch();

        let run = app.run.as_ref().unwrap();
        assert_eq!(run.panels(app.config.mode).len(), 12);
        assert_eq!(run.grid(&app.config).page_count(), 1);
        assert!(app.status.starts_with("Fetched 12 currencies"));
    }

    #[test]
    fn clearing_all_currencies_reports_no_selection() {
        let mut app = app(&Currency::ALL);
        app.handle_key(KeyCode::Char('a'));
        assert!(app.checked.iter().all(|&c| !c));
        app.fetch();
        assert!(app.run.is_none());
        assert_eq!(app.status, AppError::no_currency_selected().message());
    }

    #[test]
    fn date_edit_validates_input() {
        let mut app = app(&[Currency::Idr]);
        app.handle_key(KeyCode::Enter);
        assert!(app.editing);
        for _ in 0..10 {
            app.handle_key(KeyCode::Backspace);
        }
        for c in "2024-02-30".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.start_input, "2024-01-01");
        assert!(app.status.starts_with("Invalid date '2024-02-30'"));

        app.handle_key(KeyCode::Enter);
        app.edit_buffer = "2024-02-01".to_string();
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.start_input, "2024-02-01");
    }

    #[test]
    fn space_toggles_the_highlighted_currency() {
        let mut app = app(&[]);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char(' '));
        assert_eq!(app.selection().unwrap().currencies, vec![Currency::Idr]);
    }

    #[test]
    fn perf_cells_are_coloured_by_sign() {
        assert_eq!(perf_style(1.2).fg, Some(Color::Green));
        assert_eq!(perf_style(-0.4).fg, Some(Color::Red));
        assert_eq!(perf_style(0.0).fg, None);
    }
}
