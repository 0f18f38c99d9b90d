//! Ratatui-based series browser.
//!
//! The TUI lists the configured series (Euribor maturities, the FX basket,
//! HICP all-items for the larger economies, and the US FRED set), fetches a
//! series on demand through the same retrying pipeline as the CLI, and
//! renders it as a line chart with a small summary panel.

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use chrono::Datelike;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, Paragraph},
};

use crate::cli::TuiArgs;
use crate::data::ecb::EcbClient;
use crate::data::fetch::SeriesFetcher;
use crate::data::fred::FredClient;
use crate::domain::registry::{ALL_ITEMS, CURRENCIES, EURIBOR_SERIES, US_SERIES, fx_key, hicp_key};
use crate::domain::{DateSpan, Measure, NumericSeries, SeriesKey};
use crate::error::AppError;

/// Geos offered in the browser's HICP section.
const BROWSE_GEOS: [&str; 5] = ["U2", "DE", "FR", "IT", "ES"];

/// Start the TUI.
pub fn run(args: &TuiArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).map_err(AppError::terminal)?;

    let mut app = App::new(args);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(AppError::terminal)?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(e));
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
enum ProviderKind {
    Ecb,
    Fred,
}

#[derive(Clone)]
struct CatalogEntry {
    provider: ProviderKind,
    key: SeriesKey,
}

fn build_catalog() -> Vec<CatalogEntry> {
    let mut entries = Vec::new();
    for (name, code) in EURIBOR_SERIES {
        entries.push(CatalogEntry {
            provider: ProviderKind::Ecb,
            key: SeriesKey::new(name, code),
        });
    }
    for cur in CURRENCIES {
        entries.push(CatalogEntry {
            provider: ProviderKind::Ecb,
            key: SeriesKey::new(format!("fx_{}", cur.to_ascii_lowercase()), fx_key(cur)),
        });
    }
    for geo in BROWSE_GEOS {
        entries.push(CatalogEntry {
            provider: ProviderKind::Ecb,
            key: SeriesKey::new(
                format!("hicp_{}", geo.to_ascii_lowercase()),
                hicp_key(geo, ALL_ITEMS, Measure::Anr),
            ),
        });
    }
    for (name, code) in US_SERIES {
        entries.push(CatalogEntry {
            provider: ProviderKind::Fred,
            key: SeriesKey::new(name, code),
        });
    }
    entries
}

struct App {
    span: DateSpan,
    catalog: Vec<CatalogEntry>,
    selected: usize,
    loaded: HashMap<usize, NumericSeries>,
    status: String,
    ecb: SeriesFetcher<EcbClient>,
    /// Absent when FRED_API_KEY is not configured; selecting a FRED series
    /// then reports the missing credential in the status line.
    fred: Option<SeriesFetcher<FredClient>>,
}

impl App {
    fn new(args: &TuiArgs) -> Self {
        let fred = crate::app::fred_fetcher_from_env(&args.fetch).ok();
        Self {
            span: args.fetch.span(),
            catalog: build_catalog(),
            selected: 0,
            loaded: HashMap::new(),
            status: "Enter to fetch the selected series.".to_string(),
            ecb: crate::app::ecb_fetcher(&args.fetch),
            fred,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(AppError::terminal)?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(AppError::terminal)? {
                continue;
            }

            match event::read().map_err(AppError::terminal)? {
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

    /// Returns true when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected + 1 < self.catalog.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('r') => self.fetch_selected(),
            _ => {}
        }
        false
    }

    fn fetch_selected(&mut self) {
        let entry = self.catalog[self.selected].clone();
        self.status = format!("Fetching {} ...", entry.key);

        let result = match entry.provider {
            ProviderKind::Ecb => self.ecb.fetch(&entry.key, &self.span),
            ProviderKind::Fred => match &self.fred {
                Some(fred) => fred.fetch(&entry.key, &self.span),
                None => Err(AppError::MissingCredential {
                    var: "FRED_API_KEY",
                }),
            },
        };

        match result {
            Ok(normalized) => {
                self.status = format!(
                    "{}: {} observations ({} rows dropped)",
                    entry.key.name,
                    normalized.series.len(),
                    normalized.rows_dropped
                );
                self.loaded.insert(self.selected, normalized.series);
            }
            Err(err) => {
                self.status = err.to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let span_label = format!(
            "span: {} .. {}",
            self.span.start.as_deref().unwrap_or("-"),
            self.span.end.as_deref().unwrap_or("latest"),
        );
        let line = Line::from(vec![
            Span::styled("econ", Style::default().fg(Color::Cyan)),
            Span::raw(" - macro series browser | "),
            Span::styled(span_label, Style::default().fg(Color::Gray)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(0)])
            .split(area);

        self.draw_catalog(frame, chunks[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(5)])
            .split(chunks[1]);
        self.draw_chart(frame, right[0]);
        self.draw_details(frame, right[1]);
    }

    fn draw_catalog(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .catalog
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let marker = if self.loaded.contains_key(&idx) { "*" } else { " " };
                ListItem::new(format!("{marker} {}", entry.key.name))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Series").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let entry = &self.catalog[self.selected];
        let block = Block::default()
            .title(entry.key.to_string())
            .borders(Borders::ALL);

        let Some(series) = self.loaded.get(&self.selected) else {
            let msg = Paragraph::new("Press Enter to fetch this series.")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        };

        let points: Vec<(f64, f64)> = series
            .points()
            .iter()
            .map(|(date, value)| (date.num_days_from_ce() as f64, *value))
            .collect();
        let (x_bounds, y_bounds) = chart_bounds(&points);

        let x_labels: Vec<String> = [series.first_date(), series.last_date()]
            .into_iter()
            .flatten()
            .map(|d| d.to_string())
            .collect();
        let y_labels = vec![
            format!("{:.2}", y_bounds[0]),
            format!("{:.2}", (y_bounds[0] + y_bounds[1]) / 2.0),
            format!("{:.2}", y_bounds[1]),
        ];

        let dataset = Dataset::default()
            .name(entry.key.name.clone())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&points);

        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds(x_bounds)
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds(y_bounds)
                    .labels(y_labels),
            );

        frame.render_widget(chart, area);
    }

    fn draw_details(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Details").borders(Borders::ALL);

        let Some(series) = self.loaded.get(&self.selected) else {
            frame.render_widget(block, area);
            return;
        };

        let (min, max) = value_range(series);
        let lines = vec![
            Line::from(format!(
                "observations: {} | {} .. {}",
                series.len(),
                series.first_date().map(|d| d.to_string()).unwrap_or_default(),
                series.last_date().map(|d| d.to_string()).unwrap_or_default(),
            )),
            Line::from(format!("range: {min:.4} .. {max:.4}")),
            Line::from(format!(
                "latest: {}",
                series
                    .points()
                    .last()
                    .map(|(d, v)| format!("{d} = {v:.4}"))
                    .unwrap_or_default()
            )),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  Enter/r fetch  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(
                &self.status,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
            area,
        );
    }
}

/// Chart bounds with a little padding; degenerate ranges are widened so a
/// flat or single-point series still renders.
fn chart_bounds(points: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (x, y) in points {
        x_min = x_min.min(*x);
        x_max = x_max.max(*x);
        y_min = y_min.min(*y);
        y_max = y_max.max(*y);
    }
    if !x_min.is_finite() || !x_max.is_finite() {
        return ([0.0, 1.0], [0.0, 1.0]);
    }
    if x_max - x_min < 1.0 {
        x_max = x_min + 1.0;
    }
    if y_max - y_min < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    } else {
        let pad = (y_max - y_min) * 0.05;
        y_min -= pad;
        y_max += pad;
    }
    ([x_min, x_max], [y_min, y_max])
}

fn value_range(series: &NumericSeries) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (_, v) in series.points() {
        min = min.min(*v);
        max = max.max(*v);
    }
    (min, max)
}
