//! Ratatui-based terminal UI.
//!
//! Runs the pipeline once, then pages through the MACD, RSI, Bollinger and
//! prediction charts. `r` re-runs the pipeline (re-fetching prices).

use std::io;
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
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
};

use crate::app::pipeline::{RunOutput, run_pipeline};
use crate::domain::PipelineConfig;
use crate::error::AppError;
use crate::plot::{RSI_OVERBOUGHT, RSI_OVERSOLD};

mod plotters_chart;

use plotters_chart::{ChartLine, LinePlottersChart};

/// Start the TUI.
pub fn run(config: PipelineConfig) -> Result<(), AppError> {
    // Fetch before touching the terminal so load errors print normally.
    let run = run_pipeline(&config)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App {
        config,
        view: ChartView::Macd,
        status: "Loaded.".to_string(),
        run,
    };
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
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
enum ChartView {
    Macd,
    Rsi,
    Bollinger,
    Predictions,
}

impl ChartView {
    const ALL: [ChartView; 4] = [
        ChartView::Macd,
        ChartView::Rsi,
        ChartView::Bollinger,
        ChartView::Predictions,
    ];

    fn title(self) -> &'static str {
        match self {
            ChartView::Macd => "MACD",
            ChartView::Rsi => "RSI",
            ChartView::Bollinger => "Bollinger",
            ChartView::Predictions => "Predictions",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

struct App {
    config: PipelineConfig,
    view: ChartView,
    status: String,
    run: RunOutput,
}

impl App {
    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
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
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Right | KeyCode::Tab => self.view = self.view.next(),
            KeyCode::Left | KeyCode::BackTab => self.view = self.view.prev(),
            KeyCode::Char('r') => self.rerun(),
            _ => {}
        }
        false
    }

    fn rerun(&mut self) {
        // A failed refresh keeps the previous results on screen.
        match run_pipeline(&self.config) {
            Ok(run) => {
                self.run = run;
                self.status = "Re-ran pipeline.".to_string();
            }
            Err(err) => {
                tracing::warn!(error = %err, "re-run failed");
                self.status = format!("Re-run failed: {err}");
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);
        self.draw_chart(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let run = &self.run;
        let range = run
            .series
            .date_range()
            .map(|(a, b)| format!("{a} .. {b}"))
            .unwrap_or_else(|| "-".to_string());

        let metrics = run
            .training
            .runs()
            .iter()
            .map(|m| format!("{}: rmse={:.3}", m.name, m.metrics.rmse))
            .collect::<Vec<_>>()
            .join(" | ");

        let lines = vec![
            Line::from(vec![
                Span::styled("stx", Style::default().fg(Color::Cyan)),
                Span::raw(format!(
                    " {} ({}) {range} | rows={} enriched={} test={}",
                    run.series.symbol(),
                    self.config.source.display_name(),
                    run.series.len(),
                    run.enriched.len(),
                    run.split.test.len(),
                )),
            ]),
            Line::from(Span::styled(metrics, Style::default().fg(Color::Gray))),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles = ChartView::ALL.iter().map(|v| v.title()).collect::<Vec<_>>();
        let tabs = Tabs::new(titles)
            .select(self.view.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let data = chart_data(&self.run, self.view);

        let block = Block::default().title(self.view.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = LinePlottersChart {
            lines: &data.lines,
            guides: &data.guides,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
        };
        frame.render_widget(widget, chart_rect);

        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &data);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ Tab switch chart  r re-run  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Everything needed to draw one chart view.
#[derive(Debug, Clone)]
struct ChartData {
    lines: Vec<ChartLine>,
    guides: Vec<f64>,
    dates: Vec<NaiveDate>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_data(run: &RunOutput, view: ChartView) -> ChartData {
    let rows = &run.enriched.rows;
    let indexed = |values: Vec<f64>| -> Vec<(f64, f64)> {
        values.into_iter().enumerate().map(|(i, v)| (i as f64, v)).collect()
    };
    let line = |label: &str, color: RGBColor, values: Vec<f64>| ChartLine {
        label: label.to_string(),
        color,
        points: indexed(values),
    };
    let column = |f: fn(&crate::domain::EnrichedRow) -> f64| rows.iter().map(f).collect::<Vec<f64>>();

    let cyan = RGBColor(0, 255, 255);
    let yellow = RGBColor(255, 255, 0);
    let magenta = RGBColor(255, 0, 255);
    let white = RGBColor(255, 255, 255);
    let green = RGBColor(0, 255, 0);
    let red = RGBColor(255, 80, 80);

    let (lines, guides, dates, fixed_y) = match view {
        ChartView::Macd => (
            vec![
                line("MACD", cyan, column(|r| r.indicators.macd)),
                line("Signal", yellow, column(|r| r.indicators.signal)),
            ],
            vec![0.0],
            rows.iter().map(|r| r.point.date).collect(),
            None,
        ),
        ChartView::Rsi => (
            vec![line("RSI", magenta, column(|r| r.indicators.rsi))],
            vec![RSI_OVERSOLD, RSI_OVERBOUGHT],
            rows.iter().map(|r| r.point.date).collect(),
            Some([0.0, 100.0]),
        ),
        ChartView::Bollinger => (
            vec![
                line("Close", white, column(|r| r.point.close)),
                line("Middle", cyan, column(|r| r.indicators.bb_middle)),
                line("Upper", red, column(|r| r.indicators.bb_upper)),
                line("Lower", green, column(|r| r.indicators.bb_lower)),
            ],
            Vec::new(),
            rows.iter().map(|r| r.point.date).collect(),
            None,
        ),
        ChartView::Predictions => {
            let test = &run.split.test;
            (
                vec![
                    line("Actual", white, test.targets.clone()),
                    line(run.training.linear.name, cyan, run.training.linear.predictions.clone()),
                    line(run.training.forest.name, green, run.training.forest.predictions.clone()),
                ],
                Vec::new(),
                test.dates.clone(),
                None,
            )
        }
    };

    let x_bounds = [0.0, dates.len().saturating_sub(1).max(1) as f64];
    let y_bounds = fixed_y.unwrap_or_else(|| {
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(_, y) in lines.iter().flat_map(|l| l.points.iter()) {
            lo = lo.min(y);
            hi = hi.max(y);
        }
        for &g in &guides {
            lo = lo.min(g);
            hi = hi.max(g);
        }
        if !lo.is_finite() || !hi.is_finite() || hi <= lo {
            lo = 0.0;
            hi = 1.0;
        }
        let pad = ((hi - lo) * 0.05).max(1e-12);
        [lo - pad, hi + pad]
    });

    ChartData {
        lines,
        guides,
        dates,
        x_bounds,
        y_bounds,
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 10,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

/// Date ticks under the chart, value ticks to its left, legend on the last row.
fn draw_axis_ticks(frame: &mut ratatui::Frame<'_>, inner: Rect, chart: Rect, insets: AxisInsets, data: &ChartData) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    let y = chart.y + chart.height;
    if y < inner.y + inner.height - 1 {
        for i in 0..ticks {
            let u = i as f64 / (ticks as f64 - 1.0);
            let idx = (u * data.x_bounds[1]).round() as usize;
            let Some(date) = data.dates.get(idx) else {
                continue;
            };
            let label = date.format("%Y-%m-%d").to_string();
            let label_len = label.len() as u16;
            let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
            let start = x
                .saturating_sub(label_len / 2)
                .clamp(inner.x, (inner.x + inner.width).saturating_sub(label_len));
            frame.render_widget(
                Paragraph::new(label).style(style),
                Rect {
                    x: start,
                    y,
                    width: label_len,
                    height: 1,
                },
            );
        }
    }

    let [y0, y1] = data.y_bounds;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y0 + u * (y1 - y0);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.2}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let legend = data
        .lines
        .iter()
        .map(|l| {
            let RGBColor(r, g, b) = l.color;
            Span::styled(format!("■ {}  ", l.label), Style::default().fg(Color::Rgb(r, g, b)))
        })
        .collect::<Vec<_>>();
    let legend_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if legend_rect.y < inner.y + inner.height {
        frame.render_widget(
            Paragraph::new(Line::from(legend))
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::BOLD)),
            legend_rect,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_pipeline_with_series;
    use crate::data::generate_series;
    use crate::domain::{DataSourceKind, FetchConfig, ForestConfig, IndicatorParams};

    fn sample_run() -> RunOutput {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 9, 1).unwrap();
        let config = PipelineConfig {
            symbol: "SYN".into(),
            start,
            end,
            source: DataSourceKind::Synthetic,
            csv_path: None,
            fetch: FetchConfig::default(),
            indicators: IndicatorParams::default(),
            test_fraction: 0.2,
            forest: ForestConfig {
                n_trees: 5,
                max_depth: 4,
                ..ForestConfig::default()
            },
            chart_dir: None,
            plot: false,
            plot_width: 80,
            plot_height: 20,
        };
        let series = generate_series("SYN", start, end, 3).unwrap();
        run_pipeline_with_series(&config, series).unwrap()
    }

    #[test]
    fn views_cycle_both_ways() {
        let mut v = ChartView::Macd;
        for _ in 0..ChartView::ALL.len() {
            v = v.next();
        }
        assert_eq!(v, ChartView::Macd);
        assert_eq!(ChartView::Macd.prev(), ChartView::Predictions);
    }

    #[test]
    fn rsi_view_has_fixed_axis_and_guides() {
        let run = sample_run();
        let data = chart_data(&run, ChartView::Rsi);
        assert_eq!(data.y_bounds, [0.0, 100.0]);
        assert_eq!(data.guides, vec![30.0, 70.0]);
        assert_eq!(data.lines[0].points.len(), run.enriched.len());
    }

    #[test]
    fn prediction_view_spans_test_rows() {
        let run = sample_run();
        let data = chart_data(&run, ChartView::Predictions);
        assert_eq!(data.lines.len(), 3);
        assert_eq!(data.dates.len(), run.split.test.len());
        for line in &data.lines {
            assert_eq!(line.points.len(), run.split.test.len());
            for &(_, y) in &line.points {
                assert!(y >= data.y_bounds[0] && y <= data.y_bounds[1]);
            }
        }
    }
}
