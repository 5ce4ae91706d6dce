//! Plotters-powered line chart widget for Ratatui.
//!
//! Plotters output is rendered into the Ratatui buffer through
//! `plotters-ratatui-backend`, which gives proper axes and line rasterization
//! without hand-rolled canvas code.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One polyline in chart coordinates.
#[derive(Debug, Clone)]
pub struct ChartLine {
    pub label: String,
    pub color: RGBColor,
    pub points: Vec<(f64, f64)>,
}

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call, so `render()`
/// only draws.
pub struct LinePlottersChart<'a> {
    pub lines: &'a [ChartLine],
    /// Horizontal reference levels (e.g. RSI 30/70).
    pub guides: &'a [f64],
    /// X bounds (row index).
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl Widget for LinePlottersChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            // Tick labels are drawn by the caller around the chart rect, so
            // Plotters only gets a thin margin and no label areas.
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .axis_style(WHITE)
                .draw()?;

            let guide_color = RGBColor(110, 110, 110);
            for &level in self.guides {
                chart.draw_series(LineSeries::new([(x0, level), (x1, level)], guide_color))?;
            }

            for line in self.lines {
                chart.draw_series(LineSeries::new(line.points.iter().copied(), line.color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
