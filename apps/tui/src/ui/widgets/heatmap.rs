use crate::app::App;
use crate::domain::ClusterBoundaries;
use crate::map::{DensityGrid, HeatmapStyle, Viewport, HEATMAP_STYLE};
use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Widget};
use ratatui::Frame;

/// Paints cell backgrounds from a density grid.
pub struct HeatLayer<'a> {
    grid: &'a DensityGrid,
    style: &'a HeatmapStyle,
    zoom: f64,
}

impl<'a> HeatLayer<'a> {
    pub const fn new(grid: &'a DensityGrid, style: &'a HeatmapStyle, zoom: f64) -> Self {
        Self { grid, style, zoom }
    }
}

impl Widget for HeatLayer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let opacity = self.style.opacity.eval(self.zoom);
        let cols = area.width.min(self.grid.cols());
        let rows = area.height.min(self.grid.rows());

        for row in 0..rows {
            for col in 0..cols {
                let density = self.grid.get(col, row);
                if density <= 0.0 {
                    continue;
                }
                let color = self.style.color.eval(density).over_black(opacity);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_bg(color);
                }
            }
        }
    }
}

pub fn render_map_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    let window = app.window();
    let active = window.filter(&app.snapshot.features).count();

    let block = Block::default()
        .title(format!(
            " Charlotte, NC Map | zoom {:.1} | {active} active points ",
            app.map.viewport.zoom
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    // Canvas resets cell backgrounds, so it goes first
    if let Some(boundaries) = app.map.visible_boundaries() {
        render_boundaries(f, inner, &app.map.viewport, boundaries);
    }

    let grid = app.map.density(
        &app.snapshot.features,
        window,
        inner.width,
        inner.height,
        &HEATMAP_STYLE,
    );
    f.render_widget(HeatLayer::new(&grid, &HEATMAP_STYLE, app.map.viewport.zoom), inner);
}

fn render_boundaries(f: &mut Frame<'_>, area: Rect, viewport: &Viewport, boundaries: &ClusterBoundaries) {
    let width = f64::from(area.width);
    let height = f64::from(area.height);
    // Canvas y grows upwards, cell rows grow downwards
    let project = |(lon, lat): (f64, f64)| {
        let (col, row) = viewport.to_cell(lon, lat, area.width, area.height);
        (col, height - row)
    };

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for cluster in &boundaries.clusters {
                let points: Vec<(f64, f64)> = cluster.outline.iter().copied().map(project).collect();
                for pair in points.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: pair[0].0,
                        y1: pair[0].1,
                        x2: pair[1].0,
                        y2: pair[1].1,
                        color: Color::DarkGray,
                    });
                }
                if let (Some(first), Some(last)) = (points.first(), points.last()) {
                    if first != last {
                        ctx.draw(&CanvasLine {
                            x1: last.0,
                            y1: last.1,
                            x2: first.0,
                            y2: first.1,
                            color: Color::DarkGray,
                        });
                    }
                }
                if let Some((x, y)) = centroid(&points) {
                    if (0.0..width).contains(&x) && (0.0..height).contains(&y) {
                        ctx.print(x, y, cluster.cluster_id.to_string());
                    }
                }
            }
        });

    f.render_widget(canvas, area);
}

#[allow(clippy::cast_precision_loss)]
fn centroid(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
    Some((sx / n, sy / n))
}
