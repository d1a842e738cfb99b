use crate::app::state::CHART_TABS;
use crate::app::App;
use crate::map::HEATMAP_STYLE;
use crate::ui::widgets::tables::render_cluster_table;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Tabs};
use ratatui::Frame;

pub fn render_chart_tabs(app: &App, f: &mut Frame<'_>, area: Rect) {
    let titles = CHART_TABS
        .iter()
        .map(|title| TextLine::from(*title))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .select(app.chart_tab_index)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Rgb(0, 0, 238))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));

    f.render_widget(tabs, area);
}

pub fn render_chart_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    if app.chart_tab_index == 0 {
        render_cluster_table(app, f, area);
    } else {
        render_cluster_barchart(app, f, area);
    }
}

pub fn render_cluster_barchart(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Volume by Cluster ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.aggregate.is_empty() {
        let paragraph = Paragraph::new("No forecast data")
            .block(block)
            .alignment(ratatui::layout::Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let peak = app
        .aggregate
        .shares()
        .map(|share| share.volume)
        .fold(0.0_f64, f64::max);

    let bars: Vec<Bar<'_>> = app
        .aggregate
        .shares()
        .map(|share| {
            let relative = if peak > 0.0 { share.volume / peak } else { 0.0 };
            Bar::default()
                .value(bar_value(share.volume))
                .label(TextLine::from(share.cluster_id.to_string()))
                .style(Style::default().fg(bar_color(relative)))
                .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .max(bar_value(peak).max(1))
        .bar_gap(1)
        .bar_width(4);

    f.render_widget(chart, area);
}

/// Bars take whole numbers; forecast volumes are rounded.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bar_value(volume: f64) -> u64 {
    volume.max(0.0).round() as u64
}

/// Same ramp as the map, so the busiest cluster reads as the hottest.
fn bar_color(relative: f64) -> Color {
    HEATMAP_STYLE.color.eval(relative.max(0.2)).over_black(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_values_round_and_floor_at_zero() {
        assert_eq!(bar_value(2.5), 3);
        assert_eq!(bar_value(-1.0), 0);
        assert_eq!(bar_value(14.2), 14);
    }

    #[test]
    fn busiest_bar_uses_hottest_colour() {
        assert_eq!(bar_color(1.0), Color::Rgb(178, 24, 43));
        assert_eq!(bar_color(0.0), Color::Rgb(103, 169, 207));
    }
}
