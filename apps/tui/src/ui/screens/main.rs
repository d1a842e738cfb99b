use crate::app::{App, FetchStatus};
use crate::forecast::display_time;
use crate::map::style::LEGEND;
use crate::ui::widgets::charts::{render_chart_panel, render_chart_tabs};
use crate::ui::widgets::heatmap::render_map_panel;
use crate::ui::widgets::popup::centered_rect;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, LineGauge, Paragraph, Wrap};
use ratatui::Frame;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn render_main(app: &App, f: &mut Frame<'_>) {
    let main_layout = build_main_layout(f);

    render_title_section(f, main_layout[0]);
    render_content_section(app, f, main_layout[1]);
    render_status_section(app, f, main_layout[2]);
    render_shortcuts(f, main_layout[3]);

    if app.show_help {
        render_help_popup(f, f.area());
    }
}

fn build_main_layout(f: &Frame<'_>) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title and legend
            Constraint::Min(10),   // Map and side panel
            Constraint::Length(3), // Status area
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(f.area().inner(Margin::new(1, 0)))
        .to_vec()
}

fn key_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn render_title_section(f: &mut Frame<'_>, area: Rect) {
    let title_block = Block::default()
        .title("== Firecast ==")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = title_block.inner(area);
    f.render_widget(title_block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(inner);

    let title = Paragraph::new(Text::from(vec![
        TextLine::from(vec![
            Span::styled(
                "Firecast ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "Demand Forecast",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        TextLine::from(Span::styled(
            "Forecast emergency call volume by area",
            Style::default().fg(Color::Gray),
        )),
    ]));
    f.render_widget(title, chunks[0]);

    f.render_widget(
        Paragraph::new(legend_line()).alignment(Alignment::Right),
        chunks[1],
    );
}

fn legend_line() -> TextLine<'static> {
    let mut spans = vec![Span::styled("Demand ", Style::default().fg(Color::Gray))];
    for (color, label) in LEGEND {
        if !label.is_empty() {
            spans.push(Span::styled(format!("{label} "), Style::default().fg(Color::Gray)));
        }
        spans.push(Span::styled("██ ", Style::default().fg(color)));
    }
    TextLine::from(spans)
}

fn render_content_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    render_map_panel(app, f, columns[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Length(1),
            Constraint::Min(5),
        ])
        .split(columns[1]);

    render_forecast_controls(app, f, side[0]);
    render_chart_tabs(app, f, side[1].inner(Margin::new(1, 0)));
    render_chart_panel(app, f, side[2]);
}

/// Slider position in `[0, 1]`; zero for a single-instant range.
#[allow(clippy::cast_precision_loss)]
pub fn slider_ratio(app: &App) -> f64 {
    let range = app.time_range;
    if range.is_degenerate() {
        return 0.0;
    }
    let offset = app.current_time.saturating_sub(range.min) as f64;
    let span = range.max.saturating_sub(range.min) as f64;
    (offset / span).clamp(0.0, 1.0)
}

fn render_forecast_controls(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Forecast ")
        .title_style(Style::default().fg(Color::Green))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1); 6])
        .split(inner);

    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let shown = if app.snapshot.is_empty() {
        None
    } else {
        display_time(app.current_time)
    };
    f.render_widget(
        Paragraph::new(TextLine::from(vec![
            Span::styled("Displaying forecast for: ", label),
            Span::styled(shown.unwrap_or_else(|| "no time data".to_string()), value),
        ])),
        rows[0],
    );

    f.render_widget(
        LineGauge::default()
            .filled_style(Style::default().fg(Color::Yellow))
            .unfilled_style(Style::default().fg(Color::DarkGray))
            .label("")
            .ratio(slider_ratio(app)),
        rows[1],
    );

    let ends = if app.snapshot.is_empty() {
        String::new()
    } else {
        format!(
            "{} .. {}",
            display_time(app.time_range.min).unwrap_or_default(),
            display_time(app.time_range.max).unwrap_or_default()
        )
    };
    f.render_widget(Paragraph::new(Span::styled(ends, label)), rows[2]);

    f.render_widget(
        Paragraph::new(TextLine::from(vec![
            Span::styled("Dates: ", label),
            Span::styled(
                format!("{} to {}", app.date_range.start(), app.date_range.end()),
                value,
            ),
        ])),
        rows[3],
    );

    f.render_widget(
        Paragraph::new(TextLine::from(vec![
            Span::styled("Refresh every ", label),
            Span::styled(format!("{} min", app.polling.confirmed_minutes()), value),
            Span::styled(" (Minimum time is 1 minute)", label),
        ])),
        rows[4],
    );

    let interval_line = if app.polling.is_editing() {
        let cursor = if (app.animation_counter / 10) % 2 == 0 { "_" } else { " " };
        TextLine::from(vec![
            Span::styled("New interval: ", Style::default().fg(Color::Green)),
            Span::styled(format!("{}{cursor}", app.polling.staged()), value),
            Span::styled(" min  ", label),
            Span::styled("Enter", key_style()),
            Span::styled(" confirm ", label),
            Span::styled("Esc", key_style()),
            Span::styled(" cancel", label),
        ])
    } else {
        TextLine::from(vec![
            Span::styled("Press ", label),
            Span::styled("i", key_style()),
            Span::styled(" to change the interval", label),
        ])
    };
    f.render_widget(Paragraph::new(interval_line), rows[5]);
}

const fn status_color(status: FetchStatus) -> Color {
    match status {
        FetchStatus::Idle => Color::Gray,
        FetchStatus::Loading => Color::Yellow,
        FetchStatus::Loaded => Color::Green,
        FetchStatus::Failed => Color::Red,
    }
}

fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Status ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let mut state = app.fetch_status.to_string();
    if app.fetch_status == FetchStatus::Loading {
        state = format!("{state} {}", SPINNER[(app.animation_counter / 3) % SPINNER.len()]);
    }

    let updated = app
        .last_updated
        .map_or_else(|| "never".to_string(), |time| time.format("%H:%M:%S").to_string());

    let mut spans = vec![
        Span::styled(
            format!("[{state}]"),
            Style::default()
                .fg(status_color(app.fetch_status))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" Updated {updated} | "), Style::default().fg(Color::Gray)),
        Span::styled(app.status_message.clone(), Style::default().fg(Color::White)),
    ];
    if let Some(error) = &app.last_error {
        spans.push(Span::styled(" | Error: ", Style::default().fg(Color::Red)));
        spans.push(Span::styled(error.clone(), Style::default().fg(Color::Red)));
    }

    f.render_widget(Paragraph::new(TextLine::from(spans)).block(block), area);
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let gray = Style::default().fg(Color::Gray);
    let shortcuts = [
        ("F1", "Help"),
        ("←/→", "Day"),
        ("+/-", "Zoom"),
        ("hjkl", "Pan"),
        ("r", "Refresh"),
        ("i", "Interval"),
        ("Tab", "Table/Chart"),
        ("b", "Boundaries"),
        ("q", "Quit"),
    ];

    let mut spans = Vec::with_capacity(shortcuts.len() * 2);
    for (i, (key, action)) in shortcuts.iter().enumerate() {
        spans.push(Span::styled(*key, key_style()));
        let separator = if i + 1 == shortcuts.len() { "" } else { " | " };
        spans.push(Span::styled(format!(": {action}{separator}"), gray));
    }

    f.render_widget(Paragraph::new(TextLine::from(spans)), area);
}

fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(80, 80, area);
    f.render_widget(Clear, popup_area);

    let help_block = Block::default()
        .title("== Help & Keyboard Shortcuts ==")
        .title_style(key_style())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let help_paragraph = Paragraph::new(Text::from(build_help_lines()))
        .block(help_block)
        .wrap(Wrap { trim: true });

    f.render_widget(help_paragraph, popup_area);

    let hint = Paragraph::new(Span::styled(
        "Press F1 or Esc to close",
        Style::default().fg(Color::Gray),
    ))
    .alignment(Alignment::Center);

    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(2),
        width: popup_area.width,
        height: 1,
    };

    f.render_widget(hint, hint_area);
}

fn help_entry(key: &'static str, text: &'static str) -> TextLine<'static> {
    TextLine::from(vec![
        Span::styled(format!("  {key}"), key_style()),
        Span::raw(format!(" - {text}")),
    ])
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    let mut lines = vec![
        TextLine::from(Span::styled(
            "Firecast Demand Forecast",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        TextLine::from(
            "The map shows forecast call volume for the 24 hours starting at the selected time. \
             The side panel sums volume per cluster over the whole date range.",
        ),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Keyboard Shortcuts:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        help_entry("←/→", "Move the forecast window one day"),
        help_entry("Home/End", "Jump to the first or last forecast time"),
        help_entry("+/-", "Zoom the map in or out"),
        help_entry("h/j/k/l", "Pan the map"),
        help_entry("0", "Reset the map view"),
        help_entry("↑/↓", "Select a cluster row"),
        help_entry("Tab", "Switch between table and chart"),
        help_entry("b", "Show or hide cluster boundaries"),
        help_entry("r", "Refresh now"),
        help_entry("i", "Edit the refresh interval (Enter confirms, Esc cancels)"),
        help_entry("q", "Quit"),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "CLI Options:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    let help_text = crate::cli::CliArgs::help_text();
    for line in help_text.lines() {
        if line.starts_with("Usage") || line.starts_with("Options") || line.trim().is_empty() {
            continue;
        }
        lines.push(TextLine::from(line.to_string()));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::tests::{feature, test_app};
    use crate::domain::FeatureCollection;
    use crate::forecast::DAY_MS;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(app: &App) -> Result<String, Box<dyn std::error::Error>> {
        let mut terminal = Terminal::new(TestBackend::new(140, 40))?;
        terminal.draw(|f| render_main(app, f))?;
        Ok(terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect())
    }

    #[test]
    fn empty_dashboard_reports_no_time_data() -> Result<(), Box<dyn std::error::Error>> {
        let (app, _rx) = test_app();
        let text = screen_text(&app)?;
        assert!(text.contains("no time data"));
        assert!(text.contains("No forecast data"));
        assert!(text.contains("Minimum time is 1 minute"));
        Ok(())
    }

    #[test]
    fn loaded_dashboard_shows_table_with_total() -> Result<(), Box<dyn std::error::Error>> {
        let (mut app, _rx) = test_app();
        app.apply_snapshot(FeatureCollection {
            features: vec![feature(0, 10.0, 1), feature(0, 5.0, 1), feature(DAY_MS, 5.0, 2)],
        });
        let text = screen_text(&app)?;
        assert!(text.contains("75.00%"));
        assert!(text.contains("25.00%"));
        assert!(text.contains("Total"));
        assert!(text.contains("100%"));
        Ok(())
    }

    #[test]
    fn help_popup_lists_cli_options() -> Result<(), Box<dyn std::error::Error>> {
        let (mut app, _rx) = test_app();
        app.show_help = true;
        let text = screen_text(&app)?;
        assert!(text.contains("Keyboard Shortcuts"));
        Ok(())
    }

    #[test]
    fn slider_tracks_position_in_range() {
        let (mut app, _rx) = test_app();
        assert_eq!(slider_ratio(&app), 0.0);
        app.apply_snapshot(FeatureCollection {
            features: vec![feature(0, 1.0, 1), feature(4 * DAY_MS, 1.0, 1)],
        });
        app.current_time = DAY_MS;
        assert!((slider_ratio(&app) - 0.25).abs() < 1e-12);
    }
}
