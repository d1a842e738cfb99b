use crate::app::App;
use crate::forecast::aggregate::{format_percentage, format_volume};
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

pub const fn scroll_offset(
    total_rows: usize,
    max_visible_rows: usize,
    selected_index: usize,
) -> usize {
    if total_rows <= max_visible_rows {
        return 0;
    }

    if selected_index >= max_visible_rows {
        return selected_index.saturating_sub(max_visible_rows) + 1;
    }

    0
}

/// Cluster, volume and percentage cells, in cluster order.
pub fn cluster_rows(app: &App) -> Vec<[String; 3]> {
    app.aggregate
        .shares()
        .map(|share| {
            [
                share.cluster_id.to_string(),
                format_volume(share.volume),
                format_percentage(share.percentage),
            ]
        })
        .collect()
}

pub fn render_cluster_table(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Cluster Volumes ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    if app.aggregate.is_empty() {
        let paragraph = Paragraph::new("No forecast data")
            .block(block)
            .alignment(ratatui::layout::Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Cluster"),
        Cell::from("Volume"),
        Cell::from("Percentage"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows = cluster_rows(app);
    // Borders, header and total row
    let max_visible_rows = area.height.saturating_sub(4) as usize;
    let offset = scroll_offset(rows.len(), max_visible_rows, app.selected_cluster_index);

    let mut table_rows: Vec<Row<'_>> = rows
        .into_iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(i, cells)| {
            let style = if i == app.selected_cluster_index {
                Style::default()
                    .bg(Color::Rgb(0, 0, 238))
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(cells.map(Cell::from)).style(style)
        })
        .collect();

    table_rows.push(
        Row::new(vec![
            Cell::from("Total"),
            Cell::from(format_volume(app.aggregate.total())),
            Cell::from("100%"),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    );

    let widths = [
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Min(10),
    ];

    let table = Table::new(table_rows, widths).header(header).block(block);
    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_keeps_selection_visible() {
        assert_eq!(scroll_offset(5, 10, 4), 0);
        assert_eq!(scroll_offset(20, 5, 2), 0);
        assert_eq!(scroll_offset(20, 5, 7), 3);
    }
}
