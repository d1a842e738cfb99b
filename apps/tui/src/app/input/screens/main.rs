use crate::app::state::App;
use crossterm::event::KeyCode;

/// Cells moved per pan key press.
const PAN_COLS: f64 = 4.0;
const PAN_ROWS: f64 = 2.0;

pub fn handle_main_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('q') => {
            app.running = false;
        }
        KeyCode::Left => app.scrub(-1),
        KeyCode::Right => app.scrub(1),
        KeyCode::Home => app.jump_to_start(),
        KeyCode::End => app.jump_to_end(),
        KeyCode::Up => app.select_previous_cluster(),
        KeyCode::Down => app.select_next_cluster(),
        KeyCode::Tab => app.next_chart_tab(),
        KeyCode::Char('+' | '=') => app.map.viewport.zoom_in(),
        KeyCode::Char('-') => app.map.viewport.zoom_out(),
        KeyCode::Char('0') => app.map.viewport.reset(),
        KeyCode::Char('h') => app.map.viewport.pan(-PAN_COLS, 0.0),
        KeyCode::Char('l') => app.map.viewport.pan(PAN_COLS, 0.0),
        KeyCode::Char('k') => app.map.viewport.pan(0.0, -PAN_ROWS),
        KeyCode::Char('j') => app.map.viewport.pan(0.0, PAN_ROWS),
        KeyCode::Char('b') => {
            app.map.toggle_boundaries();
            app.status_message = if app.map.show_boundaries {
                "Cluster boundaries shown".to_string()
            } else {
                "Cluster boundaries hidden".to_string()
            };
        }
        KeyCode::Char('i') => {
            app.polling.begin_edit();
            app.status_message = "Type minutes, Enter to confirm, Esc to cancel".to_string();
        }
        KeyCode::Char('r') => {
            tracing::info!("manual refresh");
            app.refresh();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::tests::{feature, test_app};
    use crate::app::FetchStatus;
    use crate::domain::FeatureCollection;
    use crate::forecast::DAY_MS;
    use crate::map::viewport::DEFAULT_ZOOM;

    #[test]
    fn arrows_scrub_by_day_and_home_end_jump() {
        let (mut app, _rx) = test_app();
        app.apply_snapshot(FeatureCollection {
            features: vec![feature(0, 1.0, 1), feature(5 * DAY_MS, 1.0, 2)],
        });
        handle_main_input(&mut app, KeyCode::Home);
        handle_main_input(&mut app, KeyCode::Right);
        handle_main_input(&mut app, KeyCode::Right);
        assert_eq!(app.current_time, 2 * DAY_MS);
        handle_main_input(&mut app, KeyCode::Left);
        assert_eq!(app.current_time, DAY_MS);
        handle_main_input(&mut app, KeyCode::End);
        assert_eq!(app.current_time, 5 * DAY_MS);
    }

    #[test]
    fn zoom_keys_step_by_half_levels() {
        let (mut app, _rx) = test_app();
        handle_main_input(&mut app, KeyCode::Char('+'));
        assert!((app.map.viewport.zoom - (DEFAULT_ZOOM + 0.5)).abs() < 1e-9);
        handle_main_input(&mut app, KeyCode::Char('-'));
        handle_main_input(&mut app, KeyCode::Char('-'));
        assert!((app.map.viewport.zoom - (DEFAULT_ZOOM - 0.5)).abs() < 1e-9);
        handle_main_input(&mut app, KeyCode::Char('0'));
        assert!((app.map.viewport.zoom - DEFAULT_ZOOM).abs() < 1e-9);
    }

    #[test]
    fn table_selection_wraps_and_tab_switches_view() {
        let (mut app, _rx) = test_app();
        app.apply_snapshot(FeatureCollection {
            features: vec![feature(0, 1.0, 1), feature(0, 1.0, 2)],
        });
        handle_main_input(&mut app, KeyCode::Up);
        assert_eq!(app.selected_cluster_index, 1);
        handle_main_input(&mut app, KeyCode::Down);
        assert_eq!(app.selected_cluster_index, 0);

        handle_main_input(&mut app, KeyCode::Tab);
        assert_eq!(app.chart_tab_index, 1);
        handle_main_input(&mut app, KeyCode::Tab);
        assert_eq!(app.chart_tab_index, 0);
    }

    #[test]
    fn b_toggles_boundaries() {
        let (mut app, _rx) = test_app();
        assert!(app.map.show_boundaries);
        handle_main_input(&mut app, KeyCode::Char('b'));
        assert!(!app.map.show_boundaries);
    }

    #[tokio::test]
    async fn r_starts_a_fetch() {
        let (mut app, _rx) = test_app();
        handle_main_input(&mut app, KeyCode::Char('r'));
        assert_eq!(app.fetch_status, FetchStatus::Loading);
        assert_eq!(app.in_flight, 1);
    }
}
