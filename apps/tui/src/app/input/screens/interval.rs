use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_interval_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char(ch) => app.polling.push_digit(ch),
        KeyCode::Backspace => app.polling.pop_digit(),
        KeyCode::Enter => app.confirm_interval(),
        KeyCode::Esc => {
            app.polling.cancel();
            app.status_message = "Interval unchanged".to_string();
        }
        _ => {}
    }
}
