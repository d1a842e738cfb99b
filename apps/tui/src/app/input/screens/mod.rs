use crate::app::state::App;
use crossterm::event::KeyCode;

mod help;
mod interval;
mod main;

pub fn dispatch_input(app: &mut App, key: KeyCode) {
    if help::handle_help_toggle(app, key) {
        return;
    }

    if app.polling.is_editing() {
        interval::handle_interval_input(app, key);
        return;
    }

    main::handle_main_input(app, key);
}
