// App module for firecast
// Handles dashboard state and key handling

pub mod actions;
pub mod input;
pub mod state;

pub use actions::AppActions;
pub use input::handle_input;
pub use state::{App, FetchStatus, PollingConfig};
