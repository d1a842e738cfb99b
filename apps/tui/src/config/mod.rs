// Config module for firecast
// Resolves runtime settings from the environment and .env

mod settings;

pub use settings::{AppConfig, DEFAULT_API_URL, DEFAULT_LOG_FILE, DEFAULT_REFRESH_MINUTES};
