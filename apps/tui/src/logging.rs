use color_eyre::eyre::{Result, WrapErr};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where log lines go. The dashboard owns the screen, so it logs to a file.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
}

/// `RUST_LOG` wins over `debug`, which wins over the `info` default.
pub fn filter(debug: bool) -> EnvFilter {
    let default_level = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

pub fn init(target: LogTarget<'_>, debug: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(debug));

    match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("Failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| color_eyre::eyre::eyre!("Failed to install logger: {e}"))?;
        }
        LogTarget::Stderr => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| color_eyre::eyre::eyre!("Failed to install logger: {e}"))?;
        }
    }

    Ok(())
}
