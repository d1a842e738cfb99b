use clap::Parser;
use color_eyre::Result;
use firecast_tui::api::ForecastClient;
use firecast_tui::app::{App, AppActions};
use firecast_tui::cli::CliArgs;
use firecast_tui::config::AppConfig;
use firecast_tui::logging::{self, LogTarget};
use firecast_tui::{event, terminal};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = AppConfig::load();

    let headless = args.headless || args.json || !is_terminal();
    let target = if headless {
        LogTarget::Stderr
    } else {
        LogTarget::File(&config.log_file)
    };
    logging::init(target, config.debug)?;
    for warning in &config.warnings {
        tracing::warn!("{warning}");
    }

    let client = ForecastClient::new(&config.api_url, config.http_timeout)?;
    tracing::info!(
        api_url = client.base_url(),
        start = %config.date_range.start(),
        end = %config.date_range.end(),
        headless,
        "starting firecast"
    );

    if headless {
        return event::run_headless(&client, config.date_range, args.prime, args.json).await;
    }

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut app = App::new(&config, AppActions::new(client, events_tx));

    // Setup terminal
    let mut terminal = terminal::setup_terminal()?;

    let result = event::run(&mut terminal, &mut app, events_rx).await;

    // Restore terminal
    terminal::cleanup_terminal_state(true, true);

    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
