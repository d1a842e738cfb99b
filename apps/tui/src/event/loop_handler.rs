use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::api::{DateRange, ForecastClient};
use crate::app::{handle_input, App};
use crate::domain::FeatureCollection;
use crate::event::AppEvent;
use crate::forecast::aggregate::{format_percentage, format_volume, ClusterShare};
use crate::forecast::{display_time, time_range, ClusterAggregate};
use crate::poller::Poller;
use crate::ui;

/// Fetch once and print the cluster table, or JSON with `json`.
pub async fn run_headless(
    client: &ForecastClient,
    range: DateRange,
    prime: bool,
    json: bool,
) -> Result<()> {
    if prime {
        prime_backend(client).await;
    }

    let collection = client.heatmap(&range).await?;
    let report = HeadlessReport::new(client.base_url(), range, &collection);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(())
}

/// Predictions must exist before the fetch, so train and predict run in order
/// here. Failures are logged and the fetch still happens.
async fn prime_backend(client: &ForecastClient) {
    match client.train().await {
        Ok(body) => tracing::info!(%body, "train finished"),
        Err(e) => tracing::warn!(error = %e, "train failed"),
    }
    match client.predict().await {
        Ok(body) => tracing::info!(%body, "predict finished"),
        Err(e) => tracing::warn!(error = %e, "predict failed"),
    }
}

#[derive(serde::Serialize)]
struct HeadlessReport {
    api_url: String,
    start_date: String,
    end_date: String,
    features: usize,
    first_time: Option<String>,
    last_time: Option<String>,
    total_volume: f64,
    /// NaN percentages serialize as null
    clusters: Vec<ClusterShare>,
}

impl HeadlessReport {
    fn new(api_url: &str, range: DateRange, collection: &FeatureCollection) -> Self {
        let aggregate = ClusterAggregate::from_features(&collection.features);
        let (first_time, last_time) = if collection.is_empty() {
            (None, None)
        } else {
            let bounds = time_range(&collection.features);
            (display_time(bounds.min), display_time(bounds.max))
        };

        Self {
            api_url: api_url.to_string(),
            start_date: range.start().to_string(),
            end_date: range.end().to_string(),
            features: collection.len(),
            first_time,
            last_time,
            total_volume: aggregate.total(),
            clusters: aggregate.shares().collect(),
        }
    }

    fn render_text(&self) -> String {
        let times = match (&self.first_time, &self.last_time) {
            (Some(first), Some(last)) => format!("{first} to {last}"),
            _ => "no time data".to_string(),
        };
        let mut out = format!(
            "\nFirecast Forecast\n=================\nBackend: {}\nDates: {} to {}\nForecast points: {}\nTimes: {times}\n\n",
            self.api_url, self.start_date, self.end_date, self.features
        );

        out.push_str(&table_row("Cluster", "Volume", "Percentage"));
        for share in &self.clusters {
            out.push_str(&table_row(
                &share.cluster_id.to_string(),
                &format_volume(share.volume),
                &format_percentage(share.percentage),
            ));
        }
        out.push_str(&table_row("Total", &format_volume(self.total_volume), "100%"));
        out
    }
}

fn table_row(cluster: &str, volume: &str, percentage: &str) -> String {
    format!("{cluster:<12} {volume:>14} {percentage:>12}\n")
}

/// Run the dashboard loop until the user quits.
pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    mut events: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    let mut poller = Poller::new(app.actions.poll_callback(), Some(app.polling.delay()));
    app.start();

    loop {
        while let Ok(event) = events.try_recv() {
            app.handle_event(event);
        }

        // No-op unless the confirmed interval changed
        poller.set_delay(Some(app.polling.delay()));

        app.update();

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key.code);
                    if !app.running {
                        break;
                    }
                }
                // Resizes are picked up by the next draw
                Ok(_) | Err(_) => {}
            }
        }

        tokio::task::yield_now().await;
    }

    tracing::info!("dashboard closed");
    Ok(())
}
