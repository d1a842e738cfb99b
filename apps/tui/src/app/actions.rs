use crate::api::{DateRange, ForecastClient};
use crate::event::{AppEvent, PrimeStep};
use tokio::sync::mpsc::UnboundedSender;

/// Spawns backend requests and reports their results as [`AppEvent`]s.
#[derive(Debug, Clone)]
pub struct AppActions {
    client: ForecastClient,
    events: UnboundedSender<AppEvent>,
}

impl AppActions {
    pub const fn new(client: ForecastClient, events: UnboundedSender<AppEvent>) -> Self {
        Self { client, events }
    }

    pub const fn client(&self) -> &ForecastClient {
        &self.client
    }

    /// Requests are never cancelled or coalesced; whichever finishes last wins.
    pub fn spawn_fetch(&self, range: DateRange) {
        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.heatmap(&range).await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "heatmap fetch failed");
            }
            send(&events, AppEvent::HeatmapLoaded(result));
        });
    }

    /// Fires train and predict independently; neither waits for the other.
    pub fn spawn_prime(&self) {
        for step in [PrimeStep::Train, PrimeStep::Predict] {
            let client = self.client.clone();
            let events = self.events.clone();
            tokio::spawn(async move {
                let result = match step {
                    PrimeStep::Train => client.train().await,
                    PrimeStep::Predict => client.predict().await,
                };
                send(&events, AppEvent::Primed { step, result });
            });
        }
    }

    pub fn spawn_boundaries(&self) {
        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.boundaries().await;
            send(&events, AppEvent::BoundariesLoaded(result));
        });
    }

    /// Poller callback that asks the loop for a refresh.
    pub fn poll_callback(&self) -> impl FnMut() + Send + 'static {
        let events = self.events.clone();
        move || send(&events, AppEvent::PollTick)
    }
}

fn send(events: &UnboundedSender<AppEvent>, event: AppEvent) {
    if events.send(event).is_err() {
        tracing::debug!("event loop closed, dropping event");
    }
}
