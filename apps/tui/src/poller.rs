//! Interval timer whose callback can be swapped without restarting it.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

type Callback = Box<dyn FnMut() + Send + 'static>;

/// Calls the latest callback every `delay`. A `None` delay stops the timer.
///
/// The timer task reads the callback through a shared cell on every tick, so
/// [`Poller::set_callback`] takes effect on the next tick without resetting
/// the schedule. Dropping the poller aborts the timer task.
pub struct Poller {
    /// Empty while the timer task is running the callback
    callback: Arc<Mutex<Option<Callback>>>,
    delay: Option<Duration>,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    /// Must be called inside a tokio runtime when `delay` is `Some`.
    pub fn new<F>(callback: F, delay: Option<Duration>) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let mut poller = Self {
            callback: Arc::new(Mutex::new(Some(Box::new(callback)))),
            delay: None,
            task: None,
        };
        poller.set_delay(delay);
        poller
    }

    /// Safe to call from inside the running callback; the replacement is kept.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        let mut slot = self
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Box::new(callback));
    }

    /// Restarts the timer only when the delay actually changes.
    pub fn set_delay(&mut self, delay: Option<Duration>) {
        if delay == self.delay && (delay.is_none() || self.task.is_some()) {
            return;
        }

        self.stop();
        self.delay = delay;

        if let Some(delay) = delay {
            // A zero period is not a valid interval; fire as fast as the runtime allows
            let period = delay.max(Duration::from_millis(1));
            let callback = Arc::clone(&self.callback);
            self.task = Some(tokio::spawn(async move {
                let mut ticker = time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    // The lock is released before calling so the callback may swap itself
                    let taken = callback.lock().unwrap_or_else(PoisonError::into_inner).take();
                    if let Some(mut tick) = taken {
                        tick();
                        let mut slot = callback.lock().unwrap_or_else(PoisonError::into_inner);
                        if slot.is_none() {
                            *slot = Some(tick);
                        }
                    }
                }
            }));
            tracing::debug!(period_ms = period.as_millis(), "poller started");
        } else {
            tracing::debug!("poller disabled");
        }
    }

    pub const fn delay(&self) -> Option<Duration> {
        self.delay
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("delay", &self.delay)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
