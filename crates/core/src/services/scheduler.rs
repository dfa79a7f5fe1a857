use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::errors::CoreError;
use crate::models::settings::RefreshInterval;
use crate::services::refresh_service::RefreshEvent;

/// Periodic refresh timer.
///
/// At most one timer runs at a time. Rescheduling or cancelling aborts the
/// previous one, so a pending tick never fires after a change.
pub struct RefreshScheduler {
    events: UnboundedSender<RefreshEvent>,
    task: Option<JoinHandle<()>>,
    interval: RefreshInterval,
}

impl RefreshScheduler {
    pub fn new(events: UnboundedSender<RefreshEvent>) -> Self {
        Self {
            events,
            task: None,
            interval: RefreshInterval::Manual,
        }
    }

    /// Replace the running timer. `Manual` simply cancels it.
    /// The first tick fires one full period from now.
    pub fn schedule(&mut self, interval: RefreshInterval) -> Result<(), CoreError> {
        self.cancel();
        self.interval = interval;
        let Some(period) = interval.period() else {
            return Ok(());
        };
        let runtime = Handle::try_current()
            .map_err(|_| CoreError::Config("refresh schedule needs a tokio runtime".into()))?;

        debug!(%interval, "refresh scheduled");
        let events = self.events.clone();
        self.task = Some(runtime.spawn(async move {
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                if events.send(RefreshEvent::Tick).is_err() {
                    break;
                }
            }
        }));
        Ok(())
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("refresh schedule cancelled");
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Interval of the most recent `schedule` call.
    pub fn interval(&self) -> RefreshInterval {
        self.interval
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
