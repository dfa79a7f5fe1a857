use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::quote::QuoteUpdate;
use crate::services::quote_service::QuoteService;

/// Messages delivered to the owner of the quote cache.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshEvent {
    /// One ticker resolved (or gave up)
    Quote(QuoteUpdate),
    /// Every ticker of a cycle has been reported
    CycleFinished { generation: u64 },
    /// The periodic schedule fired
    Tick,
}

/// Runs refresh cycles and reports results over a channel.
///
/// Workers never touch the cache; they only send `RefreshEvent`s. The
/// receiver applies them one entry at a time.
#[derive(Clone)]
pub struct RefreshService {
    quotes: Arc<QuoteService>,
    events: UnboundedSender<RefreshEvent>,
}

impl RefreshService {
    pub fn new(quotes: Arc<QuoteService>, events: UnboundedSender<RefreshEvent>) -> Self {
        Self { quotes, events }
    }

    /// Start a cycle on the current tokio runtime. The task is detached;
    /// its results are ignored by the cache if a newer cycle supersedes it.
    pub fn spawn_cycle(
        &self,
        tickers: Vec<String>,
        generation: u64,
    ) -> Result<JoinHandle<usize>, CoreError> {
        let runtime = Handle::try_current()
            .map_err(|_| CoreError::Config("background refresh needs a tokio runtime".into()))?;
        let worker = self.clone();
        Ok(runtime.spawn(async move { worker.run_cycle(&tickers, generation).await }))
    }

    /// Fetch every ticker in turn, sending each result as soon as it lands.
    /// Returns how many results were delivered.
    pub async fn run_cycle(&self, tickers: &[String], generation: u64) -> usize {
        debug!(generation, count = tickers.len(), "refresh cycle started");
        let mut delivered = 0;
        for ticker in tickers {
            let quote = self.quotes.fetch_quote(ticker).await;
            let update = QuoteUpdate {
                ticker: ticker.clone(),
                quote,
                generation,
            };
            if self.events.send(RefreshEvent::Quote(update)).is_err() {
                // Receiver dropped: nobody is listening any more.
                return delivered;
            }
            delivered += 1;
        }
        let _ = self.events.send(RefreshEvent::CycleFinished { generation });
        debug!(generation, delivered, "refresh cycle finished");
        delivered
    }
}
