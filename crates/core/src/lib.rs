pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::{DateTime, Datelike, Local, Utc};
use models::{
    position::{Position, PositionField, PositionInput},
    quote::{Quote, QuoteCache},
    settings::{RefreshInterval, Settings},
    sort::{SortColumn, SortDirection, SortState},
    valuation::PositionRow,
};
use providers::registry::QuoteProviderRegistry;
use services::{
    market_clock::{self, MarketEvent, MarketWatcher},
    position_service::PositionService,
    quote_service::{QuoteService, RetryPolicy},
    refresh_service::{RefreshEvent, RefreshService},
    scheduler::RefreshScheduler,
    sort_service, valuation_service,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use storage::manager::StorageManager;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};
use uuid::Uuid;

use errors::CoreError;

/// Main entry point for the options-monitor core library.
///
/// Owns the position store, the quote cache and the refresh machinery.
/// Every mutation of the store is written back to the data file at once.
/// Refresh workers report over a channel; results only reach the cache
/// when the owner drains it with `apply_quote_updates` or `handle_event`.
#[must_use]
pub struct OptionsMonitor {
    positions: Vec<Position>,
    data_file: PathBuf,
    quotes: QuoteCache,
    sort_state: SortState,
    position_service: PositionService,
    refresh_service: RefreshService,
    scheduler: RefreshScheduler,
    market: MarketWatcher,
    events: UnboundedReceiver<RefreshEvent>,
    /// Last chosen automatic interval; restored when the market opens.
    interval: RefreshInterval,
    next_generation: u64,
    last_updated: Option<DateTime<Local>>,
}

impl std::fmt::Debug for OptionsMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionsMonitor")
            .field("positions", &self.positions.len())
            .field("data_file", &self.data_file)
            .field("cached_quotes", &self.quotes.len())
            .field("interval", &self.interval)
            .field("scheduled", &self.scheduler.is_active())
            .field("last_updated", &self.last_updated)
            .finish()
    }
}

impl OptionsMonitor {
    /// Open the store named in `settings` with the default quote providers.
    pub fn open(settings: &Settings) -> Result<Self, CoreError> {
        let registry = QuoteProviderRegistry::new_with_defaults(&settings.api_keys);
        let policy = RetryPolicy {
            attempts: settings.retry_attempts,
            delay: settings.retry_delay(),
        };
        let mut monitor = Self::with_registry(&settings.data_file, registry, policy)?;
        monitor.interval = settings.interval()?;
        monitor.market = MarketWatcher::new(settings.dev_mode);
        Ok(monitor)
    }

    /// Open a store with an explicit provider registry.
    /// A missing data file yields an empty store.
    pub fn with_registry(
        data_file: impl Into<PathBuf>,
        registry: QuoteProviderRegistry,
        policy: RetryPolicy,
    ) -> Result<Self, CoreError> {
        let data_file = data_file.into();
        let positions = StorageManager::load_from_file(&data_file)?;
        info!(count = positions.len(), file = %data_file.display(), "positions loaded");

        let mut quotes = QuoteCache::new();
        for position in &positions {
            quotes.discover(&position.ticker);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let quote_service = Arc::new(QuoteService::new(registry, policy));

        Ok(Self {
            positions,
            data_file,
            quotes,
            sort_state: SortState::new(),
            position_service: PositionService::new(),
            refresh_service: RefreshService::new(quote_service, tx.clone()),
            scheduler: RefreshScheduler::new(tx),
            market: MarketWatcher::default(),
            events: rx,
            interval: RefreshInterval::Minutes(5),
            next_generation: 1,
            last_updated: None,
        })
    }

    /// Treat the market as always open.
    pub fn set_dev_mode(&mut self, enabled: bool) {
        self.market = MarketWatcher::new(enabled);
    }

    #[must_use]
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    // ── Positions ───────────────────────────────────────────────────

    /// Positions in current display order.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Every position with its valuation against the cached quote.
    #[must_use]
    pub fn rows(&self) -> Vec<PositionRow<'_>> {
        self.positions
            .iter()
            .enumerate()
            .map(|(index, position)| PositionRow {
                index,
                position,
                valuation: valuation_service::value_position(
                    position,
                    self.quotes.get(&position.ticker),
                ),
            })
            .collect()
    }

    /// Id of the position shown at zero-based `index`.
    #[must_use]
    pub fn position_id_at(&self, index: usize) -> Option<Uuid> {
        self.positions.get(index).map(|p| p.id)
    }

    #[must_use]
    pub fn get_position(&self, id: Uuid) -> Option<&Position> {
        self.position_service.get(&self.positions, id)
    }

    /// Validate user input, append it and persist the store.
    pub fn add_position(&mut self, input: &PositionInput) -> Result<Uuid, CoreError> {
        let position = input.parse()?;
        let ticker = position.ticker.clone();
        let id = self
            .position_service
            .add_position(&mut self.positions, position)?;
        self.quotes.discover(&ticker);
        self.save()?;
        Ok(id)
    }

    /// Change one field of one position from raw user text.
    pub fn edit_position(
        &mut self,
        id: Uuid,
        field: PositionField,
        raw: &str,
    ) -> Result<(), CoreError> {
        self.position_service
            .edit_field(&mut self.positions, id, field, raw)?;
        if field == PositionField::Ticker {
            if let Some(position) = self.position_service.get(&self.positions, id) {
                self.quotes.discover(&position.ticker);
            }
        }
        self.save()
    }

    pub fn remove_position(&mut self, id: Uuid) -> Result<Position, CoreError> {
        let removed = self
            .position_service
            .remove_position(&mut self.positions, id)?;
        self.save()?;
        Ok(removed)
    }

    /// Remove a selection of positions. Unknown ids reject the whole call.
    pub fn remove_positions(&mut self, ids: &[Uuid]) -> Result<usize, CoreError> {
        let removed = self
            .position_service
            .remove_positions(&mut self.positions, ids)?;
        self.save()?;
        Ok(removed)
    }

    /// Empty the store and the quote cache. Results of cycles already
    /// running are discarded when they arrive.
    pub fn remove_all(&mut self) -> Result<(), CoreError> {
        self.positions.clear();
        self.quotes.clear(self.next_generation);
        info!("all positions removed");
        self.save()
    }

    /// Write the store to the data file.
    pub fn save(&self) -> Result<(), CoreError> {
        StorageManager::save_to_file(&self.positions, &self.data_file).map_err(|e| {
            warn!(error = %e, file = %self.data_file.display(), "failed to save positions");
            e
        })
    }

    // ── Sorting ─────────────────────────────────────────────────────

    /// Header click: flip `column`'s direction and reorder the store.
    ///
    /// The new order is kept in memory and written by the next save.
    pub fn sort_by(&mut self, column: SortColumn) -> SortDirection {
        let direction = self.sort_state.toggle(column);
        sort_service::sort_positions(
            &mut self.positions,
            column,
            direction,
            &self.quotes,
            Local::now().year(),
        );
        direction
    }

    #[must_use]
    pub fn sort_state(&self) -> &SortState {
        &self.sort_state
    }

    // ── Quotes & Refresh ────────────────────────────────────────────

    #[must_use]
    pub fn quote(&self, ticker: &str) -> Quote {
        self.quotes.get(ticker)
    }

    /// When the last refresh cycle finished.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    /// Distinct tickers to look up: all of them, or only those without a
    /// resolved price.
    #[must_use]
    pub fn tickers_to_fetch(&self, all: bool) -> Vec<String> {
        self.position_service
            .tickers(&self.positions)
            .into_iter()
            .filter(|t| all || self.quotes.is_unresolved(t))
            .collect()
    }

    /// Manual refresh in the background. Re-fetches everything while the
    /// market is open, only unresolved tickers while it is closed.
    /// Returns the cycle's generation, or `None` if there was nothing to do.
    pub fn refresh(&mut self) -> Result<Option<u64>, CoreError> {
        self.refresh_at(Utc::now())
    }

    pub fn refresh_at(&mut self, now: DateTime<Utc>) -> Result<Option<u64>, CoreError> {
        let all = self.market.is_open(&now);
        let tickers = self.tickers_to_fetch(all);
        self.spawn_cycle(tickers)
    }

    /// Background fetch of unresolved tickers only (after load or add).
    pub fn fetch_missing(&mut self) -> Result<Option<u64>, CoreError> {
        let tickers = self.tickers_to_fetch(false);
        self.spawn_cycle(tickers)
    }

    /// Fetch every ticker now and apply the results before returning.
    /// Returns how many cache entries changed.
    pub async fn refresh_now(&mut self) -> usize {
        let tickers = self.tickers_to_fetch(true);
        if tickers.is_empty() {
            return 0;
        }
        let generation = self.bump_generation();
        self.refresh_service.run_cycle(&tickers, generation).await;
        self.apply_quote_updates()
    }

    /// Drain every pending event without waiting.
    /// Returns how many quote updates were applied.
    pub fn apply_quote_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            let is_quote = matches!(event, RefreshEvent::Quote(_));
            if self.handle_event(event) && is_quote {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next event from a refresh worker or the schedule.
    pub async fn next_event(&mut self) -> Option<RefreshEvent> {
        self.events.recv().await
    }

    /// Apply one event. Returns `true` when the table should be redrawn.
    pub fn handle_event(&mut self, event: RefreshEvent) -> bool {
        match event {
            RefreshEvent::Quote(update) => self.quotes.apply(update),
            RefreshEvent::CycleFinished { generation } => {
                if !self.quotes.accepts(generation) {
                    debug!(generation, "ignoring superseded refresh cycle");
                    return false;
                }
                self.last_updated = Some(Local::now());
                true
            }
            RefreshEvent::Tick => {
                self.on_tick(Utc::now());
                false
            }
        }
    }

    fn on_tick(&mut self, now: DateTime<Utc>) {
        if !self.market.is_open(&now) {
            return;
        }
        let tickers = self.tickers_to_fetch(true);
        if let Err(e) = self.spawn_cycle(tickers) {
            warn!(error = %e, "scheduled refresh failed to start");
        }
    }

    fn spawn_cycle(&mut self, tickers: Vec<String>) -> Result<Option<u64>, CoreError> {
        if tickers.is_empty() {
            return Ok(None);
        }
        let generation = self.bump_generation();
        self.refresh_service.spawn_cycle(tickers, generation)?;
        Ok(Some(generation))
    }

    fn bump_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    // ── Schedule & Market Clock ─────────────────────────────────────

    #[must_use]
    pub fn refresh_interval(&self) -> RefreshInterval {
        self.interval
    }

    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.scheduler.is_active()
    }

    /// Pick a new automatic interval. It takes effect at once while the
    /// market is open; otherwise it is remembered for the next open.
    pub fn set_refresh_interval(&mut self, interval: RefreshInterval) -> Result<(), CoreError> {
        self.interval = interval;
        if interval == RefreshInterval::Manual {
            self.scheduler.cancel();
        } else if self.market.last_state() == Some(true) {
            self.scheduler.schedule(interval)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_market_open(&self, now: DateTime<Utc>) -> bool {
        self.market.is_open(&now)
    }

    /// Check the market state and adjust the schedule.
    ///
    /// The first observation only configures the schedule. An open or
    /// close transition also triggers one refresh.
    pub fn observe_market(&mut self, now: DateTime<Utc>) -> Result<MarketEvent, CoreError> {
        let event = self.market.observe(&now);
        match event {
            MarketEvent::Initial { open: true } | MarketEvent::Opened => {
                self.scheduler.schedule(self.interval)?;
            }
            MarketEvent::Initial { open: false } | MarketEvent::Closed => {
                self.scheduler.cancel();
            }
            MarketEvent::Unchanged => {}
        }
        if event.triggers_refresh() {
            self.refresh_at(now)?;
        }
        Ok(event)
    }

    /// How long to wait before the next `observe_market` call.
    #[must_use]
    pub fn market_poll_delay(&self, now: DateTime<Utc>) -> Duration {
        market_clock::poll_delay(&now)
    }
}
