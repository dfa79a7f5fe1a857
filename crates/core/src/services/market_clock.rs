use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::US::Eastern;
use std::time::Duration;
use tracing::info;

/// 09:30 US/Eastern, in seconds after midnight
const OPEN_SECS: u32 = 9 * 3600 + 30 * 60;
/// 16:00 US/Eastern, in seconds after midnight
const CLOSE_SECS: u32 = 16 * 3600;

/// Lead time before the open during which polling slows down.
const PRE_OPEN_WINDOW_SECS: i64 = 300;
const PRE_OPEN_POLL: Duration = Duration::from_secs(30);
const DEFAULT_POLL: Duration = Duration::from_secs(10);

/// Regular session: Monday to Friday, 09:30 to 16:00 US/Eastern inclusive.
/// Exchange holidays are not modelled.
pub fn is_market_open<Tz: TimeZone>(now: &DateTime<Tz>) -> bool {
    let local = now.with_timezone(&Eastern);
    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let secs = local.num_seconds_from_midnight();
    if secs == CLOSE_SECS {
        return local.nanosecond() == 0;
    }
    (OPEN_SECS..CLOSE_SECS).contains(&secs)
}

/// How long to wait before checking the market state again.
pub fn poll_delay<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    let local = now.with_timezone(&Eastern);
    let until_open = i64::from(OPEN_SECS) - i64::from(local.num_seconds_from_midnight());
    if (0..=PRE_OPEN_WINDOW_SECS).contains(&until_open) {
        PRE_OPEN_POLL
    } else {
        DEFAULT_POLL
    }
}

/// What a market-state observation means for the refresh schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketEvent {
    /// First observation of the session
    Initial { open: bool },
    Opened,
    Closed,
    Unchanged,
}

impl MarketEvent {
    /// Transitions trigger one immediate refresh; the first observation
    /// does not.
    pub fn triggers_refresh(&self) -> bool {
        matches!(self, MarketEvent::Opened | MarketEvent::Closed)
    }
}

/// Tracks the last observed market state.
#[derive(Debug, Clone, Default)]
pub struct MarketWatcher {
    dev_mode: bool,
    last: Option<bool>,
}

impl MarketWatcher {
    /// In dev mode the market is always reported open.
    pub fn new(dev_mode: bool) -> Self {
        Self {
            dev_mode,
            last: None,
        }
    }

    pub fn is_open(&self, now: &DateTime<Utc>) -> bool {
        self.dev_mode || is_market_open(now)
    }

    pub fn last_state(&self) -> Option<bool> {
        self.last
    }

    pub fn observe(&mut self, now: &DateTime<Utc>) -> MarketEvent {
        let open = self.is_open(now);
        let event = match self.last {
            None => MarketEvent::Initial { open },
            Some(prev) if prev == open => MarketEvent::Unchanged,
            Some(_) if open => MarketEvent::Opened,
            Some(_) => MarketEvent::Closed,
        };
        self.last = Some(open);
        match event {
            MarketEvent::Opened => info!("market opened"),
            MarketEvent::Closed => info!("market closed"),
            _ => {}
        }
        event
    }
}
