use std::collections::HashMap;

/// Last known market state for one ticker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quote {
    /// Discovered but no lookup has finished yet
    Pending,
    /// Every lookup attempt failed
    Unavailable,
    /// A finite, non-negative price
    Price(f64),
}

impl Quote {
    /// The resolved price, if any.
    pub fn price(&self) -> Option<f64> {
        match self {
            Quote::Price(p) => Some(*p),
            Quote::Pending | Quote::Unavailable => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Quote::Price(_))
    }
}

/// A lookup result travelling from a refresh task to the cache owner.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteUpdate {
    pub ticker: String,
    pub quote: Quote,
    /// Refresh cycle that produced this result
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CachedQuote {
    quote: Quote,
    generation: u64,
}

/// Transient ticker → quote map. Never persisted.
///
/// Entries are only ever replaced whole. Each entry remembers the refresh
/// generation that wrote it; a result from an older generation is ignored,
/// so a superseded cycle can never overwrite a newer price.
#[derive(Debug, Clone, Default)]
pub struct QuoteCache {
    entries: HashMap<String, CachedQuote>,
    /// Results from generations below this are discarded (bumped on clear).
    floor: u64,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current quote for a ticker. Unknown tickers read as `Pending`.
    pub fn get(&self, ticker: &str) -> Quote {
        self.entries
            .get(&ticker.to_uppercase())
            .map(|c| c.quote)
            .unwrap_or(Quote::Pending)
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.entries.contains_key(&ticker.to_uppercase())
    }

    /// Register a newly discovered ticker as `Pending`. No-op if already known.
    pub fn discover(&mut self, ticker: &str) {
        let floor = self.floor;
        self.entries
            .entry(ticker.to_uppercase())
            .or_insert(CachedQuote {
                quote: Quote::Pending,
                generation: floor,
            });
    }

    /// Replace one entry. Returns `false` when the update was superseded.
    pub fn apply(&mut self, update: QuoteUpdate) -> bool {
        if !self.accepts(update.generation) {
            return false;
        }
        let key = update.ticker.to_uppercase();
        if let Some(existing) = self.entries.get(&key) {
            if update.generation < existing.generation {
                return false;
            }
        }
        self.entries.insert(
            key,
            CachedQuote {
                quote: update.quote,
                generation: update.generation,
            },
        );
        true
    }

    /// Whether results from this refresh generation are still wanted.
    pub fn accepts(&self, generation: u64) -> bool {
        generation >= self.floor
    }

    /// Drop every entry and ignore results from any cycle started so far.
    pub fn clear(&mut self, next_generation: u64) {
        self.entries.clear();
        self.floor = next_generation;
    }

    /// True when the entry is missing, pending or unavailable.
    pub fn is_unresolved(&self, ticker: &str) -> bool {
        !self.get(ticker).is_resolved()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
