use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::quote::Quote;
use crate::providers::registry::QuoteProviderRegistry;

/// How hard to try before giving up on a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Fixed pause after each failed attempt (not after the last)
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// Looks up current prices through the provider registry, with retries.
///
/// A lookup never fails outright: after the last attempt the ticker is
/// reported as `Quote::Unavailable`.
pub struct QuoteService {
    registry: QuoteProviderRegistry,
    policy: RetryPolicy,
}

impl QuoteService {
    pub fn new(registry: QuoteProviderRegistry, policy: RetryPolicy) -> Self {
        Self { registry, policy }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Fetch a quote, retrying up to `policy.attempts` times.
    pub async fn fetch_quote(&self, ticker: &str) -> Quote {
        let attempts = self.policy.attempts.max(1);
        for attempt in 1..=attempts {
            match self.fetch_price(ticker).await {
                Ok(price) => {
                    debug!(ticker, price, attempt, "quote lookup succeeded");
                    return Quote::Price(price);
                }
                Err(e) => {
                    debug!(ticker, attempt, error = %e, "quote lookup failed");
                    if attempt < attempts && !self.policy.delay.is_zero() {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }
        warn!(ticker, attempts, "quote unavailable after retries");
        Quote::Unavailable
    }

    /// One attempt: try providers in registration order.
    ///
    /// A price that is NaN, infinite or negative counts as a failure and
    /// the next provider is tried.
    async fn fetch_price(&self, ticker: &str) -> Result<f64, CoreError> {
        let providers = self.registry.providers();
        if providers.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let mut last_error = None;
        for provider in providers {
            match provider.get_price(ticker).await {
                Ok(price) if price.is_finite() && price >= 0.0 => return Ok(price),
                Ok(price) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!(
                            "Invalid price returned for {ticker}: {price} (must be finite and non-negative)"
                        ),
                    });
                }
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }
}
