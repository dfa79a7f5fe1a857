use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::debug;

use crate::errors::CoreError;
use super::traits::QuoteProvider;

const PROVIDER: &str = "Yahoo Finance";

/// Days of daily history scanned when the latest quote has no usable close.
const HISTORY_FALLBACK_DAYS: i64 = 5;

/// Yahoo Finance quote provider for US equities and ETFs.
///
/// - **Free**: No API key required.
/// - **No strict rate limits** (unofficial public API).
///
/// Uses the `yahoo_finance_api` crate. The latest 1d quote is tried first;
/// if its close is missing or NaN, the last valid close of the recent daily
/// history is used instead.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to create connector: {e}"),
            })?;
        Ok(Self { connector })
    }

    async fn latest_close(&self, ticker: &str) -> Result<f64, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(ticker, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch latest quote for {ticker}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No quote data for {ticker}: {e}"),
        })?;

        Ok(quote.close)
    }

    async fn recent_history_close(&self, ticker: &str) -> Result<f64, CoreError> {
        let end = OffsetDateTime::now_utc();
        let start = end - time::Duration::days(HISTORY_FALLBACK_DAYS);

        let resp = self
            .connector
            .get_quote_history(ticker, start, end)
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch history for {ticker}: {e}"),
            })?;

        let quotes = resp.quotes().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse quotes for {ticker}: {e}"),
        })?;

        quotes
            .iter()
            .rev()
            .map(|q| q.close)
            .find(|c| c.is_finite())
            .ok_or_else(|| CoreError::PriceNotAvailable(ticker.to_string()))
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_price(&self, ticker: &str) -> Result<f64, CoreError> {
        match self.latest_close(ticker).await {
            Ok(close) if close.is_finite() => Ok(close),
            Ok(_) => {
                debug!(ticker, "latest close is NaN, falling back to daily history");
                self.recent_history_close(ticker).await
            }
            Err(e) => Err(e),
        }
    }
}
