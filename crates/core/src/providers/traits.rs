use async_trait::async_trait;

use crate::errors::CoreError;

/// Source of current market prices.
///
/// Each market-data API implements this trait. The rest of the crate only
/// sees `get_price`, so a provider can be swapped without touching the
/// refresh logic.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Latest price of `ticker`. May return NaN; callers validate.
    async fn get_price(&self, ticker: &str) -> Result<f64, CoreError>;
}
