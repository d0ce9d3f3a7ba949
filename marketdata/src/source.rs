//! Price source trait
//!
//! Every provider of daily closing prices (a remote API, a file, an
//! in-memory fixture) implements [`PriceSource`] so that the fetcher and the
//! binary never depend on a concrete provider.

use async_trait::async_trait;

use ag_sector_risk::{Period, PriceSeries, Ticker};

use crate::error::MarketDataResult;

/// Provider of daily closing prices
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Short name used in logs and rate limiter errors
    fn name(&self) -> &str;

    /// Fetch the closing prices of `ticker` over `period`
    ///
    /// # Returns
    /// * `Ok(PriceSeries)` - Date-ordered closes, at least one inside the period
    /// * `Err(MarketDataError::EmptyData)` - The source has nothing in the period
    /// * `Err(MarketDataError)` - Any other retrieval failure
    async fn fetch_prices(&self, ticker: &Ticker, period: &Period) -> MarketDataResult<PriceSeries>;
}

#[async_trait]
impl<S: PriceSource + ?Sized> PriceSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_prices(&self, ticker: &Ticker, period: &Period) -> MarketDataResult<PriceSeries> {
        (**self).fetch_prices(ticker, period).await
    }
}
