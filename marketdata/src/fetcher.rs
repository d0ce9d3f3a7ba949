//! Price fetcher
//!
//! Orchestrates one [`PriceSource`] behind a rate limiter and a retry policy
//! and fetches a list of tickers one at a time.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ag_sector_risk::{Period, PriceSeries, Ticker};

use crate::error::MarketDataResult;
use crate::ratelimit::{RateLimiter, RateLimiterConfig};
use crate::retry::RetryConfig;
use crate::source::PriceSource;

/// Fetcher configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetcherConfig {
    #[serde(default)]
    pub rate_limit: RateLimiterConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

/// Rate-limited, retrying price fetcher
pub struct PriceFetcher<S> {
    source: S,
    limiter: RateLimiter,
    retry: RetryConfig,
}

impl<S: PriceSource> PriceFetcher<S> {
    pub fn new(source: S, config: FetcherConfig) -> Self {
        let limiter = config.rate_limit.build(source.name());
        Self {
            source,
            limiter,
            retry: config.retry,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch one ticker, retrying transient failures
    pub async fn fetch(&self, ticker: &Ticker, period: &Period) -> MarketDataResult<PriceSeries> {
        let mut attempt = 0;
        loop {
            if self.limiter.try_check().is_err() {
                debug!(
                    source = self.limiter.source_name(),
                    requests_per_second = self.limiter.requests_per_second(),
                    burst = self.limiter.burst_size(),
                    "rate limit reached, waiting"
                );
                self.limiter.check().await?;
            }

            match self.source.fetch_prices(ticker, period).await {
                Ok(series) => return Ok(series),
                Err(err) if attempt < self.retry.max_retries && self.retry.should_retry(&err) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        ticker = %ticker,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying price fetch"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Fetch every ticker in order; the first failure aborts the batch
    pub async fn fetch_all(&self, tickers: &[Ticker], period: &Period) -> MarketDataResult<Vec<PriceSeries>> {
        let mut all = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let series = self.fetch(ticker, period).await?;
            info!(
                ticker = %ticker,
                source = self.source.name(),
                prices = series.len(),
                "fetched price history"
            );
            all.push(series);
        }
        Ok(all)
    }
}
