//! Rate limiting implementation
//!
//! Token bucket limiter shared by every request a fetcher sends to one price
//! source.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as GovRateLimiter};
use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::error::{MarketDataError, MarketDataResult};

/// Rate limiter for price source requests
pub struct RateLimiter {
    source_name: String,
    limiter: DefaultDirectRateLimiter,
    requests_per_second: u32,
    burst_size: u32,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `source_name` - Price source the budget applies to
    /// * `requests_per_second` - Maximum requests per second (at least 1)
    /// * `burst_size` - Maximum burst capacity (at least 1)
    pub fn new(source_name: impl Into<String>, requests_per_second: u32, burst_size: u32) -> Self {
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32));
        let burst = NonZeroU32::new(burst_size).unwrap_or(nonzero!(1u32));
        let quota = Quota::per_second(per_second).allow_burst(burst);

        Self {
            source_name: source_name.into(),
            limiter: GovRateLimiter::direct(quota),
            requests_per_second: per_second.get(),
            burst_size: burst.get(),
        }
    }

    /// Wait until the rate limit allows the next request
    pub async fn check(&self) -> MarketDataResult<()> {
        if self.limiter.check().is_err() {
            self.limiter.until_ready().await;
        }
        Ok(())
    }

    /// Try to acquire permission without waiting
    ///
    /// # Returns
    /// * `Ok(())` - Permission granted
    /// * `Err(MarketDataError::RateLimitExceeded)` - Rate limit exceeded
    pub fn try_check(&self) -> MarketDataResult<()> {
        self.limiter
            .check()
            .map_err(|_| MarketDataError::RateLimitExceeded {
                source_name: self.source_name.clone(),
                message: format!(
                    "Rate limit exceeded: {} requests/sec, burst {}",
                    self.requests_per_second, self.burst_size
                ),
            })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }

    pub fn burst_size(&self) -> u32 {
        self.burst_size
    }
}

/// Rate limiter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Requests per second
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    /// Burst capacity
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

impl RateLimiterConfig {
    /// Create a new rate limiter configuration
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// Conservative budget for the public Yahoo chart endpoint
    pub fn yahoo_default() -> Self {
        Self {
            requests_per_second: 2,
            burst_size: 5,
        }
    }

    /// Build a rate limiter with this configuration
    pub fn build(&self, source_name: impl Into<String>) -> RateLimiter {
        RateLimiter::new(source_name, self.requests_per_second, self.burst_size)
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::yahoo_default()
    }
}

fn default_requests_per_second() -> u32 {
    2
}

fn default_burst_size() -> u32 {
    5
}
