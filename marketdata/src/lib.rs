//! # ag-marketdata: Daily Price History Retrieval
//!
//! This library fetches daily closing prices for the sector risk analysis.
//!
//! ## Core Components
//!
//! - **PriceSource**: Trait for price providers
//! - **YahooSource**: Yahoo Finance chart API adapter
//! - **StaticPriceSource**: In-memory / JSON snapshot provider
//! - **PriceFetcher**: Rate limiting and retry around a source
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ag_marketdata::{FetcherConfig, PriceFetcher, YahooConfig, YahooSource};
//! use ag_sector_risk::{Period, Sector};
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = YahooSource::new(YahooConfig::default()).unwrap();
//!     let fetcher = PriceFetcher::new(source, FetcherConfig::default());
//!
//!     let period = Period::parse("2020-01-01", "2024-12-31").unwrap();
//!     match fetcher.fetch_all(Sector::gafam().tickers(), &period).await {
//!         Ok(prices) => println!("Fetched {} series", prices.len()),
//!         Err(e) => eprintln!("Fetch failed: {}", e),
//!     }
//! }
//! ```

// Public modules
pub mod error;
pub mod fetcher;
pub mod ratelimit;
pub mod retry;
pub mod source;
pub mod static_source;
pub mod yahoo;

// Re-export main types
pub use error::{MarketDataError, MarketDataResult};
pub use fetcher::{FetcherConfig, PriceFetcher};
pub use ratelimit::{RateLimiter, RateLimiterConfig};
pub use retry::{Backoff, RetryConfig};
pub use source::PriceSource;
pub use static_source::StaticPriceSource;
pub use yahoo::{YahooConfig, YahooSource};

// Initialize tracing
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
