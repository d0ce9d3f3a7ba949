//! Error types for market data retrieval

use thiserror::Error;

use ag_sector_risk::{RiskError, Ticker};

/// Result type for market data operations
pub type MarketDataResult<T> = Result<T, MarketDataError>;

/// Market data error types
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// The source answered but could not provide the series
    #[error("Data retrieval failed for {ticker}: {message}")]
    DataRetrieval {
        /// Requested ticker
        ticker: Ticker,
        /// Error message
        message: String,
    },

    /// No price fell inside the requested period
    #[error("No price data for {ticker} in the requested period")]
    EmptyData {
        /// Requested ticker
        ticker: Ticker,
    },

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded for {source_name}: {message}")]
    RateLimitExceeded {
        /// Price source name
        source_name: String,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("HTTP status {status} while fetching {ticker}")]
    HttpStatus {
        /// Requested ticker
        ticker: Ticker,
        /// Status code
        status: u16,
    },

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Price data rejected by the risk model
    #[error("Invalid price data: {0}")]
    Risk(#[from] RiskError),
}

impl MarketDataError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            MarketDataError::Network(_)
            | MarketDataError::Timeout(_)
            | MarketDataError::RateLimitExceeded { .. }
            | MarketDataError::Http(_) => true,
            MarketDataError::HttpStatus { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Check if error is due to rate limiting
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self,
            MarketDataError::RateLimitExceeded { .. } | MarketDataError::HttpStatus { status: 429, .. }
        )
    }

    /// Map a transport failure onto the timeout/network variants
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MarketDataError::Timeout(err.to_string())
        } else if err.is_connect() {
            MarketDataError::Network(err.to_string())
        } else {
            MarketDataError::Http(err)
        }
    }
}
