//! Error types for the sector risk pipeline

use chrono::NaiveDate;
use thiserror::Error;

use crate::series::Ticker;

/// Errors that can occur while building returns or computing risk statistics
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Insufficient data{}: {reason}", for_ticker(.ticker))]
    InsufficientData {
        /// Offending ticker, when the shortage is attributable to one
        ticker: Option<Ticker>,
        reason: String,
    },

    #[error("Invalid price {price} for {ticker} on {date}")]
    InvalidPrice {
        ticker: Ticker,
        date: NaiveDate,
        price: f64,
    },

    #[error("Duplicate date {date} in price series for {ticker}")]
    DuplicateDate { ticker: Ticker, date: NaiveDate },

    #[error("Division by zero in calculation: {0}")]
    DivisionByZero(String),

    #[error("Invalid confidence level: {0} (must be between 0 and 1)")]
    InvalidConfidenceLevel(f64),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    #[error("Unknown ticker: {0}")]
    UnknownTicker(Ticker),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RiskError {
    /// Shortage not tied to a single instrument
    pub fn insufficient(reason: impl Into<String>) -> Self {
        RiskError::InsufficientData {
            ticker: None,
            reason: reason.into(),
        }
    }

    /// Shortage for a specific instrument
    pub fn insufficient_for(ticker: &Ticker, reason: impl Into<String>) -> Self {
        RiskError::InsufficientData {
            ticker: Some(ticker.clone()),
            reason: reason.into(),
        }
    }
}

impl From<serde_yaml::Error> for RiskError {
    fn from(err: serde_yaml::Error) -> Self {
        RiskError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RiskError {
    fn from(err: serde_json::Error) -> Self {
        RiskError::Config(err.to_string())
    }
}

fn for_ticker(ticker: &Option<Ticker>) -> String {
    ticker
        .as_ref()
        .map(|t| format!(" for {}", t))
        .unwrap_or_default()
}

/// Fail loudly instead of letting a NaN or infinity leak downstream
pub(crate) fn ensure_finite(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RiskError::NumericalInstability(format!(
            "{} is not finite ({})",
            what, value
        )))
    }
}

pub type Result<T> = std::result::Result<T, RiskError>;
