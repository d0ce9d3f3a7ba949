//! Yahoo Finance chart API price source
//!
//! Daily bars come from `GET /v8/finance/chart/{ticker}`. The response holds
//! parallel arrays of bar timestamps and (possibly null) closes; the adjusted
//! close series sits under `indicators.adjclose`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use ag_sector_risk::{Period, PriceSeries, Ticker};

use crate::error::{MarketDataError, MarketDataResult};
use crate::source::PriceSource;

/// Yahoo source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YahooConfig {
    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Use dividend and split adjusted closes
    #[serde(default = "default_use_adjusted_close")]
    pub use_adjusted_close: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl YahooConfig {
    /// Configuration pointing at another endpoint (e.g. a mock server)
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            use_adjusted_close: default_use_adjusted_close(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_endpoint() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_use_adjusted_close() -> bool {
    true
}

fn default_user_agent() -> String {
    concat!("ag-marketdata/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Yahoo Finance daily price source
pub struct YahooSource {
    config: YahooConfig,
    base: Url,
    client: Client,
}

impl YahooSource {
    /// Create a new Yahoo source
    pub fn new(config: YahooConfig) -> MarketDataResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| MarketDataError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let mut endpoint = config.endpoint.clone();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let base = Url::parse(&endpoint).map_err(|e| {
            MarketDataError::Config(format!("Invalid endpoint '{}': {}", config.endpoint, e))
        })?;

        Ok(Self {
            config,
            base,
            client,
        })
    }

    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    /// Chart URL for one ticker; `period2` is exclusive
    pub fn chart_url(&self, ticker: &Ticker, period: &Period) -> MarketDataResult<Url> {
        let mut url = self
            .base
            .join(&format!("v8/finance/chart/{}", ticker))
            .map_err(|e| MarketDataError::Config(format!("Invalid chart URL for {}: {}", ticker, e)))?;

        url.query_pairs_mut()
            .append_pair("period1", &unix_midnight(period.start).to_string())
            .append_pair("period2", &unix_midnight(period.end).to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "history")
            .append_pair("includeAdjustedClose", "true");

        Ok(url)
    }
}

#[async_trait]
impl PriceSource for YahooSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_prices(&self, ticker: &Ticker, period: &Period) -> MarketDataResult<PriceSeries> {
        let url = self.chart_url(ticker, period)?;
        debug!(ticker = %ticker, url = %url, "requesting chart");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(MarketDataError::from_transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ChartResponse>(&body)
                .ok()
                .and_then(|r| r.chart.error)
                .map(|e| e.to_string())
                .unwrap_or_else(|| "symbol not found".to_string());
            return Err(MarketDataError::DataRetrieval {
                ticker: ticker.clone(),
                message,
            });
        }
        if !status.is_success() {
            return Err(MarketDataError::HttpStatus {
                ticker: ticker.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(MarketDataError::from_transport)?;
        parse_chart(ticker, period, &body, self.config.use_adjusted_close)
    }
}

/// Seconds since the epoch at 00:00 UTC of `date`
fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Turn a chart response body into a price series restricted to `period`
pub(crate) fn parse_chart(
    ticker: &Ticker,
    period: &Period,
    body: &str,
    use_adjusted_close: bool,
) -> MarketDataResult<PriceSeries> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        return Err(MarketDataError::DataRetrieval {
            ticker: ticker.clone(),
            message: error.to_string(),
        });
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MarketDataError::EmptyData {
            ticker: ticker.clone(),
        })?;

    let adjusted = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .filter(|a| !a.is_empty());
    let closes = match adjusted {
        Some(adjusted) if use_adjusted_close => adjusted,
        _ => {
            if use_adjusted_close {
                warn!(ticker = %ticker, "no adjusted closes in response, using raw closes");
            }
            result
                .indicators
                .quote
                .into_iter()
                .next()
                .map(|q| q.close)
                .unwrap_or_default()
        }
    };

    if closes.len() != result.timestamp.len() {
        return Err(MarketDataError::InvalidResponse(format!(
            "{} timestamps but {} closes for {}",
            result.timestamp.len(),
            closes.len(),
            ticker
        )));
    }

    // Later bars win when two timestamps share a trading date.
    let mut by_date = BTreeMap::new();
    let mut skipped = 0usize;
    for (&ts, close) in result.timestamp.iter().zip(&closes) {
        let date = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| {
                MarketDataError::InvalidResponse(format!("timestamp {} out of range", ts))
            })?;

        match close {
            Some(close) if close.is_finite() => {
                if period.contains(date) {
                    by_date.insert(date, *close);
                }
            }
            _ => skipped += 1,
        }
    }

    if by_date.is_empty() {
        return Err(MarketDataError::EmptyData {
            ticker: ticker.clone(),
        });
    }

    debug!(ticker = %ticker, closes = by_date.len(), skipped, "parsed chart");
    Ok(PriceSeries::new(ticker.clone(), by_date)?)
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

impl std::fmt::Display for ChartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.description.is_empty() {
            f.write_str(&self.code)
        } else {
            write!(f, "{}: {}", self.code, self.description)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}
