//! Price and return series
//!
//! Instruments are identified by [`Ticker`]; each instrument carries a
//! date-ordered [`PriceSeries`] of closing prices from which a
//! [`ReturnSeries`] of daily log returns is derived.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RiskError};

/// Instrument identifier (e.g. "AAPL")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Create a ticker, normalised to upper case
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(symbol.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticker {
    fn from(symbol: &str) -> Self {
        Ticker::new(symbol)
    }
}

impl From<String> for Ticker {
    fn from(symbol: String) -> Self {
        Ticker::new(symbol)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

/// Inclusive range of calendar dates an analysis covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// Create a period, rejecting empty or inverted ranges
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(RiskError::InvalidParameter(format!(
                "start date {} must be before end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse two ISO-8601 dates (YYYY-MM-DD)
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
                RiskError::InvalidParameter(format!("invalid date '{}': {}", s, e))
            })
        };
        Self::new(parse(start)?, parse(end)?)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// A single daily closing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Closing prices for one instrument, strictly increasing by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: Ticker,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from (date, close) pairs in any order
    ///
    /// Points are sorted by date; two prices on the same date are rejected
    /// with [`RiskError::DuplicateDate`]. Price values are not validated here,
    /// that happens when returns are derived.
    pub fn new(ticker: Ticker, points: impl IntoIterator<Item = (NaiveDate, f64)>) -> Result<Self> {
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .map(|(date, close)| PricePoint { date, close })
            .collect();
        points.sort_by_key(|p| p.date);

        if let Some(dup) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(RiskError::DuplicateDate {
                ticker,
                date: dup[0].date,
            });
        }

        Ok(Self { ticker, points })
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// A single daily log return, dated by the later of its two prices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Log returns for one instrument, strictly increasing by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    ticker: Ticker,
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub(crate) fn from_points(ticker: Ticker, points: Vec<ReturnPoint>) -> Self {
        Self { ticker, points }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
