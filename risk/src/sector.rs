//! Sector definitions
//!
//! A [`Sector`] is a named, ordered set of tickers. Every calculator takes
//! its ticker list from a sector so that the two baskets are defined once.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, RiskError};
use crate::matrix::ReturnMatrix;
use crate::series::Ticker;

/// Named basket of instruments with fixed membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SectorSpec", into = "SectorSpec")]
pub struct Sector {
    name: String,
    tickers: Vec<Ticker>,
}

/// Serialized form of a sector, validated on the way in
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SectorSpec {
    name: String,
    tickers: Vec<Ticker>,
}

impl TryFrom<SectorSpec> for Sector {
    type Error = RiskError;

    fn try_from(spec: SectorSpec) -> Result<Self> {
        Sector::new(spec.name, spec.tickers)
    }
}

impl From<Sector> for SectorSpec {
    fn from(sector: Sector) -> Self {
        SectorSpec {
            name: sector.name,
            tickers: sector.tickers,
        }
    }
}

impl Sector {
    /// Create a sector; membership must be non-empty and duplicate-free
    pub fn new<T: Into<Ticker>>(name: impl Into<String>, tickers: impl IntoIterator<Item = T>) -> Result<Self> {
        let name = name.into();
        let tickers: Vec<Ticker> = tickers.into_iter().map(Into::into).collect();

        if name.trim().is_empty() {
            return Err(RiskError::InvalidParameter(
                "sector name must not be empty".to_string(),
            ));
        }
        if tickers.is_empty() {
            return Err(RiskError::InvalidParameter(format!(
                "sector {} has no tickers",
                name
            )));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = tickers.iter().find(|t| !seen.insert(*t)) {
            return Err(RiskError::InvalidParameter(format!(
                "ticker {} listed twice in sector {}",
                dup, name
            )));
        }

        Ok(Self { name, tickers })
    }

    /// Large-cap US technology basket
    pub fn gafam() -> Self {
        Self {
            name: "GAFAM".to_string(),
            tickers: ["AAPL", "MSFT", "META", "GOOG", "AMZN"]
                .into_iter()
                .map(Ticker::new)
                .collect(),
        }
    }

    /// Regulated US electric utilities basket
    pub fn utilities() -> Self {
        Self {
            name: "Utilities".to_string(),
            tickers: ["NEE", "DUK", "SO", "D", "AEP"]
                .into_iter()
                .map(Ticker::new)
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.tickers.contains(ticker)
    }

    /// Stack every (date, ticker) observation of this sector into one sample
    ///
    /// Observations are laid out ticker-major (in sector order), then by
    /// ascending date, so the pooled sample and any statistic computed from it
    /// do not depend on how the matrix columns happen to be ordered.
    pub fn pooled_sample(&self, matrix: &ReturnMatrix) -> Result<Vec<f64>> {
        let mut pooled = Vec::with_capacity(matrix.len() * self.tickers.len());
        for ticker in &self.tickers {
            pooled.extend(matrix.column(ticker)?);
        }
        Ok(pooled)
    }
}

/// All distinct tickers of a set of sectors, in first-seen order
pub fn universe(sectors: &[Sector]) -> Vec<Ticker> {
    let mut seen = HashSet::new();
    sectors
        .iter()
        .flat_map(|s| s.tickers().iter())
        .filter(|t| seen.insert(*t))
        .cloned()
        .collect()
}
