//! In-memory price source
//!
//! Serves price series held in memory, e.g. loaded from a JSON snapshot, so
//! an analysis can run offline and reproducibly.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use ag_sector_risk::{Period, PriceSeries, Ticker};

use crate::error::{MarketDataError, MarketDataResult};
use crate::source::PriceSource;

/// Price source backed by preloaded series
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    series: HashMap<Ticker, PriceSeries>,
}

impl StaticPriceSource {
    pub fn new(series: impl IntoIterator<Item = PriceSeries>) -> Self {
        Self {
            series: series
                .into_iter()
                .map(|s| (s.ticker().clone(), s))
                .collect(),
        }
    }

    /// Load a snapshot of the form `{"AAPL": [["2024-01-02", 185.64], ...], ...}`
    pub fn from_json(json: &str) -> MarketDataResult<Self> {
        let raw: BTreeMap<String, Vec<(NaiveDate, f64)>> = serde_json::from_str(json)?;
        let series = raw
            .into_iter()
            .map(|(ticker, closes)| PriceSeries::new(Ticker::new(ticker), closes))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(series))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_prices(&self, ticker: &Ticker, period: &Period) -> MarketDataResult<PriceSeries> {
        let series = self
            .series
            .get(ticker)
            .ok_or_else(|| MarketDataError::DataRetrieval {
                ticker: ticker.clone(),
                message: "ticker not in snapshot".to_string(),
            })?;

        let closes: Vec<_> = series
            .points()
            .iter()
            .filter(|p| period.contains(p.date))
            .map(|p| (p.date, p.close))
            .collect();
        if closes.is_empty() {
            return Err(MarketDataError::EmptyData {
                ticker: ticker.clone(),
            });
        }

        Ok(PriceSeries::new(ticker.clone(), closes)?)
    }
}
