//! Analysis results
//!
//! An [`AnalysisReport`] is an immutable, serializable snapshot of one run:
//! what was analysed, how the outlier filter behaved, and the statistics and
//! risk figures per instrument and per sector.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, ReturnBasis};
use crate::error::Result;
use crate::outliers::FilterMode;
use crate::series::{Period, Ticker};
use crate::stats::{InstrumentStats, SectorStats};
use crate::var::RiskMetrics;

/// Statistics of one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentReport {
    /// Sector the instrument was reported under
    pub sector: String,
    pub ticker: Ticker,
    pub stats: InstrumentStats,
}

/// Pooled statistics and risk figures of one sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorReport {
    pub name: String,
    pub tickers: Vec<Ticker>,
    pub stats: SectorStats,
    pub risk: RiskMetrics,
}

/// What the outlier filter removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub threshold: f64,
    pub mode: FilterMode,
    pub rows_before: usize,
    pub rows_after: usize,
    pub removed_dates: Vec<NaiveDate>,
}

impl OutlierSummary {
    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }

    /// Share of aligned dates removed, in [0, 1]
    pub fn removed_fraction(&self) -> f64 {
        if self.rows_before == 0 {
            0.0
        } else {
            self.rows_removed() as f64 / self.rows_before as f64
        }
    }
}

/// Complete result of a sector comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub period: Period,
    pub config: AnalysisConfig,
    pub instruments: Vec<InstrumentReport>,
    pub sectors: Vec<SectorReport>,
    /// Dates with a return for every ticker of the universe
    pub aligned_dates: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub outliers: OutlierSummary,
    /// Matrix the statistics were computed on
    pub basis: ReturnBasis,
}

impl AnalysisReport {
    pub fn sector(&self, name: &str) -> Option<&SectorReport> {
        self.sectors.iter().find(|s| s.name == name)
    }

    /// Instrument reports of one sector, in sector order
    pub fn instruments_in<'a>(&'a self, sector: &'a str) -> impl Iterator<Item = &'a InstrumentReport> {
        self.instruments.iter().filter(move |i| i.sector == sector)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
