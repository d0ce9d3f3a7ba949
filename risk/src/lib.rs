//! # ag-sector-risk: Sector Return Statistics and Value at Risk
//!
//! This library compares the risk profile of equity sectors (by default a
//! GAFAM technology basket against a US utilities basket) from daily closing
//! prices.
//!
//! ## Core Components
//!
//! - **ReturnSeriesBuilder**: log returns and date alignment across tickers
//! - **OutlierFilter**: joint z-score filter over aligned returns
//! - **DescriptiveStats**: mean, sample std, skewness and excess kurtosis
//! - **RiskMetricsCalculator**: parametric and historical VaR, expected
//!   shortfall and a confidence interval on the mean
//! - **SectorDistribution**: histogram and fitted normal curves for charts
//! - **AnalysisPipeline**: the whole computation driven by an `AnalysisConfig`
//!
//! ## Example Usage
//!
//! ```rust
//! use ag_sector_risk::{AnalysisConfig, AnalysisPipeline, Period, PriceSeries, Sector, Ticker};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let mut config = AnalysisConfig::for_period(Period::new(start, start + chrono::Duration::days(60)).unwrap());
//! config.sectors = vec![Sector::new("Tech", ["AAPL"]).unwrap()];
//!
//! let closes = (0..30).map(|i| {
//!     let date = start + chrono::Duration::days(i);
//!     (date, 100.0 + (i % 5) as f64)
//! });
//! let prices = PriceSeries::new(Ticker::new("AAPL"), closes).unwrap();
//!
//! let report = AnalysisPipeline::new(config).unwrap().run(&[prices]).unwrap();
//! let tech = report.sector("Tech").unwrap();
//! assert_eq!(tech.stats.count, 29);
//! assert!(tech.risk.var_at(0.99).unwrap().historical <= tech.risk.var_at(0.95).unwrap().historical);
//! ```

pub mod config;
pub mod distribution;
pub mod error;
pub mod interval;
pub mod matrix;
pub mod outliers;
pub mod pipeline;
pub mod report;
pub mod returns;
pub mod sector;
pub mod series;
pub mod stats;
pub mod var;

pub use config::{AnalysisConfig, ReturnBasis};
pub use distribution::{
    density_grid, DistributionCurves, Histogram, SectorDistribution, VarMarker, VarMarkers,
};
pub use error::{Result, RiskError};
pub use interval::{confidence_interval, ConfidenceInterval};
pub use matrix::ReturnMatrix;
pub use outliers::{FilterMode, FilterOutcome, OutlierFilter};
pub use pipeline::{AnalysisPipeline, AnalysisRun};
pub use report::{AnalysisReport, InstrumentReport, OutlierSummary, SectorReport};
pub use returns::ReturnSeriesBuilder;
pub use sector::{universe, Sector};
pub use series::{Period, PricePoint, PriceSeries, ReturnPoint, ReturnSeries, Ticker};
pub use stats::{
    instrument_stats, sector_stats, DescriptiveStats, InstrumentStats, SectorStats,
};
pub use var::{
    expected_shortfall, historical_var, parametric_var, RiskMetrics, RiskMetricsCalculator,
    VarEstimate, VarMethod,
};
