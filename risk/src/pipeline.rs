//! Sector comparison pipeline
//!
//! Runs the full computation for a validated [`AnalysisConfig`]:
//! prices → aligned log returns → outlier filter → per-instrument and pooled
//! sector statistics → VaR and confidence interval → chart inputs.

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::{AnalysisConfig, ReturnBasis};
use crate::distribution::SectorDistribution;
use crate::error::{Result, RiskError};
use crate::matrix::ReturnMatrix;
use crate::outliers::{FilterOutcome, OutlierFilter};
use crate::report::{AnalysisReport, InstrumentReport, OutlierSummary, SectorReport};
use crate::returns::ReturnSeriesBuilder;
use crate::series::{PriceSeries, Ticker};
use crate::stats::{instrument_stats, DescriptiveStats};
use crate::var::RiskMetricsCalculator;

/// Everything a run produces, including the intermediate matrices
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub report: AnalysisReport,
    /// Aligned returns before filtering
    pub raw: ReturnMatrix,
    /// Aligned returns after filtering
    pub filtered: ReturnMatrix,
    /// Chart inputs, one per sector in config order
    pub distributions: Vec<SectorDistribution>,
}

impl AnalysisRun {
    /// Matrix the statistics were computed on
    pub fn basis_matrix(&self) -> &ReturnMatrix {
        match self.report.basis {
            ReturnBasis::Raw => &self.raw,
            ReturnBasis::Filtered => &self.filtered,
        }
    }
}

/// Sector risk comparison pipeline
///
/// Holds only validated configuration; every run is independent.
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    builder: ReturnSeriesBuilder,
    filter: OutlierFilter,
    calculator: RiskMetricsCalculator,
}

impl AnalysisPipeline {
    /// Create a pipeline, validating the configuration eagerly
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            builder: ReturnSeriesBuilder::with_period(config.period),
            filter: config.outlier_filter()?,
            calculator: config.risk_calculator()?,
            config,
        })
    }

    /// Load a pipeline from a YAML configuration
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::new(AnalysisConfig::from_yaml(yaml)?)
    }

    /// Load a pipeline from a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(AnalysisConfig::from_json(json)?)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the analysis and return the report only
    pub fn run(&self, prices: &[PriceSeries]) -> Result<AnalysisReport> {
        Ok(self.analyse(prices)?.report)
    }

    /// Aligned raw returns of the whole universe
    pub fn align(&self, prices: &[PriceSeries]) -> Result<ReturnMatrix> {
        let universe = self.config.universe();
        let by_ticker: HashMap<&Ticker, &PriceSeries> =
            prices.iter().map(|p| (p.ticker(), p)).collect();

        for series in prices {
            if !universe.contains(series.ticker()) {
                warn!(ticker = %series.ticker(), "ignoring prices for a ticker outside every sector");
            }
        }

        let ordered = universe
            .iter()
            .map(|ticker| {
                by_ticker
                    .get(ticker)
                    .map(|series| (*series).clone())
                    .ok_or_else(|| RiskError::insufficient_for(ticker, "no price series supplied"))
            })
            .collect::<Result<Vec<_>>>()?;

        self.builder.build_matrix(&ordered)
    }

    /// Raw and filtered matrices, without computing statistics
    pub fn prepare(&self, prices: &[PriceSeries]) -> Result<(ReturnMatrix, FilterOutcome)> {
        let raw = self.align(prices)?;
        let outcome = self.filter.filter(&raw);
        Ok((raw, outcome))
    }

    /// Run the analysis, keeping the intermediate matrices and chart inputs
    pub fn analyse(&self, prices: &[PriceSeries]) -> Result<AnalysisRun> {
        info!(
            period = %self.config.period,
            sectors = self.config.sectors.len(),
            "starting sector analysis"
        );

        let (raw, outcome) = self.prepare(prices)?;
        let outliers = OutlierSummary {
            threshold: self.filter.threshold(),
            mode: self.filter.mode(),
            rows_before: raw.len(),
            rows_after: outcome.matrix.len(),
            removed_dates: outcome.removed_dates,
        };
        info!(
            aligned = outliers.rows_before,
            removed = outliers.rows_removed(),
            "outlier filter complete"
        );

        let filtered = outcome.matrix;
        let basis = match self.config.basis {
            ReturnBasis::Raw => &raw,
            ReturnBasis::Filtered => &filtered,
        };
        if basis.is_empty() {
            return Err(RiskError::insufficient("every aligned date was filtered out"));
        }

        let per_ticker: HashMap<Ticker, DescriptiveStats> =
            instrument_stats(basis)?.into_iter().collect();

        let mut instruments = Vec::new();
        let mut sectors = Vec::with_capacity(self.config.sectors.len());
        let mut distributions = Vec::with_capacity(self.config.sectors.len());

        for sector in &self.config.sectors {
            for ticker in sector.tickers() {
                let stats = per_ticker
                    .get(ticker)
                    .copied()
                    .ok_or_else(|| RiskError::UnknownTicker(ticker.clone()))?;
                instruments.push(InstrumentReport {
                    sector: sector.name().to_string(),
                    ticker: ticker.clone(),
                    stats,
                });
            }

            let sample = sector.pooled_sample(basis)?;
            let stats = DescriptiveStats::describe(&sample)?;
            let risk = self.calculator.compute(&stats, &sample)?;
            debug!(
                sector = sector.name(),
                observations = stats.count,
                mean = stats.mean,
                std = stats.std,
                "pooled sector statistics"
            );

            distributions.push(SectorDistribution::build(
                sector.name(),
                &sample,
                &stats,
                &risk,
                self.config.histogram_bins,
                self.config.density_step,
            )?);

            sectors.push(SectorReport {
                name: sector.name().to_string(),
                tickers: sector.tickers().to_vec(),
                stats,
                risk,
            });
        }

        let report = AnalysisReport {
            period: self.config.period,
            config: self.config.clone(),
            instruments,
            sectors,
            aligned_dates: raw.len(),
            first_date: raw.dates().first().copied(),
            last_date: raw.dates().last().copied(),
            outliers,
            basis: self.config.basis,
        };

        info!(
            sectors = report.sectors.len(),
            instruments = report.instruments.len(),
            "sector analysis complete"
        );

        Ok(AnalysisRun {
            report,
            raw,
            filtered,
            distributions,
        })
    }
}
