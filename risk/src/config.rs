//! Analysis configuration
//!
//! Every field has a default so that an empty YAML document yields the
//! standard GAFAM vs Utilities comparison.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::distribution::{DEFAULT_BINS, DEFAULT_DENSITY_STEP};
use crate::error::{Result, RiskError};
use crate::interval::DEFAULT_SIGNIFICANCE;
use crate::outliers::{FilterMode, OutlierFilter, DEFAULT_THRESHOLD};
use crate::sector::{universe, Sector};
use crate::series::{Period, Ticker};
use crate::var::{validate_level, RiskMetricsCalculator, DEFAULT_CONFIDENCE_LEVELS};

/// Which return matrix the statistics are computed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnBasis {
    /// Aligned returns before outlier filtering
    #[default]
    Raw,
    /// Aligned returns after outlier filtering
    Filtered,
}

/// Parameters of one sector comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Date range of the price history, both ends inclusive
    #[serde(default = "default_period")]
    pub period: Period,

    /// Sectors to compare
    #[serde(default = "default_sectors")]
    pub sectors: Vec<Sector>,

    /// Z-score beyond which a row is an outlier
    #[serde(default = "default_outlier_threshold")]
    pub outlier_threshold: f64,

    #[serde(default)]
    pub outlier_mode: FilterMode,

    #[serde(default)]
    pub basis: ReturnBasis,

    /// VaR confidence levels
    #[serde(default = "default_confidence_levels")]
    pub confidence_levels: Vec<f64>,

    /// Two-sided significance of the CI on the mean
    #[serde(default = "default_significance")]
    pub significance: f64,

    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Spacing of the PDF/CDF evaluation grid
    #[serde(default = "default_density_step")]
    pub density_step: f64,

    /// Report historical expected shortfall next to VaR
    #[serde(default = "default_expected_shortfall")]
    pub expected_shortfall: bool,
}

impl AnalysisConfig {
    /// Default configuration over a given period
    pub fn for_period(period: Period) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    /// Parse a configuration from YAML and validate it
    ///
    /// # Example
    ///
    /// ```
    /// use ag_sector_risk::AnalysisConfig;
    ///
    /// let yaml = r#"
    /// period:
    ///   start: 2015-01-01
    ///   end: 2020-12-31
    /// outlier_threshold: 2.5
    /// "#;
    ///
    /// let config = AnalysisConfig::from_yaml(yaml).unwrap();
    /// assert_eq!(config.sectors.len(), 2);
    /// assert_eq!(config.histogram_bins, 100);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values no analysis can run with
    pub fn validate(&self) -> Result<()> {
        if self.period.start >= self.period.end {
            return Err(RiskError::Config(format!(
                "period start {} must be before end {}",
                self.period.start, self.period.end
            )));
        }

        if self.sectors.is_empty() {
            return Err(RiskError::Config("at least one sector is required".to_string()));
        }
        let mut names = HashSet::new();
        if let Some(dup) = self.sectors.iter().find(|s| !names.insert(s.name())) {
            return Err(RiskError::Config(format!(
                "sector {} defined twice",
                dup.name()
            )));
        }

        OutlierFilter::new(self.outlier_threshold)?;

        if self.confidence_levels.is_empty() {
            return Err(RiskError::Config(
                "at least one VaR confidence level is required".to_string(),
            ));
        }
        for &c in &self.confidence_levels {
            validate_level(c)?;
        }
        validate_level(self.significance)?;

        if self.histogram_bins == 0 {
            return Err(RiskError::Config("histogram_bins must be positive".to_string()));
        }
        if !(self.density_step.is_finite() && self.density_step > 0.0) {
            return Err(RiskError::Config(format!(
                "density_step must be positive, got {}",
                self.density_step
            )));
        }

        Ok(())
    }

    /// Every ticker of every sector, in first-seen order
    pub fn universe(&self) -> Vec<Ticker> {
        universe(&self.sectors)
    }

    pub fn outlier_filter(&self) -> Result<OutlierFilter> {
        Ok(OutlierFilter::new(self.outlier_threshold)?.with_mode(self.outlier_mode))
    }

    pub fn risk_calculator(&self) -> Result<RiskMetricsCalculator> {
        Ok(
            RiskMetricsCalculator::new(self.confidence_levels.clone(), self.significance)?
                .with_expected_shortfall(self.expected_shortfall),
        )
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            sectors: default_sectors(),
            outlier_threshold: default_outlier_threshold(),
            outlier_mode: FilterMode::default(),
            basis: ReturnBasis::default(),
            confidence_levels: default_confidence_levels(),
            significance: default_significance(),
            histogram_bins: default_histogram_bins(),
            density_step: default_density_step(),
            expected_shortfall: default_expected_shortfall(),
        }
    }
}

/// First day of the default history
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 5, 31).unwrap_or_default()
}

// Default value functions
fn default_period() -> Period {
    Period {
        start: default_start_date(),
        end: Utc::now().date_naive(),
    }
}

fn default_sectors() -> Vec<Sector> {
    vec![Sector::gafam(), Sector::utilities()]
}

fn default_outlier_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_confidence_levels() -> Vec<f64> {
    DEFAULT_CONFIDENCE_LEVELS.to_vec()
}

fn default_significance() -> f64 {
    DEFAULT_SIGNIFICANCE
}

fn default_histogram_bins() -> usize {
    DEFAULT_BINS
}

fn default_density_step() -> f64 {
    DEFAULT_DENSITY_STEP
}

fn default_expected_shortfall() -> bool {
    true
}
