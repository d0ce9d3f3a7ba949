//! Value at Risk
//!
//! Two estimators of the (1 − c) quantile of the daily return distribution:
//! - Parametric VaR: quantile of a normal distribution fitted to the sample
//!   mean and standard deviation, `Φ⁻¹(1 − c; μ, σ)`
//! - Historical VaR: linear-interpolation percentile of the observed sample
//!
//! Both are reported as raw return quantiles, so a loss is a negative number
//! and VaR at 99% is at or below VaR at 95%. Use [`VarEstimate::loss`] for positive
//! loss magnitudes.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use crate::error::{ensure_finite, Result, RiskError};
use crate::interval::{confidence_interval, ConfidenceInterval};
use crate::stats::DescriptiveStats;

/// Default VaR confidence levels
pub const DEFAULT_CONFIDENCE_LEVELS: [f64; 2] = [0.95, 0.99];

/// VaR calculation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarMethod {
    Parametric,
    Historical,
}

/// VaR at one confidence level, by both methods
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarEstimate {
    /// Confidence level (e.g. 0.95)
    pub confidence_level: f64,

    /// Normal-distribution quantile
    pub parametric: f64,

    /// Empirical percentile of the sample
    pub historical: f64,

    /// Mean return at or below the historical VaR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_shortfall: Option<f64>,
}

impl VarEstimate {
    pub fn value(&self, method: VarMethod) -> f64 {
        match method {
            VarMethod::Parametric => self.parametric,
            VarMethod::Historical => self.historical,
        }
    }

    /// VaR of `method` as a positive loss
    pub fn loss(&self, method: VarMethod) -> f64 {
        -self.value(method)
    }

    /// Parametric VaR as a positive loss
    pub fn parametric_loss(&self) -> f64 {
        -self.parametric
    }

    /// Historical VaR as a positive loss
    pub fn historical_loss(&self) -> f64 {
        -self.historical
    }
}

/// Risk figures attached to a sector's pooled statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub var: Vec<VarEstimate>,
    pub confidence_interval: ConfidenceInterval,
}

impl RiskMetrics {
    /// VaR estimate at a given confidence level, if it was computed
    pub fn var_at(&self, confidence_level: f64) -> Option<&VarEstimate> {
        self.var
            .iter()
            .find(|v| (v.confidence_level - confidence_level).abs() < 1e-12)
    }
}

/// Computes VaR at a set of confidence levels plus a CI on the mean
#[derive(Debug, Clone, PartialEq)]
pub struct RiskMetricsCalculator {
    confidence_levels: Vec<f64>,
    significance: f64,
    expected_shortfall: bool,
}

impl Default for RiskMetricsCalculator {
    fn default() -> Self {
        Self {
            confidence_levels: DEFAULT_CONFIDENCE_LEVELS.to_vec(),
            significance: crate::interval::DEFAULT_SIGNIFICANCE,
            expected_shortfall: true,
        }
    }
}

impl RiskMetricsCalculator {
    /// Create a calculator, validating every level up front
    pub fn new(confidence_levels: Vec<f64>, significance: f64) -> Result<Self> {
        if confidence_levels.is_empty() {
            return Err(RiskError::InvalidParameter(
                "at least one VaR confidence level is required".to_string(),
            ));
        }
        for &c in &confidence_levels {
            validate_level(c)?;
        }
        validate_level(significance)?;

        Ok(Self {
            confidence_levels,
            significance,
            expected_shortfall: true,
        })
    }

    pub fn with_expected_shortfall(mut self, enabled: bool) -> Self {
        self.expected_shortfall = enabled;
        self
    }

    pub fn confidence_levels(&self) -> &[f64] {
        &self.confidence_levels
    }

    pub fn significance(&self) -> f64 {
        self.significance
    }

    /// VaR at every configured level and the CI on the mean
    ///
    /// `stats` must describe `sample`; the CI uses the full sample size as `n`.
    pub fn compute(&self, stats: &DescriptiveStats, sample: &[f64]) -> Result<RiskMetrics> {
        let sorted = sorted_sample(sample)?;

        let var = self
            .confidence_levels
            .iter()
            .map(|&c| {
                let historical = percentile_sorted(&sorted, percentile_rank(c));
                let expected_shortfall = if self.expected_shortfall {
                    Some(tail_mean(&sorted, historical)?)
                } else {
                    None
                };
                Ok(VarEstimate {
                    confidence_level: c,
                    parametric: parametric_var(stats.mean, stats.std, c)?,
                    historical: ensure_finite(historical, "historical VaR")?,
                    expected_shortfall,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let confidence_interval =
            confidence_interval(stats.mean, stats.std, sample.len(), self.significance)?;

        debug!(
            observations = sample.len(),
            levels = self.confidence_levels.len(),
            "computed risk metrics"
        );

        Ok(RiskMetrics {
            var,
            confidence_interval,
        })
    }
}

/// Reject levels outside the open interval (0, 1)
pub fn validate_level(level: f64) -> Result<()> {
    if !(level > 0.0 && level < 1.0) {
        return Err(RiskError::InvalidConfidenceLevel(level));
    }
    Ok(())
}

/// Parametric VaR: the (1 − c) quantile of N(mean, std²)
pub fn parametric_var(mean: f64, std: f64, confidence_level: f64) -> Result<f64> {
    validate_level(confidence_level)?;
    if std < 0.0 {
        return Err(RiskError::InvalidParameter(format!(
            "standard deviation must not be negative, got {}",
            std
        )));
    }
    if std == 0.0 {
        return Err(RiskError::DivisionByZero(
            "standard deviation is zero".to_string(),
        ));
    }

    let normal =
        Normal::new(mean, std).map_err(|e| RiskError::NumericalInstability(e.to_string()))?;
    ensure_finite(normal.inverse_cdf(1.0 - confidence_level), "parametric VaR")
}

/// Historical VaR: linear-interpolation percentile at rank 100·(1 − c)
pub fn historical_var(sample: &[f64], confidence_level: f64) -> Result<f64> {
    validate_level(confidence_level)?;
    let sorted = sorted_sample(sample)?;
    ensure_finite(
        percentile_sorted(&sorted, percentile_rank(confidence_level)),
        "historical VaR",
    )
}

/// Expected shortfall: mean of the returns at or below the historical VaR
pub fn expected_shortfall(sample: &[f64], confidence_level: f64) -> Result<f64> {
    validate_level(confidence_level)?;
    let sorted = sorted_sample(sample)?;
    let var = percentile_sorted(&sorted, percentile_rank(confidence_level));
    tail_mean(&sorted, var)
}

/// Percentile rank in [0, 100] of the loss tail for a confidence level
///
/// Computed as `100 − 100·c` and rounded to 9 decimals, so a level such as
/// 0.999 maps to exactly 0.1 rather than a neighbouring float.
fn percentile_rank(confidence_level: f64) -> f64 {
    const SCALE: f64 = 1e9;
    ((100.0 - confidence_level * 100.0) * SCALE).round() / SCALE
}

/// Percentile of an ascending sample, `q` in [0, 100]
///
/// Uses the "linear" definition: virtual index `(n − 1)·q/100`, interpolated
/// between its neighbours. The interpolation is evaluated from whichever
/// neighbour is closer, which reproduces `numpy.percentile` bit for bit.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    let virtual_index = (n - 1) as f64 * (q / 100.0);
    let lo = (virtual_index.floor().max(0.0) as usize).min(n - 1);
    let hi = (lo + 1).min(n - 1);
    let t = virtual_index - lo as f64;

    let (a, b) = (sorted[lo], sorted[hi]);
    let diff = b - a;
    if t >= 0.5 {
        b - diff * (1.0 - t)
    } else {
        a + diff * t
    }
}

fn sorted_sample(sample: &[f64]) -> Result<Vec<f64>> {
    if sample.is_empty() {
        return Err(RiskError::insufficient("empty return sample"));
    }
    if sample.iter().any(|x| !x.is_finite()) {
        return Err(RiskError::NumericalInstability(
            "sample contains a non-finite return".to_string(),
        ));
    }
    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(sorted)
}

fn tail_mean(sorted: &[f64], threshold: f64) -> Result<f64> {
    let tail: Vec<f64> = sorted.iter().copied().take_while(|&r| r <= threshold).collect();
    if tail.is_empty() {
        return Err(RiskError::insufficient("no returns in the loss tail"));
    }
    ensure_finite(
        tail.iter().sum::<f64>() / tail.len() as f64,
        "expected shortfall",
    )
}
