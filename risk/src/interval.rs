//! Confidence interval on the mean return

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{ensure_finite, Result, RiskError};

/// Default two-sided significance (95% interval)
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// Normal-approximation interval `mean ± z(1 − α/2)·std/√n`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
    pub margin_of_error: f64,
    /// Two-sided significance α
    pub significance: f64,
    pub sample_size: usize,
}

impl ConfidenceInterval {
    /// Confidence level of the interval, `1 − α`
    pub fn level(&self) -> f64 {
        1.0 - self.significance
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Compute the interval from summary statistics
pub fn confidence_interval(
    mean: f64,
    std: f64,
    sample_size: usize,
    significance: f64,
) -> Result<ConfidenceInterval> {
    if !(significance > 0.0 && significance < 1.0) {
        return Err(RiskError::InvalidConfidenceLevel(significance));
    }
    if sample_size == 0 {
        return Err(RiskError::DivisionByZero("sample size is zero".to_string()));
    }
    if !(std.is_finite() && std >= 0.0) {
        return Err(RiskError::InvalidParameter(format!(
            "standard deviation must be finite and non-negative, got {}",
            std
        )));
    }
    if std == 0.0 {
        return Err(RiskError::DivisionByZero(
            "standard deviation is zero".to_string(),
        ));
    }

    let standard_normal =
        Normal::new(0.0, 1.0).map_err(|e| RiskError::NumericalInstability(e.to_string()))?;
    let z = standard_normal.inverse_cdf(1.0 - significance / 2.0);
    let margin_of_error = ensure_finite(z * std / (sample_size as f64).sqrt(), "margin of error")?;

    Ok(ConfidenceInterval {
        mean,
        lower: mean - margin_of_error,
        upper: mean + margin_of_error,
        margin_of_error,
        significance,
        sample_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scenario_interval() {
        let ci = confidence_interval(0.002, 0.019235384061671343, 5, 0.05).unwrap();

        assert_relative_eq!(ci.margin_of_error, 0.016860, epsilon = 1e-5);
        assert_relative_eq!(ci.lower, 0.002 - ci.margin_of_error, epsilon = 1e-15);
        assert_relative_eq!(ci.upper, 0.002 + ci.margin_of_error, epsilon = 1e-15);
        assert_relative_eq!(ci.level(), 0.95, epsilon = 1e-15);
        assert!(ci.contains(0.002));
    }

    #[test]
    fn test_margin_matches_reference_value() {
        // 1.959964 * 0.02 / sqrt(2500)
        let ci = confidence_interval(0.001, 0.02, 2500, 0.05).unwrap();
        assert_relative_eq!(ci.margin_of_error, 0.0007839855938160216, epsilon = 1e-12);
        assert_relative_eq!(ci.lower, 0.000216, epsilon = 1e-6);
        assert_relative_eq!(ci.upper, 0.001784, epsilon = 1e-6);
    }

    #[test]
    fn test_interval_narrows_with_sample_size() {
        let small = confidence_interval(0.0, 0.01, 100, 0.05).unwrap();
        let large = confidence_interval(0.0, 0.01, 10_000, 0.05).unwrap();
        assert!(large.width() < small.width());
    }

    #[test]
    fn test_wider_at_lower_significance() {
        let ci95 = confidence_interval(0.0, 0.01, 250, 0.05).unwrap();
        let ci99 = confidence_interval(0.0, 0.01, 250, 0.01).unwrap();
        assert!(ci99.width() > ci95.width());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            confidence_interval(0.0, 0.01, 100, 0.0),
            Err(RiskError::InvalidConfidenceLevel(_))
        ));
        assert!(matches!(
            confidence_interval(0.0, 0.01, 0, 0.05),
            Err(RiskError::DivisionByZero(_))
        ));
        assert!(confidence_interval(0.0, -0.01, 10, 0.05).is_err());
        assert!(matches!(
            confidence_interval(0.001, 0.0, 100, 0.05),
            Err(RiskError::DivisionByZero(_))
        ));
    }
}
