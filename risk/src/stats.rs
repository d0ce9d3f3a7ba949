//! Descriptive statistics
//!
//! Sample estimators, chosen to reproduce the pandas `Series` methods:
//! - mean: arithmetic mean
//! - std: sample standard deviation (divisor n − 1)
//! - skewness: adjusted Fisher-Pearson coefficient G1
//! - kurtosis: sample excess kurtosis G2 (normal distribution ⇒ 0)

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, Result, RiskError};
use crate::matrix::ReturnMatrix;
use crate::sector::Sector;
use crate::series::Ticker;

/// Minimum sample size for which all four moments are defined
pub const MIN_OBSERVATIONS: usize = 4;

/// Sum of squared deviations treated as zero when estimating shape
const ROUNDING_FLOOR: f64 = 1e-14;

/// Moments of a return sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Number of observations
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation
    pub std: f64,
    pub skewness: f64,
    /// Excess kurtosis
    pub kurtosis: f64,
}

/// Statistics of one instrument's return column
pub type InstrumentStats = DescriptiveStats;

/// Statistics of a sector's pooled sample
pub type SectorStats = DescriptiveStats;

impl DescriptiveStats {
    /// Compute all four moments of `sample`
    pub fn describe(sample: &[f64]) -> Result<Self> {
        let n = sample.len();
        if n < MIN_OBSERVATIONS {
            return Err(RiskError::insufficient(format!(
                "{} observation(s), need at least {}",
                n, MIN_OBSERVATIONS
            )));
        }
        if sample.iter().any(|x| !x.is_finite()) {
            return Err(RiskError::NumericalInstability(
                "sample contains a non-finite return".to_string(),
            ));
        }

        let mean = mean(sample);
        let (m2, m3, m4) = sample.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), x| {
            let d = x - mean;
            let d2 = d * d;
            (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
        });

        let nf = n as f64;
        let std = (m2 / (nf - 1.0)).sqrt();

        // A constant sample has no shape; pandas reports 0 for both and treats
        // a sum of squares below its rounding threshold as zero.
        let (skewness, kurtosis) = if m2.abs() < ROUNDING_FLOOR {
            (0.0, 0.0)
        } else {
            let skewness = nf * (nf - 1.0).sqrt() / (nf - 2.0) * m3 / m2.powf(1.5);

            let adj = 3.0 * (nf - 1.0).powi(2) / ((nf - 2.0) * (nf - 3.0));
            let numer = nf * (nf + 1.0) * (nf - 1.0) * m4;
            let denom = (nf - 2.0) * (nf - 3.0) * m2 * m2;
            (skewness, numer / denom - adj)
        };

        Ok(Self {
            count: n,
            mean: ensure_finite(mean, "mean")?,
            std: ensure_finite(std, "standard deviation")?,
            skewness: ensure_finite(skewness, "skewness")?,
            kurtosis: ensure_finite(kurtosis, "kurtosis")?,
        })
    }
}

/// Arithmetic mean (0 for an empty slice)
pub fn mean(sample: &[f64]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    sample.iter().sum::<f64>() / sample.len() as f64
}

/// Sample standard deviation with Bessel's correction
pub fn sample_std(sample: &[f64]) -> Result<f64> {
    if sample.len() < 2 {
        return Err(RiskError::insufficient(
            "need at least 2 observations for standard deviation",
        ));
    }
    let m = mean(sample);
    let variance = sample.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (sample.len() - 1) as f64;
    ensure_finite(variance.sqrt(), "standard deviation")
}

/// Statistics of every column of a return matrix, in column order
pub fn instrument_stats(matrix: &ReturnMatrix) -> Result<Vec<(Ticker, InstrumentStats)>> {
    matrix
        .tickers()
        .iter()
        .enumerate()
        .map(|(i, ticker)| {
            let stats = DescriptiveStats::describe(&matrix.column_at(i)).map_err(|e| match e {
                RiskError::InsufficientData { reason, .. } => {
                    RiskError::insufficient_for(ticker, reason)
                }
                other => other,
            })?;
            Ok((ticker.clone(), stats))
        })
        .collect()
}

/// Statistics of the pooled sample of a sector
pub fn sector_stats(sector: &Sector, matrix: &ReturnMatrix) -> Result<SectorStats> {
    DescriptiveStats::describe(&sector.pooled_sample(matrix)?)
}
