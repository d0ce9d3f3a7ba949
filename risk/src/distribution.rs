//! Distribution data for charts
//!
//! Everything a renderer needs to draw a sector's return distribution:
//! an empirical density histogram, the fitted normal PDF and CDF evaluated on
//! a regular grid, and the VaR levels to mark. No statistic is computed by
//! the renderer itself.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

use crate::error::{Result, RiskError};
use crate::stats::SectorStats;
use crate::var::{RiskMetrics, VarMethod};

/// Default number of histogram bins
pub const DEFAULT_BINS: usize = 100;

/// Default spacing of the density grid, in return units
pub const DEFAULT_DENSITY_STEP: f64 = 0.001;

/// Upper bound on grid length, guards against a tiny step over a wide range
const MAX_GRID_POINTS: usize = 1_000_000;

/// Evenly spaced points covering `[min − step, max + step)`
///
/// Same points as `numpy.arange(min - step, max + step, step)`: the count is
/// `ceil((stop − start) / step)` and point i is `start + i·step`.
pub fn density_grid(min: f64, max: f64, step: f64) -> Result<Vec<f64>> {
    if !(step.is_finite() && step > 0.0) {
        return Err(RiskError::InvalidParameter(format!(
            "density step must be positive, got {}",
            step
        )));
    }
    if !(min.is_finite() && max.is_finite()) || min > max {
        return Err(RiskError::InvalidParameter(format!(
            "invalid density range [{}, {}]",
            min, max
        )));
    }

    let start = min - step;
    let stop = max + step;
    let count = ((stop - start) / step).ceil() as usize;
    if count > MAX_GRID_POINTS {
        return Err(RiskError::InvalidParameter(format!(
            "density grid would have {} points (step {} too small)",
            count, step
        )));
    }

    Ok((0..count).map(|i| start + i as f64 * step).collect())
}

/// Fitted normal PDF and CDF sampled on a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionCurves {
    pub x: Vec<f64>,
    pub pdf: Vec<f64>,
    pub cdf: Vec<f64>,
}

impl DistributionCurves {
    /// Evaluate N(mean, std²) of `stats` at every grid point
    pub fn evaluate(stats: &SectorStats, grid: Vec<f64>) -> Result<Self> {
        if stats.std == 0.0 {
            return Err(RiskError::DivisionByZero(
                "standard deviation is zero".to_string(),
            ));
        }
        let normal = Normal::new(stats.mean, stats.std)
            .map_err(|e| RiskError::NumericalInstability(e.to_string()))?;

        let pdf = grid.iter().map(|&x| normal.pdf(x)).collect();
        let cdf = grid.iter().map(|&x| normal.cdf(x)).collect();
        Ok(Self { x: grid, pdf, cdf })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Equal-width histogram normalised to a probability density
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Bin edges, `bins + 1` of them
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// `count / (n · bin_width)`, so the bars integrate to one
    pub density: Vec<f64>,
}

impl Histogram {
    /// Bin `sample` into `bins` equal-width bins over its range
    ///
    /// Every bin is half-open except the last, which also holds the maximum.
    /// A sample with a single distinct value is binned over `[v − 0.5, v + 0.5]`.
    pub fn density(sample: &[f64], bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(RiskError::InvalidParameter(
                "histogram needs at least one bin".to_string(),
            ));
        }
        if sample.is_empty() {
            return Err(RiskError::insufficient("cannot bin an empty sample"));
        }
        if sample.iter().any(|x| !x.is_finite()) {
            return Err(RiskError::NumericalInstability(
                "sample contains a non-finite return".to_string(),
            ));
        }

        let (mut first, mut last) = sample
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
        if first == last {
            first -= 0.5;
            last += 0.5;
        }

        let width = (last - first) / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| first + i as f64 * width).collect();
        edges[bins] = last;

        let norm = bins as f64 / (last - first);
        let mut counts = vec![0usize; bins];
        for &x in sample {
            let mut idx = (((x - first) * norm) as usize).min(bins - 1);
            // Rounding in the scaled index can land one bin off the edges.
            if x < edges[idx] {
                idx -= 1;
            } else if idx + 1 < bins && x >= edges[idx + 1] {
                idx += 1;
            }
            counts[idx] += 1;
        }

        let n = sample.len() as f64;
        let density = counts
            .iter()
            .zip(edges.windows(2))
            .map(|(&c, e)| c as f64 / (n * (e[1] - e[0])))
            .collect();

        Ok(Self {
            edges,
            counts,
            density,
        })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Area under the bars (1 up to rounding)
    pub fn area(&self) -> f64 {
        self.density
            .iter()
            .zip(self.edges.windows(2))
            .map(|(d, e)| d * (e[1] - e[0]))
            .sum()
    }
}

/// One vertical VaR line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarMarker {
    pub confidence_level: f64,
    pub method: VarMethod,
    pub value: f64,
}

/// VaR lines of a sector: one per confidence level and method
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VarMarkers {
    pub markers: Vec<VarMarker>,
}

impl VarMarkers {
    pub fn from_metrics(metrics: &RiskMetrics) -> Self {
        let markers = metrics
            .var
            .iter()
            .flat_map(|v| {
                [VarMethod::Parametric, VarMethod::Historical].map(|method| VarMarker {
                    confidence_level: v.confidence_level,
                    method,
                    value: v.value(method),
                })
            })
            .collect();
        Self { markers }
    }

    pub fn iter(&self) -> impl Iterator<Item = &VarMarker> {
        self.markers.iter()
    }

    pub fn find(&self, confidence_level: f64, method: VarMethod) -> Option<&VarMarker> {
        self.markers.iter().find(|m| {
            m.method == method && (m.confidence_level - confidence_level).abs() < 1e-12
        })
    }
}

/// Chart inputs for one sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorDistribution {
    pub sector: String,
    pub histogram: Histogram,
    pub curves: DistributionCurves,
    pub markers: VarMarkers,
}

impl SectorDistribution {
    /// Assemble histogram, fitted curves and VaR lines from a pooled sample
    pub fn build(
        sector: impl Into<String>,
        sample: &[f64],
        stats: &SectorStats,
        metrics: &RiskMetrics,
        bins: usize,
        step: f64,
    ) -> Result<Self> {
        let histogram = Histogram::density(sample, bins)?;
        let min = histogram.edges[0];
        let max = histogram.edges[histogram.bins()];
        let curves = DistributionCurves::evaluate(stats, density_grid(min, max, step)?)?;

        Ok(Self {
            sector: sector.into(),
            histogram,
            curves,
            markers: VarMarkers::from_metrics(metrics),
        })
    }

    /// Smallest and largest x a chart of this sector must show
    pub fn x_range(&self) -> (f64, f64) {
        let lo = self.curves.x.first().copied().unwrap_or(self.histogram.edges[0]);
        let hi = self.curves.x.last().copied().unwrap_or(self.histogram.edges[self.histogram.bins()]);
        self.markers
            .iter()
            .fold((lo, hi), |(lo, hi), m| (lo.min(m.value), hi.max(m.value)))
    }
}
