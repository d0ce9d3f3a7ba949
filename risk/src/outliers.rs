//! Joint z-score outlier filter
//!
//! A row (trading date) survives only if every ticker's return lies strictly
//! within `n_std` sample standard deviations of that ticker's full-sample
//! mean. One extreme value in any column removes the date for all tickers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, RiskError};
use crate::matrix::ReturnMatrix;
use crate::stats::mean;

/// Default z-score threshold
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// How many filtering passes to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// One pass with mean/std estimated on the input matrix
    #[default]
    SinglePass,
    /// Re-estimate mean/std and filter again until no row is removed
    UntilStable,
}

/// Row-wise outlier filter over a [`ReturnMatrix`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierFilter {
    n_std: f64,
    mode: FilterMode,
}

/// Result of filtering: the surviving matrix and the dates that were dropped
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub matrix: ReturnMatrix,
    pub removed_dates: Vec<NaiveDate>,
    pub passes: usize,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self {
            n_std: DEFAULT_THRESHOLD,
            mode: FilterMode::SinglePass,
        }
    }
}

impl OutlierFilter {
    /// Create a filter; the threshold must be positive and finite
    pub fn new(n_std: f64) -> Result<Self> {
        if !(n_std.is_finite() && n_std > 0.0) {
            return Err(RiskError::InvalidParameter(format!(
                "outlier threshold must be a positive number of standard deviations, got {}",
                n_std
            )));
        }
        Ok(Self {
            n_std,
            mode: FilterMode::SinglePass,
        })
    }

    pub fn with_mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.n_std
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Filter a matrix, returning only the surviving matrix
    pub fn apply(&self, matrix: &ReturnMatrix) -> ReturnMatrix {
        self.filter(matrix).matrix
    }

    /// Filter a matrix and report what was removed
    pub fn filter(&self, matrix: &ReturnMatrix) -> FilterOutcome {
        let mut current = matrix.clone();
        let mut removed_dates = Vec::new();
        let mut passes = 0;

        loop {
            let keep = self.keep_mask(&current);
            passes += 1;

            let removed: Vec<NaiveDate> = current
                .dates()
                .iter()
                .zip(&keep)
                .filter(|(_, keep)| !**keep)
                .map(|(date, _)| *date)
                .collect();

            if removed.is_empty() {
                break;
            }

            current = current.retain_rows(&keep);
            removed_dates.extend(removed);

            if self.mode == FilterMode::SinglePass {
                break;
            }
        }

        removed_dates.sort();
        debug!(
            threshold = self.n_std,
            passes,
            removed = removed_dates.len(),
            remaining = current.len(),
            "outlier filter applied"
        );

        FilterOutcome {
            matrix: current,
            removed_dates,
            passes,
        }
    }

    /// One flag per row: true when every |z| is below the threshold
    fn keep_mask(&self, matrix: &ReturnMatrix) -> Vec<bool> {
        // Dispersion is undefined below two rows, nothing can be an outlier.
        if matrix.len() < 2 {
            return vec![true; matrix.len()];
        }

        let moments: Vec<(f64, f64)> = (0..matrix.width())
            .map(|i| {
                let column = matrix.column_at(i);
                let m = mean(&column);
                let var = column.iter().map(|x| (x - m).powi(2)).sum::<f64>()
                    / (column.len() - 1) as f64;
                (m, var.sqrt())
            })
            .collect();

        matrix
            .rows()
            .map(|(_, row)| {
                row.iter().zip(&moments).all(|(r, (m, s))| {
                    // A constant column holds no outlier.
                    let z = if *s > 0.0 { (r - m) / s } else { 0.0 };
                    z.abs() < self.n_std
                })
            })
            .collect()
    }
}
