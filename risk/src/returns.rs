//! Log return construction
//!
//! Converts closing prices into daily log returns `ln(P_t / P_{t-1})` and
//! aligns several instruments into a [`ReturnMatrix`].

use tracing::debug;

use crate::error::{Result, RiskError};
use crate::matrix::ReturnMatrix;
use crate::series::{Period, PriceSeries, ReturnPoint, ReturnSeries};

/// Builds log return series from price series
#[derive(Debug, Clone, Default)]
pub struct ReturnSeriesBuilder {
    period: Option<Period>,
}

impl ReturnSeriesBuilder {
    /// Builder that uses every price it is given
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder that ignores prices dated outside `period`
    pub fn with_period(period: Period) -> Self {
        Self {
            period: Some(period),
        }
    }

    /// Derive the log return series of one instrument
    ///
    /// The first price has no predecessor and yields no return. Fails with
    /// [`RiskError::InvalidPrice`] on a zero, negative or non-finite price and
    /// with [`RiskError::InsufficientData`] when fewer than two prices fall in
    /// the period.
    pub fn build(&self, prices: &PriceSeries) -> Result<ReturnSeries> {
        let ticker = prices.ticker();
        let in_range: Vec<_> = prices
            .points()
            .iter()
            .filter(|p| self.period.map_or(true, |period| period.contains(p.date)))
            .collect();

        if let Some(bad) = in_range.iter().find(|p| !(p.close.is_finite() && p.close > 0.0)) {
            return Err(RiskError::InvalidPrice {
                ticker: ticker.clone(),
                date: bad.date,
                price: bad.close,
            });
        }

        if in_range.len() < 2 {
            return Err(RiskError::insufficient_for(
                ticker,
                format!("{} price(s) in range, need at least 2", in_range.len()),
            ));
        }

        let points = in_range
            .windows(2)
            .map(|w| ReturnPoint {
                date: w[1].date,
                value: (w[1].close / w[0].close).ln(),
            })
            .collect::<Vec<_>>();

        debug!(ticker = %ticker, returns = points.len(), "built log return series");
        Ok(ReturnSeries::from_points(ticker.clone(), points))
    }

    /// Build every series and inner-join them on date
    pub fn build_matrix(&self, prices: &[PriceSeries]) -> Result<ReturnMatrix> {
        let series = prices
            .iter()
            .map(|p| self.build(p))
            .collect::<Result<Vec<_>>>()?;

        let matrix = ReturnMatrix::join(&series)?;
        if matrix.is_empty() {
            return Err(RiskError::insufficient(
                "no date has a return for every ticker",
            ));
        }

        debug!(
            tickers = matrix.width(),
            dates = matrix.len(),
            "aligned return matrix"
        );
        Ok(matrix)
    }
}
