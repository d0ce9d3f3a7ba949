//! Date-aligned return matrix
//!
//! A [`ReturnMatrix`] holds one row of log returns per trading date and one
//! column per ticker. Only dates on which every ticker has a return survive
//! the join, so a missing observation in any column drops the whole row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{Result, RiskError};
use crate::series::{ReturnSeries, Ticker};

/// Log returns indexed by (date, ticker), inner-joined on date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnMatrix {
    tickers: Vec<Ticker>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<f64>>,
}

impl ReturnMatrix {
    /// Inner-join return series on date
    ///
    /// Column order follows the order of `series`; rows are ascending by date.
    pub fn join(series: &[ReturnSeries]) -> Result<Self> {
        let first = series
            .first()
            .ok_or_else(|| RiskError::insufficient("no return series to join"))?;

        let mut seen = HashSet::new();
        for s in series {
            if !seen.insert(s.ticker()) {
                return Err(RiskError::InvalidParameter(format!(
                    "ticker {} appears more than once",
                    s.ticker()
                )));
            }
        }

        let lookups: Vec<HashMap<NaiveDate, f64>> = series
            .iter()
            .map(|s| s.points().iter().map(|p| (p.date, p.value)).collect())
            .collect();

        let dates: Vec<NaiveDate> = first
            .points()
            .iter()
            .map(|p| p.date)
            .filter(|date| lookups.iter().all(|l| l.contains_key(date)))
            .collect();

        let rows = dates
            .iter()
            .map(|date| lookups.iter().map(|l| l[date]).collect())
            .collect();

        Ok(Self {
            tickers: series.iter().map(|s| s.ticker().clone()).collect(),
            dates,
            rows,
        })
    }

    /// Build a matrix from raw parts
    ///
    /// Dates must be strictly increasing and every row must have one value
    /// per ticker.
    pub fn from_rows(tickers: Vec<Ticker>, dates: Vec<NaiveDate>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if dates.len() != rows.len() {
            return Err(RiskError::InvalidParameter(format!(
                "{} dates for {} rows",
                dates.len(),
                rows.len()
            )));
        }
        if let Some(row) = rows.iter().find(|r| r.len() != tickers.len()) {
            return Err(RiskError::InvalidParameter(format!(
                "row of width {} in a matrix of {} tickers",
                row.len(),
                tickers.len()
            )));
        }
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(RiskError::InvalidParameter(
                "dates must be strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            tickers,
            dates,
            rows,
        })
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of aligned dates
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of tickers
    pub fn width(&self) -> usize {
        self.tickers.len()
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Iterate rows as (date, returns in ticker order)
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &[f64])> + '_ {
        self.dates
            .iter()
            .copied()
            .zip(self.rows.iter().map(Vec::as_slice))
    }

    pub fn column_index(&self, ticker: &Ticker) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    /// All returns of one ticker, ascending by date
    pub fn column(&self, ticker: &Ticker) -> Result<Vec<f64>> {
        let index = self
            .column_index(ticker)
            .ok_or_else(|| RiskError::UnknownTicker(ticker.clone()))?;
        Ok(self.column_at(index))
    }

    pub(crate) fn column_at(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[index]).collect()
    }

    /// Sub-matrix restricted to `tickers`, in the given order
    pub fn select(&self, tickers: &[Ticker]) -> Result<Self> {
        let indices = tickers
            .iter()
            .map(|t| {
                self.column_index(t)
                    .ok_or_else(|| RiskError::UnknownTicker(t.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            tickers: tickers.to_vec(),
            dates: self.dates.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i]).collect())
                .collect(),
        })
    }

    /// New matrix holding only the rows whose flag is set
    pub(crate) fn retain_rows(&self, keep: &[bool]) -> Self {
        let (dates, rows) = self
            .dates
            .iter()
            .zip(&self.rows)
            .zip(keep)
            .filter(|(_, keep)| **keep)
            .map(|((date, row), _)| (*date, row.clone()))
            .unzip();

        Self {
            tickers: self.tickers.clone(),
            dates,
            rows,
        }
    }
}
