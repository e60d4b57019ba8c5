//! Backtest inputs and outputs: positions and gain series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Synthetic series label carrying the per-date sum over all positions.
pub const TOTAL_LABEL: &str = "Total";

/// One buy-and-hold position: `invest_amount` dollars of `ticker` bought at
/// the first price on or after `start_date` and held through `end_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub invest_amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Position {
    pub fn new(
        ticker: impl Into<String>,
        invest_amount: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            invest_amount,
            start_date,
            end_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainPoint {
    pub date: NaiveDate,
    pub gains: f64,
}

/// Cumulative dollar gain of one position over its window.
///
/// The first point is always exactly zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainSeries {
    /// Series label: the ticker, suffixed `#n` when a ticker repeats.
    pub label: String,
    pub ticker: String,
    pub shares: f64,
    pub start_price: f64,
    pub points: Vec<GainPoint>,
}

impl GainSeries {
    pub fn final_gain(&self) -> f64 {
        self.points.last().map(|p| p.gains).unwrap_or(0.0)
    }
}

/// One tidy output row: `(date, label, gains)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainRow {
    pub date: NaiveDate,
    pub label: String,
    pub gains: f64,
}
