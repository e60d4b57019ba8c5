//! Portfolio backtest over a list of positions.

use log::{debug, warn};

use super::align::{align_gains, AlignedGains};
use super::book::PriceBook;
use super::error::BacktestError;
use super::gains::{gain_series, position_labels};
use super::inflation::InflationIndex;
use crate::domain::{GainRow, GainSeries, Position};

/// Result of one backtest run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Backtest {
    /// One series per position whose ticker has price data.
    pub series: Vec<GainSeries>,
    /// Series on the union date axis, plus the total.
    pub aligned: AlignedGains,
    /// Tickers skipped because the data has no prices for them.
    pub skipped: Vec<String>,
    /// Whether `aligned` is restated in reference-year dollars.
    pub inflation_adjusted: bool,
}

impl Backtest {
    pub fn rows(&self) -> Vec<GainRow> {
        self.aligned.rows()
    }

    pub fn final_total(&self) -> f64 {
        self.aligned.final_total()
    }

    /// Restate aligned gains in `index`'s reference-year dollars.
    pub fn adjust_for_inflation(mut self, index: &InflationIndex) -> Result<Self, BacktestError> {
        self.aligned = index.deflate_gains(&self.aligned)?;
        self.inflation_adjusted = true;
        Ok(self)
    }
}

/// Compute gains for every position and their aligned total.
///
/// Positions whose ticker has no prices at all are skipped with a warning.
/// A position with prices but none inside its window is an error.
pub fn run_backtest(book: &PriceBook, positions: &[Position]) -> Result<Backtest, BacktestError> {
    let labels = position_labels(positions);
    let mut series = Vec::with_capacity(positions.len());
    let mut skipped = Vec::new();

    for (position, label) in positions.iter().zip(labels) {
        if !book.has_prices(&position.ticker) {
            warn!("skipping {}: no {} prices", position.ticker, book.field());
            skipped.push(position.ticker.clone());
            continue;
        }
        let s = gain_series(book, position, label)?;
        debug!(
            "{}: {:.4} shares at {:.2}, {} points",
            s.label,
            s.shares,
            s.start_price,
            s.points.len()
        );
        series.push(s);
    }

    let aligned = align_gains(&series);
    Ok(Backtest {
        series,
        aligned,
        skipped,
        inflation_adjusted: false,
    })
}
