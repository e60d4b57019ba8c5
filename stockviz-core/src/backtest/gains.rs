//! Buy-and-hold gain series for a single position.

use std::collections::HashMap;

use super::book::PriceBook;
use super::error::BacktestError;
use crate::domain::{GainPoint, GainSeries, Position};

/// Compute the cumulative gain of `position` under `label`.
///
/// Shares are bought at the first usable price in the window; each later
/// gain is `(price - start_price) * shares`, so the first point is exactly 0.
pub fn gain_series(
    book: &PriceBook,
    position: &Position,
    label: impl Into<String>,
) -> Result<GainSeries, BacktestError> {
    let (start, end) = (position.start_date, position.end_date);
    if start > end {
        return Err(BacktestError::InvalidWindow {
            ticker: position.ticker.clone(),
            start,
            end,
        });
    }

    let mut prices = book.window(&position.ticker, start, end).peekable();
    let &(first_date, start_price) = prices.peek().ok_or_else(|| BacktestError::EmptyWindow {
        ticker: position.ticker.clone(),
        start,
        end,
    })?;
    if start_price <= 0.0 {
        return Err(BacktestError::InvalidStartPrice {
            ticker: position.ticker.clone(),
            date: first_date,
            price: start_price,
        });
    }

    let shares = position.invest_amount / start_price;
    let points = prices
        .map(|(date, price)| GainPoint {
            date,
            gains: (price - start_price) * shares,
        })
        .collect();

    Ok(GainSeries {
        label: label.into(),
        ticker: position.ticker.clone(),
        shares,
        start_price,
        points,
    })
}

/// Series labels: the ticker, then `TICKER #2`, `TICKER #3`, ... for repeats.
pub fn position_labels(positions: &[Position]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    positions
        .iter()
        .map(|p| {
            let n = seen.entry(p.ticker.as_str()).or_insert(0);
            *n += 1;
            if *n == 1 {
                p.ticker.clone()
            } else {
                format!("{} #{}", p.ticker, n)
            }
        })
        .collect()
}
