//! Chart selection by ticker count.
//!
//! | selection                     | chart                         |
//! |-------------------------------|-------------------------------|
//! | exactly `SP500` / `FULL`      | aggregate over every row      |
//! | one ticker                    | candlestick of that ticker    |
//! | 2..=5 tickers                 | one line per ticker           |
//! | none                          | aggregate over every row      |
//! | more than 5                   | aggregate over every row      |
//!
//! "Every row" means every row handed to [`ChartKind::build`], which the
//! caller has already narrowed by sector and date. A large selection only
//! shapes the sector choices; it does not restrict the aggregate.

use log::debug;
use serde::{Deserialize, Serialize};

use super::builders::{aggregate_chart, candlestick_chart, comparison_chart, ChartError};
use super::options::{AggregateOp, ChartOptions};
use super::spec::ChartSpec;
use crate::domain::{PriceField, PriceRecord};
use crate::tickers::is_market_selection;

/// Largest selection still drawn as one line per ticker.
pub const MAX_COMPARISON_TICKERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "chart")]
pub enum ChartKind {
    Candlestick {
        ticker: String,
    },
    Comparison {
        tickers: Vec<String>,
        field: PriceField,
    },
    Aggregate {
        field: PriceField,
        op: AggregateOp,
    },
}

/// Pick the chart variant for a ticker selection.
pub fn select_chart(tickers: &[String], options: &ChartOptions) -> ChartKind {
    let aggregate = || ChartKind::Aggregate {
        field: options.price_field,
        op: options.aggregate,
    };
    let kind = match tickers {
        _ if is_market_selection(tickers) => aggregate(),
        [only] => ChartKind::Candlestick {
            ticker: only.clone(),
        },
        many if (2..=MAX_COMPARISON_TICKERS).contains(&many.len()) => ChartKind::Comparison {
            tickers: many.to_vec(),
            field: options.price_field,
        },
        _ => aggregate(),
    };
    debug!("{} ticker(s) selected -> {}", tickers.len(), kind.name());
    kind
}

impl ChartKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Candlestick { .. } => "candlestick",
            ChartKind::Comparison { .. } => "comparison",
            ChartKind::Aggregate { .. } => "aggregate",
        }
    }

    /// Build the chart from already date/sector-filtered records.
    pub fn build(
        &self,
        records: &[PriceRecord],
        options: &ChartOptions,
    ) -> Result<ChartSpec, ChartError> {
        match self {
            ChartKind::Candlestick { ticker } => {
                let rows: Vec<&PriceRecord> =
                    records.iter().filter(|r| r.ticker == *ticker).collect();
                candlestick_chart(&rows, options)
            }
            ChartKind::Comparison { tickers, field } => {
                let rows: Vec<&PriceRecord> =
                    records.iter().filter(|r| tickers.contains(&r.ticker)).collect();
                comparison_chart(&rows, *field, options)
            }
            ChartKind::Aggregate { field, op } => {
                let rows: Vec<&PriceRecord> = records.iter().collect();
                aggregate_chart(&rows, *field, *op, options)
            }
        }
    }
}

/// `select_chart` followed by `build`.
pub fn stock_chart(
    records: &[PriceRecord],
    tickers: &[String],
    options: &ChartOptions,
) -> Result<ChartSpec, ChartError> {
    select_chart(tickers, options).build(records, options)
}
