//! Wide ↔ long reshaping and the company metadata join.
//!
//! `melt` turns each attribute block of a wide table into (date, ticker)
//! rows and combines the blocks side by side, so every row carries all of
//! its attributes. `widen` is the inverse.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap, HashSet};

use super::companies::CompanyDirectory;
use super::ingest::DataError;
use super::wide::WidePriceTable;
use crate::domain::{PriceBar, PriceField, PriceRecord};

/// Long price rows plus the set of attributes the source carried.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LongPrices {
    /// Attributes present in the source, in canonical order.
    pub fields: Vec<PriceField>,
    /// One row per (date, ticker), ticker-major, dates in the wide table's order.
    pub rows: Vec<PriceBar>,
}

impl LongPrices {
    /// Rebuild the wide table: attribute blocks in canonical order, tickers
    /// in first-appearance order within every block, dates ascending.
    pub fn widen(&self) -> Result<WidePriceTable, DataError> {
        let dates: Vec<NaiveDate> = self
            .rows
            .iter()
            .map(|r| r.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut seen = HashSet::new();
        let tickers: Vec<&str> = self
            .rows
            .iter()
            .filter(|r| seen.insert(r.ticker.as_str()))
            .map(|r| r.ticker.as_str())
            .collect();

        let lookup: HashMap<(NaiveDate, &str), &PriceBar> = self
            .rows
            .iter()
            .map(|r| ((r.date, r.ticker.as_str()), r))
            .collect();

        let mut wide = WidePriceTable::new(dates.clone());
        for &field in &self.fields {
            for &ticker in &tickers {
                let values = dates
                    .iter()
                    .map(|d| lookup.get(&(*d, ticker)).and_then(|r| r.get(field)))
                    .collect();
                wide.push_column(field, ticker, values)?;
            }
        }
        Ok(wide)
    }

    pub fn tickers(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|r| r.ticker.as_str()).collect()
    }
}

/// Melt every attribute block into long rows and combine them on (date, ticker).
///
/// Blocks are combined outer-wise: a ticker present in only some blocks
/// still gets a row, with the missing attributes absent.
pub fn melt(wide: &WidePriceTable) -> LongPrices {
    let fields = wide.fields();
    let mut rows: Vec<PriceBar> = Vec::new();
    let mut index: HashMap<(NaiveDate, String), usize> = HashMap::new();

    for &field in &fields {
        for column in wide.block(field) {
            for (date, value) in wide.dates().iter().zip(&column.values) {
                let key = (*date, column.ticker.clone());
                let slot = *index.entry(key).or_insert_with(|| {
                    rows.push(PriceBar::empty(*date, column.ticker.clone()));
                    rows.len() - 1
                });
                rows[slot].set(field, *value);
            }
        }
    }

    LongPrices { fields, rows }
}

/// Inner-join long rows with company metadata on the exact ticker symbol.
///
/// Rows for tickers missing from the directory are dropped.
pub fn join_companies(long: &LongPrices, directory: &CompanyDirectory) -> Vec<PriceRecord> {
    long.rows
        .iter()
        .filter_map(|bar| {
            let company = directory.get(&bar.ticker)?;
            Some(PriceRecord {
                date: bar.date,
                ticker: bar.ticker.clone(),
                adj_close: bar.adj_close,
                close: bar.close,
                high: bar.high,
                low: bar.low,
                open: bar.open,
                volume: bar.volume,
                sector: company.sector.clone(),
                security: company.security.clone(),
                sub_industry: company.sub_industry.clone(),
            })
        })
        .collect()
}

/// `melt` followed by `join_companies`.
pub fn reshape(wide: &WidePriceTable, directory: &CompanyDirectory) -> Vec<PriceRecord> {
    join_companies(&melt(wide), directory)
}
