//! Row selection over joined price records.
//!
//! The dashboard narrows records three ways: by ticker set, by sector set
//! and by an inclusive date range. `None` means "no constraint".

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::domain::PriceRecord;
use crate::tickers::is_market_selection;

/// Label of the catch-all sector option.
pub const ALL_SECTORS: &str = "All";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceQuery {
    pub tickers: Option<Vec<String>>,
    pub sectors: Option<Vec<String>>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl PriceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tickers<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tickers = Some(tickers.into_iter().map(Into::into).collect());
        self
    }

    pub fn sectors<I, S>(mut self, sectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sectors = Some(sectors.into_iter().map(Into::into).collect());
        self
    }

    /// Inclusive on both ends.
    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn matches(&self, record: &PriceRecord) -> bool {
        if let Some(tickers) = &self.tickers {
            if !tickers.iter().any(|t| *t == record.ticker) {
                return false;
            }
        }
        if let Some(sectors) = &self.sectors {
            if !sectors.iter().any(|s| *s == record.sector) {
                return false;
            }
        }
        if self.start.is_some_and(|start| record.date < start) {
            return false;
        }
        if self.end.is_some_and(|end| record.date > end) {
            return false;
        }
        true
    }

    pub fn apply(&self, records: &[PriceRecord]) -> Vec<PriceRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Sector filter choices for a ticker selection, sorted and prefixed with `All`.
///
/// A whole-market selection, or no selection at all, offers every sector in
/// the data; otherwise only the sectors the selected tickers belong to.
pub fn sector_options(records: &[PriceRecord], tickers: &[String]) -> Vec<String> {
    let whole_market = tickers.is_empty() || is_market_selection(tickers);
    let sectors: BTreeSet<&str> = records
        .iter()
        .filter(|r| whole_market || tickers.contains(&r.ticker))
        .map(|r| r.sector.as_str())
        .collect();

    std::iter::once(ALL_SECTORS.to_string())
        .chain(sectors.into_iter().map(String::from))
        .collect()
}

/// Resolve a sector choice into the concrete sector constraint.
///
/// `All` expands to every option offered; any other choice stands alone.
pub fn resolve_sector_choice(choice: &str, options: &[String]) -> Vec<String> {
    if choice == ALL_SECTORS {
        options
            .iter()
            .filter(|s| *s != ALL_SECTORS)
            .cloned()
            .collect()
    } else {
        vec![choice.to_string()]
    }
}
