//! Per-ticker price lookup for one price field.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::domain::{PriceBar, PriceField, PriceRecord};

/// Sorted prices of one field, keyed by ticker.
///
/// Absent and non-finite prices are not observations and are left out.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    field: PriceField,
    series: HashMap<String, BTreeMap<NaiveDate, f64>>,
}

impl PriceBook {
    pub fn new(field: PriceField) -> Self {
        Self {
            field,
            series: HashMap::new(),
        }
    }

    pub fn from_records(records: &[PriceRecord], field: PriceField) -> Self {
        let mut book = Self::new(field);
        for r in records {
            book.insert(&r.ticker, r.date, r.price(field));
        }
        book
    }

    pub fn from_bars(bars: &[PriceBar], field: PriceField) -> Self {
        let mut book = Self::new(field);
        for b in bars {
            book.insert(&b.ticker, b.date, b.get(field));
        }
        book
    }

    /// Record a price; later inserts for the same date win.
    pub fn insert(&mut self, ticker: &str, date: NaiveDate, price: Option<f64>) {
        let series = self.series.entry(ticker.to_string()).or_default();
        if let Some(p) = price.filter(|p| p.is_finite()) {
            series.insert(date, p);
        }
    }

    pub fn field(&self) -> PriceField {
        self.field
    }

    /// True when the ticker appears in the data at all, even without prices.
    pub fn contains(&self, ticker: &str) -> bool {
        self.series.contains_key(ticker)
    }

    /// Whether the ticker has at least one usable price.
    pub fn has_prices(&self, ticker: &str) -> bool {
        self.series.get(ticker).is_some_and(|s| !s.is_empty())
    }

    /// Prices within `[start, end]`, ascending by date.
    pub fn window(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.series
            .get(ticker)
            .filter(|_| start <= end)
            .into_iter()
            .flat_map(move |s| s.range(start..=end).map(|(d, p)| (*d, *p)))
    }

    pub fn tickers(&self) -> Vec<&str> {
        let mut tickers: Vec<&str> = self.series.keys().map(String::as_str).collect();
        tickers.sort_unstable();
        tickers
    }
}
