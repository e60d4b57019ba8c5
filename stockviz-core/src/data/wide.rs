//! Wide price table: one column per (attribute, ticker).
//!
//! This is the shape the price feed exports: a block of ticker columns for
//! each attribute (Adj Close, Close, High, Low, Open, Volume), one row per
//! trading date.

use chrono::NaiveDate;
use std::collections::HashSet;

use super::ingest::DataError;
use crate::domain::PriceField;

/// A single (attribute, ticker) column.
#[derive(Debug, Clone, PartialEq)]
pub struct WideColumn {
    pub field: PriceField,
    pub ticker: String,
    /// One value per entry of the table's `dates`.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WidePriceTable {
    dates: Vec<NaiveDate>,
    columns: Vec<WideColumn>,
}

impl WidePriceTable {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    /// Append a column. Its length must match the date axis and the
    /// (field, ticker) pair must not already exist.
    pub fn push_column(
        &mut self,
        field: PriceField,
        ticker: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), DataError> {
        let ticker = ticker.into();
        if values.len() != self.dates.len() {
            return Err(DataError::Validation(format!(
                "column {field}/{ticker} has {} values for {} dates",
                values.len(),
                self.dates.len()
            )));
        }
        if self.column(field, &ticker).is_some() {
            return Err(DataError::DuplicateColumn {
                field: field.header().to_string(),
                ticker,
            });
        }
        self.columns.push(WideColumn {
            field,
            ticker,
            values,
        });
        Ok(())
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[WideColumn] {
        &self.columns
    }

    pub fn column(&self, field: PriceField, ticker: &str) -> Option<&WideColumn> {
        self.columns
            .iter()
            .find(|c| c.field == field && c.ticker == ticker)
    }

    /// Value at (date, field, ticker); `None` for absent cells and unknown keys.
    pub fn get(&self, date: NaiveDate, field: PriceField, ticker: &str) -> Option<f64> {
        let row = self.dates.iter().position(|d| *d == date)?;
        self.column(field, ticker)?.values[row]
    }

    /// Distinct attributes present, in canonical order.
    pub fn fields(&self) -> Vec<PriceField> {
        let mut fields: Vec<PriceField> = self.columns.iter().map(|c| c.field).collect();
        fields.sort();
        fields.dedup();
        fields
    }

    /// Distinct tickers in order of first appearance.
    pub fn tickers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .filter(|c| seen.insert(c.ticker.as_str()))
            .map(|c| c.ticker.as_str())
            .collect()
    }

    /// Columns of one attribute block, in stored order.
    pub fn block(&self, field: PriceField) -> impl Iterator<Item = &WideColumn> {
        self.columns.iter().filter(move |c| c.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.columns.is_empty()
    }
}
