//! CSV ingestion for the price feed's wide export and for long tables.
//!
//! Wide export layout (three header rows, then one row per date):
//!
//! ```text
//! Price,Adj Close,Adj Close,Close,Close,...
//! Ticker,AAPL,MSFT,AAPL,MSFT,...
//! Date,,,,,...
//! 2014-01-02,17.27,31.53,19.75,37.16,...
//! ```
//!
//! The third row is optional. Date cells may carry a time component, which
//! is dropped. Dates keep their file order and must not repeat. Empty and
//! `NaN` cells are absent values.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

use super::wide::WidePriceTable;
use crate::domain::{PriceField, PriceRecord};

/// Structured error types for data ingestion, reshaping and storage.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing header row: {0}")]
    MissingHeader(&'static str),

    #[error("unknown price attribute '{header}' in column {column}")]
    UnknownAttribute { column: usize, header: String },

    #[error("duplicate column {field}/{ticker}")]
    DuplicateColumn { field: String, ticker: String },

    #[error("row {row}: invalid date '{value}'")]
    BadDate { row: usize, value: String },

    #[error("row {row}: date {date} already appeared")]
    DuplicateDate { row: usize, date: NaiveDate },

    #[error("row {row}, column {column}: invalid number '{value}'")]
    BadNumber {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("row {row}: expected {expected} cells, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("parquet error: {0}")]
    Parquet(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl DataError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Parse a calendar date, dropping any time component (`2014-01-02 00:00:00-05:00`).
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_cell(raw: &str, row: usize, column: usize) -> Result<Option<f64>, DataError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| DataError::BadNumber {
            row,
            column,
            value: raw.to_string(),
        })
}

/// Read a wide price export.
pub fn read_wide_csv<R: Read>(reader: R) -> Result<WidePriceTable, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = rdr.records();

    let attributes = records
        .next()
        .ok_or(DataError::MissingHeader("attribute row"))??;
    let tickers = records
        .next()
        .ok_or(DataError::MissingHeader("ticker row"))??;

    let width = attributes.len();
    if tickers.len() != width {
        return Err(DataError::RaggedRow {
            row: 2,
            expected: width,
            found: tickers.len(),
        });
    }

    let mut layout = Vec::with_capacity(width.saturating_sub(1));
    for column in 1..width {
        let header = attributes.get(column).unwrap_or_default();
        let field = header
            .parse::<PriceField>()
            .map_err(|_| DataError::UnknownAttribute {
                column,
                header: header.to_string(),
            })?;
        let ticker = tickers.get(column).unwrap_or_default().trim().to_string();
        layout.push((field, ticker));
    }

    let mut dates = Vec::new();
    let mut seen_dates = HashSet::new();
    let mut cells: Vec<Vec<Option<f64>>> = vec![Vec::new(); layout.len()];

    for (offset, record) in records.enumerate() {
        let record = record?;
        let row = offset + 3;
        let first = record.get(0).unwrap_or_default().trim();

        // Index-name row written under the ticker row.
        if first.eq_ignore_ascii_case("date")
            && record.iter().skip(1).all(|c| c.trim().is_empty())
        {
            continue;
        }
        if record.len() != width {
            return Err(DataError::RaggedRow {
                row,
                expected: width,
                found: record.len(),
            });
        }

        let date = parse_calendar_date(first).ok_or_else(|| DataError::BadDate {
            row,
            value: first.to_string(),
        })?;
        if !seen_dates.insert(date) {
            return Err(DataError::DuplicateDate { row, date });
        }
        dates.push(date);

        for (column, slot) in cells.iter_mut().enumerate() {
            let raw = record.get(column + 1).unwrap_or_default();
            slot.push(parse_cell(raw, row, column + 1)?);
        }
    }

    let mut table = WidePriceTable::new(dates);
    for ((field, ticker), values) in layout.into_iter().zip(cells) {
        table.push_column(field, ticker, values)?;
    }
    Ok(table)
}

/// Read a wide price export from disk.
pub fn read_wide_csv_path(path: &Path) -> Result<WidePriceTable, DataError> {
    let file = File::open(path).map_err(|e| DataError::io(path, e))?;
    read_wide_csv(file)
}

/// Write a wide table in the export layout read by [`read_wide_csv`].
pub fn write_wide_csv<W: Write>(table: &WidePriceTable, writer: W) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut attributes = vec!["Price".to_string()];
    let mut tickers = vec!["Ticker".to_string()];
    let mut index_row = vec!["Date".to_string()];
    for column in table.columns() {
        attributes.push(column.field.header().to_string());
        tickers.push(column.ticker.clone());
        index_row.push(String::new());
    }
    wtr.write_record(&attributes)?;
    wtr.write_record(&tickers)?;
    wtr.write_record(&index_row)?;

    for (row, date) in table.dates().iter().enumerate() {
        let mut record = Vec::with_capacity(table.columns().len() + 1);
        record.push(date.to_string());
        for column in table.columns() {
            record.push(column.values[row].map(|v| v.to_string()).unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush().map_err(|e| DataError::Io {
        path: "<writer>".into(),
        source: e,
    })?;
    Ok(())
}

/// Write joined price records as a long CSV (one row per date and ticker).
pub fn write_long_csv<W: Write>(records: &[PriceRecord], writer: W) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush().map_err(|e| DataError::Io {
        path: "<writer>".into(),
        source: e,
    })?;
    Ok(())
}

/// Read a long CSV written by [`write_long_csv`].
pub fn read_long_csv<R: Read>(reader: R) -> Result<Vec<PriceRecord>, DataError> {
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.deserialize()
        .map(|r| r.map_err(DataError::from))
        .collect()
}
