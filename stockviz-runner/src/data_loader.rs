//! Dataset loading for the runner.
//!
//! Resolves the configured price source into joined long records:
//! 1. `.parquet` → the long price store, already joined
//! 2. `.csv` whose first cell is `date` → a long CSV, already joined
//! 3. any other `.csv` → a wide export, reshaped and joined with the
//!    constituent CSV (which must then be configured)

use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use stockviz_core::backtest::PriceBook;
use stockviz_core::data::{
    read_long_csv, read_wide_csv_path, reshape, CompanyDirectory, DataError, PriceQuery,
    PriceStore,
};
use stockviz_core::domain::{PriceField, PriceRecord};
use thiserror::Error;

use crate::config::DataConfig;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported price file '{}' (expected .csv or .parquet)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("'{}' is a wide export; a companies CSV is required to join sectors", .0.display())]
    MissingCompanies(PathBuf),

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Shape of a price file, decided from its extension and first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceFormat {
    WideCsv,
    LongCsv,
    Parquet,
}

pub fn detect_format(path: &Path) -> Result<PriceFormat, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("parquet") => Ok(PriceFormat::Parquet),
        Some("csv") => {
            let file = File::open(path).map_err(|e| DataError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
            let mut first = String::new();
            BufReader::new(file)
                .read_line(&mut first)
                .map_err(|e| DataError::Io {
                    path: path.display().to_string(),
                    source: e,
                })?;
            let head = first.split(',').next().unwrap_or_default().trim();
            Ok(if head.eq_ignore_ascii_case("date") {
                PriceFormat::LongCsv
            } else {
                PriceFormat::WideCsv
            })
        }
        _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Joined price records plus the constituent directory they came with.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<PriceRecord>,
    /// Empty when the prices were already joined and no companies CSV is set.
    pub companies: CompanyDirectory,
}

impl Dataset {
    pub fn new(records: Vec<PriceRecord>, companies: CompanyDirectory) -> Self {
        Self { records, companies }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct tickers, sorted.
    pub fn tickers(&self) -> Vec<&str> {
        let mut tickers: Vec<&str> = self.records.iter().map(|r| r.ticker.as_str()).collect();
        tickers.sort_unstable();
        tickers.dedup();
        tickers
    }

    /// First and last date present.
    pub fn date_range(&self) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }

    pub fn select(&self, query: &PriceQuery) -> Vec<PriceRecord> {
        query.apply(&self.records)
    }

    pub fn price_book(&self, field: PriceField) -> PriceBook {
        PriceBook::from_records(&self.records, field)
    }
}

/// Load the configured dataset.
pub fn load_dataset(config: &DataConfig) -> Result<Dataset, LoadError> {
    let companies = match &config.companies {
        Some(path) if path.is_file() => Some(CompanyDirectory::from_csv_path(path)?),
        _ => None,
    };
    let format = detect_format(&config.prices)?;

    let records = match format {
        PriceFormat::Parquet => PriceStore::new(&config.prices).load()?,
        PriceFormat::LongCsv => {
            let file = File::open(&config.prices).map_err(|e| DataError::Io {
                path: config.prices.display().to_string(),
                source: e,
            })?;
            read_long_csv(file)?
        }
        PriceFormat::WideCsv => {
            let directory = companies
                .as_ref()
                .ok_or_else(|| LoadError::MissingCompanies(config.prices.clone()))?;
            let wide = read_wide_csv_path(&config.prices)?;
            reshape(&wide, directory)
        }
    };

    let dataset = Dataset::new(records, companies.unwrap_or_default());
    info!(
        "loaded {} price rows for {} tickers from {} ({:?})",
        dataset.records.len(),
        dataset.tickers().len(),
        config.prices.display(),
        format
    );
    Ok(dataset)
}
