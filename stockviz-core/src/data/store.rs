//! Parquet price store: the long, joined price table on disk.
//!
//! One file holds every (date, ticker) record. Reads can be narrowed with a
//! [`PriceQuery`]; ticker and date constraints are pushed into a lazy scan so
//! only matching rows are materialized.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use super::ingest::DataError;
use super::query::PriceQuery;
use super::schema::PriceSchema;
use crate::domain::PriceRecord;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn to_epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

fn from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + EPOCH_DAYS_FROM_CE)
}

pub struct PriceStore {
    path: PathBuf,
}

impl PriceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write all records, replacing the store.
    ///
    /// Writes are atomic: write to .tmp then rename.
    pub fn write(&self, records: &[PriceRecord]) -> Result<(), DataError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
        }

        let mut df = records_to_dataframe(records)?;
        let tmp_path = self.path.with_extension("parquet.tmp");
        let file = fs::File::create(&tmp_path).map_err(|e| DataError::io(&tmp_path, e))?;
        ParquetWriter::new(file)
            .finish(&mut df)
            .map_err(|e| DataError::Parquet(format!("write parquet: {e}")))?;

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::io(&self.path, e)
        })?;
        Ok(())
    }

    /// Load every record.
    pub fn load(&self) -> Result<Vec<PriceRecord>, DataError> {
        let file = fs::File::open(&self.path).map_err(|e| DataError::io(&self.path, e))?;
        let df = ParquetReader::new(file)
            .finish()
            .map_err(|e| DataError::Parquet(format!("read: {e}")))?;
        PriceSchema::validate(&df).map_err(|e| DataError::Validation(e.to_string()))?;
        dataframe_to_records(&df)
    }

    /// Load the records matching `query`.
    ///
    /// Ticker and date constraints filter inside the scan; the sector
    /// constraint is applied to the materialized rows.
    pub fn scan(&self, query: &PriceQuery) -> Result<Vec<PriceRecord>, DataError> {
        let mut lf = LazyFrame::scan_parquet(&self.path, Default::default())
            .map_err(|e| DataError::Parquet(format!("scan: {e}")))?;
        if let Some(predicate) = scan_predicate(query) {
            lf = lf.filter(predicate);
        }
        let df = lf
            .collect()
            .map_err(|e| DataError::Parquet(format!("collect: {e}")))?;
        PriceSchema::validate(&df).map_err(|e| DataError::Validation(e.to_string()))?;

        let records = dataframe_to_records(&df)?;
        Ok(match &query.sectors {
            Some(_) => records.into_iter().filter(|r| query.matches(r)).collect(),
            None => records,
        })
    }
}

fn scan_predicate(query: &PriceQuery) -> Option<Expr> {
    let mut parts: Vec<Expr> = Vec::new();

    if let Some(tickers) = &query.tickers {
        let any_ticker = tickers
            .iter()
            .map(|t| col("ticker").eq(lit(t.as_str())))
            .reduce(|acc, e| acc.or(e))
            // An empty ticker set selects nothing.
            .unwrap_or_else(|| lit(false));
        parts.push(any_ticker);
    }
    if let Some(start) = query.start {
        parts.push(col("date").cast(DataType::Int32).gt_eq(lit(to_epoch_days(start))));
    }
    if let Some(end) = query.end {
        parts.push(col("date").cast(DataType::Int32).lt_eq(lit(to_epoch_days(end))));
    }

    parts.into_iter().reduce(|acc, e| acc.and(e))
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

/// Convert price records to a Polars DataFrame.
fn records_to_dataframe(records: &[PriceRecord]) -> Result<DataFrame, DataError> {
    let dates: Vec<i32> = records.iter().map(|r| to_epoch_days(r.date)).collect();
    let tickers: Vec<&str> = records.iter().map(|r| r.ticker.as_str()).collect();
    let adj_closes: Vec<Option<f64>> = records.iter().map(|r| r.adj_close).collect();
    let closes: Vec<Option<f64>> = records.iter().map(|r| r.close).collect();
    let highs: Vec<Option<f64>> = records.iter().map(|r| r.high).collect();
    let lows: Vec<Option<f64>> = records.iter().map(|r| r.low).collect();
    let opens: Vec<Option<f64>> = records.iter().map(|r| r.open).collect();
    let volumes: Vec<Option<f64>> = records.iter().map(|r| r.volume).collect();
    let sectors: Vec<&str> = records.iter().map(|r| r.sector.as_str()).collect();
    let securities: Vec<&str> = records.iter().map(|r| r.security.as_str()).collect();
    let sub_industries: Vec<Option<&str>> =
        records.iter().map(|r| r.sub_industry.as_deref()).collect();

    DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| DataError::Parquet(format!("date cast: {e}")))?,
        Column::new("ticker".into(), tickers),
        Column::new("adj_close".into(), adj_closes),
        Column::new("close".into(), closes),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("open".into(), opens),
        Column::new("volume".into(), volumes),
        Column::new("sector".into(), sectors),
        Column::new("security".into(), securities),
        Column::new("sub_industry".into(), sub_industries),
    ])
    .map_err(|e| DataError::Parquet(format!("dataframe creation: {e}")))
}

/// Convert a DataFrame back to price records.
fn dataframe_to_records(df: &DataFrame) -> Result<Vec<PriceRecord>, DataError> {
    let map_err = |e: PolarsError| DataError::Parquet(format!("column read: {e}"));

    let date_ca = df.column("date").map_err(map_err)?.date().map_err(map_err)?;
    let ticker_ca = df.column("ticker").map_err(map_err)?.str().map_err(map_err)?;
    let adj_ca = df.column("adj_close").map_err(map_err)?.f64().map_err(map_err)?;
    let close_ca = df.column("close").map_err(map_err)?.f64().map_err(map_err)?;
    let high_ca = df.column("high").map_err(map_err)?.f64().map_err(map_err)?;
    let low_ca = df.column("low").map_err(map_err)?.f64().map_err(map_err)?;
    let open_ca = df.column("open").map_err(map_err)?.f64().map_err(map_err)?;
    let vol_ca = df.column("volume").map_err(map_err)?.f64().map_err(map_err)?;
    let sector_ca = df.column("sector").map_err(map_err)?.str().map_err(map_err)?;
    let security_ca = df.column("security").map_err(map_err)?.str().map_err(map_err)?;
    let sub_ca = df.column("sub_industry").map_err(map_err)?.str().map_err(map_err)?;

    let n = df.height();
    let mut records = Vec::with_capacity(n);

    for i in 0..n {
        let date = date_ca
            .get(i)
            .and_then(from_epoch_days)
            .ok_or_else(|| DataError::Parquet(format!("null or invalid date at row {i}")))?;
        let ticker = ticker_ca
            .get(i)
            .ok_or_else(|| DataError::Parquet(format!("null ticker at row {i}")))?;

        records.push(PriceRecord {
            date,
            ticker: ticker.to_string(),
            adj_close: adj_ca.get(i),
            close: close_ca.get(i),
            high: high_ca.get(i),
            low: low_ca.get(i),
            open: open_ca.get(i),
            volume: vol_ca.get(i),
            sector: sector_ca.get(i).unwrap_or_default().to_string(),
            security: security_ca.get(i).unwrap_or_default().to_string(),
            sub_industry: sub_ca.get(i).map(String::from),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ticker: &str, sector: &str, day: u32, close: Option<f64>) -> PriceRecord {
        PriceRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            ticker: ticker.into(),
            adj_close: close,
            close,
            high: close.map(|c| c + 1.0),
            low: close.map(|c| c - 1.0),
            open: close,
            volume: Some(1_000.0),
            sector: sector.into(),
            security: format!("{ticker} Corp"),
            sub_industry: None,
        }
    }

    fn sample() -> Vec<PriceRecord> {
        vec![
            record("AAPL", "Information Technology", 2, Some(185.6)),
            record("AAPL", "Information Technology", 3, Some(184.3)),
            record("XOM", "Energy", 2, Some(102.1)),
            record("XOM", "Energy", 3, None),
        ]
    }

    #[test]
    fn epoch_days_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(to_epoch_days(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
        assert_eq!(to_epoch_days(date), 19724);
        assert_eq!(from_epoch_days(19724), Some(date));
    }

    #[test]
    fn write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = PriceStore::new(dir.path().join("prices.parquet"));
        store.write(&sample()).unwrap();

        assert!(store.exists());
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn scan_filters_tickers_and_dates() {
        let dir = tempfile::tempdir().unwrap();
        let store = PriceStore::new(dir.path().join("nested/prices.parquet"));
        store.write(&sample()).unwrap();

        let day3 = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let hits = store
            .scan(&PriceQuery::new().tickers(["XOM"]).between(day3, day3))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].ticker, "XOM");
        assert_eq!(hits[0].close, None);
    }

    #[test]
    fn scan_filters_sectors_after_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = PriceStore::new(dir.path().join("prices.parquet"));
        store.write(&sample()).unwrap();

        let hits = store.scan(&PriceQuery::new().sectors(["Energy"])).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|r| r.sector == "Energy"));
    }

    #[test]
    fn empty_ticker_set_selects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = PriceStore::new(dir.path().join("prices.parquet"));
        store.write(&sample()).unwrap();

        let hits = store
            .scan(&PriceQuery::new().tickers(Vec::<String>::new()))
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = PriceStore::new(dir.path().join("absent.parquet"));
        assert!(matches!(store.load().unwrap_err(), DataError::Io { .. }));
    }
}
