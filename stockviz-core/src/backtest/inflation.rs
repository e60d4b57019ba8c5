//! Consumer price index lookup for restating gains in reference-year dollars.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use super::align::AlignedGains;
use super::error::BacktestError;

/// US CPI-U, all items, annual averages (1982-84 = 100).
const CPI_U_ANNUAL: [(i32, f64); 14] = [
    (2010, 218.056),
    (2011, 224.939),
    (2012, 229.594),
    (2013, 232.957),
    (2014, 236.736),
    (2015, 237.017),
    (2016, 240.007),
    (2017, 245.120),
    (2018, 251.107),
    (2019, 255.657),
    (2020, 258.811),
    (2021, 270.970),
    (2022, 292.655),
    (2023, 304.702),
];

#[derive(Debug, Deserialize)]
struct CpiRow {
    year: i32,
    cpi: f64,
}

/// Year → CPI table with a reference year.
///
/// A value from year `y` is restated as `value * cpi(reference) / cpi(y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct InflationIndex {
    cpi: BTreeMap<i32, f64>,
    reference_year: i32,
}

impl InflationIndex {
    /// Built-in CPI-U table, referenced to its latest year.
    pub fn cpi_u() -> Self {
        let cpi: BTreeMap<i32, f64> = CPI_U_ANNUAL.into_iter().collect();
        let reference_year = CPI_U_ANNUAL[CPI_U_ANNUAL.len() - 1].0;
        Self { cpi, reference_year }
    }

    /// Build from `(year, cpi)` pairs, referenced to the latest year.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i32, f64)>) -> Result<Self, BacktestError> {
        let mut cpi = BTreeMap::new();
        for (year, value) in pairs {
            if !value.is_finite() || value <= 0.0 {
                return Err(BacktestError::InvalidIndex(format!(
                    "CPI for {year} must be positive, got {value}"
                )));
            }
            if cpi.insert(year, value).is_some() {
                return Err(BacktestError::InvalidIndex(format!("year {year} listed twice")));
            }
        }
        let reference_year = *cpi
            .keys()
            .next_back()
            .ok_or_else(|| BacktestError::InvalidIndex("no years".into()))?;
        Ok(Self { cpi, reference_year })
    }

    /// Read a `year,cpi` CSV with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, BacktestError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let rows = rdr
            .deserialize::<CpiRow>()
            .map(|row| row.map(|r| (r.year, r.cpi)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_pairs(rows)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, BacktestError> {
        let file = std::fs::File::open(path).map_err(|source| BacktestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_csv_reader(file)
    }

    /// Re-reference the index; the year must be present.
    pub fn with_reference_year(mut self, year: i32) -> Result<Self, BacktestError> {
        if !self.cpi.contains_key(&year) {
            return Err(BacktestError::MissingInflationYear(year));
        }
        self.reference_year = year;
        Ok(self)
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.cpi.keys().copied()
    }

    pub fn cpi(&self, year: i32) -> Option<f64> {
        self.cpi.get(&year).copied()
    }

    /// Multiplier turning year-`year` dollars into reference-year dollars.
    pub fn factor(&self, year: i32) -> Result<f64, BacktestError> {
        let base = self.cpi(year).ok_or(BacktestError::MissingInflationYear(year))?;
        let reference = self
            .cpi(self.reference_year)
            .ok_or(BacktestError::MissingInflationYear(self.reference_year))?;
        Ok(reference / base)
    }

    pub fn deflate(&self, date: NaiveDate, amount: f64) -> Result<f64, BacktestError> {
        Ok(amount * self.factor(date.year())?)
    }

    /// Restate every aligned gain, total included, by its date's year.
    pub fn deflate_gains(&self, gains: &AlignedGains) -> Result<AlignedGains, BacktestError> {
        gains.try_map(|date, g| self.deflate(date, g))
    }
}

impl Default for InflationIndex {
    fn default() -> Self {
        Self::cpi_u()
    }
}
