//! Company directory: S&P 500 constituents keyed by ticker symbol.
//!
//! Loaded from the constituent CSV (`Symbol`, `Security`, `GICS Sector`,
//! ...). Provides symbol lookup for the metadata join and the sector lists
//! behind the dashboard's sector filter.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::ingest::DataError;
use crate::domain::CompanyInfo;

#[derive(Debug, Clone, Default)]
pub struct CompanyDirectory {
    companies: Vec<CompanyInfo>,
    by_symbol: HashMap<String, usize>,
}

impl CompanyDirectory {
    /// Build from rows; the first row wins when a symbol repeats.
    pub fn from_companies(companies: Vec<CompanyInfo>) -> Self {
        let mut by_symbol = HashMap::with_capacity(companies.len());
        for (i, company) in companies.iter().enumerate() {
            by_symbol.entry(company.symbol.clone()).or_insert(i);
        }
        Self {
            companies,
            by_symbol,
        }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let companies = rdr
            .deserialize()
            .collect::<Result<Vec<CompanyInfo>, csv::Error>>()?;
        Ok(Self::from_companies(companies))
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|e| DataError::io(path, e))?;
        Self::from_csv_reader(file)
    }

    pub fn get(&self, symbol: &str) -> Option<&CompanyInfo> {
        self.by_symbol.get(symbol).map(|&i| &self.companies[i])
    }

    pub fn sector_of(&self, symbol: &str) -> Option<&str> {
        self.get(symbol).map(|c| c.sector.as_str())
    }

    pub fn companies(&self) -> &[CompanyInfo] {
        &self.companies
    }

    /// Distinct sectors, sorted.
    pub fn sectors(&self) -> Vec<&str> {
        self.companies
            .iter()
            .map(|c| c.sector.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// All symbols, sorted ascending.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.by_symbol.keys().map(|s| s.as_str()).collect();
        symbols.sort_unstable();
        symbols
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}
