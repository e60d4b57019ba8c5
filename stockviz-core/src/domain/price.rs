//! Price rows: the long/tidy form of the price feed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One value attribute of the price feed.
///
/// Variant order matches the alphabetical order of the feed's attribute
/// headers, which is the canonical block order of a wide table.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    AdjClose,
    #[default]
    Close,
    High,
    Low,
    Open,
    Volume,
}

impl PriceField {
    pub const ALL: [PriceField; 6] = [
        PriceField::AdjClose,
        PriceField::Close,
        PriceField::High,
        PriceField::Low,
        PriceField::Open,
        PriceField::Volume,
    ];

    /// Column name in long tables and chart data.
    pub fn column(self) -> &'static str {
        match self {
            PriceField::AdjClose => "adj_close",
            PriceField::Close => "close",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Open => "open",
            PriceField::Volume => "volume",
        }
    }

    /// Attribute header as written in the wide CSV export.
    pub fn header(self) -> &'static str {
        match self {
            PriceField::AdjClose => "Adj Close",
            PriceField::Close => "Close",
            PriceField::High => "High",
            PriceField::Low => "Low",
            PriceField::Open => "Open",
            PriceField::Volume => "Volume",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown price field '{0}' (expected one of: adj_close, close, high, low, open, volume)")]
pub struct UnknownPriceField(pub String);

impl FromStr for PriceField {
    type Err = UnknownPriceField;

    /// Accepts both the column form (`adj_close`) and the header form (`Adj Close`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        PriceField::ALL
            .into_iter()
            .find(|f| f.column() == normalized)
            .ok_or_else(|| UnknownPriceField(s.to_string()))
    }
}

/// One (date, ticker) row of the price feed before company metadata is joined.
///
/// Absent cells (ticker not yet listed, feed gaps) are `None`, never NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub ticker: String,
    pub adj_close: Option<f64>,
    pub close: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub open: Option<f64>,
    pub volume: Option<f64>,
}

impl PriceBar {
    pub fn empty(date: NaiveDate, ticker: impl Into<String>) -> Self {
        Self {
            date,
            ticker: ticker.into(),
            adj_close: None,
            close: None,
            high: None,
            low: None,
            open: None,
            volume: None,
        }
    }

    pub fn get(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::AdjClose => self.adj_close,
            PriceField::Close => self.close,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Open => self.open,
            PriceField::Volume => self.volume,
        }
    }

    pub fn set(&mut self, field: PriceField, value: Option<f64>) {
        let slot = match field {
            PriceField::AdjClose => &mut self.adj_close,
            PriceField::Close => &mut self.close,
            PriceField::High => &mut self.high,
            PriceField::Low => &mut self.low,
            PriceField::Open => &mut self.open,
            PriceField::Volume => &mut self.volume,
        };
        *slot = value;
    }
}

/// A price row joined with its company's classification.
///
/// Uniqueness key is `(date, ticker)`. Field names double as the column
/// names of chart data, so renaming a field changes every chart spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub ticker: String,
    pub adj_close: Option<f64>,
    pub close: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub open: Option<f64>,
    pub volume: Option<f64>,
    pub sector: String,
    pub security: String,
    #[serde(default)]
    pub sub_industry: Option<String>,
}

impl PriceRecord {
    pub fn price(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::AdjClose => self.adj_close,
            PriceField::Close => self.close,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Open => self.open,
            PriceField::Volume => self.volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_parses_column_and_header_forms() {
        assert_eq!("close".parse::<PriceField>().unwrap(), PriceField::Close);
        assert_eq!("Adj Close".parse::<PriceField>().unwrap(), PriceField::AdjClose);
        assert_eq!(" VOLUME ".parse::<PriceField>().unwrap(), PriceField::Volume);
        assert!("vwap".parse::<PriceField>().is_err());
    }

    #[test]
    fn field_order_is_header_alphabetical() {
        let mut headers: Vec<&str> = PriceField::ALL.iter().map(|f| f.header()).collect();
        let declared = headers.clone();
        headers.sort();
        assert_eq!(headers, declared);
    }

    #[test]
    fn bar_get_set() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut bar = PriceBar::empty(date, "AAPL");
        assert_eq!(bar.get(PriceField::High), None);
        bar.set(PriceField::High, Some(187.5));
        assert_eq!(bar.get(PriceField::High), Some(187.5));
        assert_eq!(bar.get(PriceField::Low), None);
    }

    #[test]
    fn record_serializes_with_chart_column_names() {
        let record = PriceRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ticker: "AAPL".into(),
            adj_close: None,
            close: Some(185.64),
            high: Some(188.44),
            low: Some(183.89),
            open: Some(187.15),
            volume: Some(82_488_700.0),
            sector: "Information Technology".into(),
            security: "Apple Inc.".into(),
            sub_industry: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-01-02");
        assert_eq!(json["close"], 185.64);
        assert!(json["adj_close"].is_null());
        assert_eq!(json["sector"], "Information Technology");
    }
}
