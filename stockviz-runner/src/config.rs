//! Dashboard configuration and backtest request files.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stockviz_core::chart::ChartOptions;
use stockviz_core::domain::{Position, PriceField};
use thiserror::Error;

/// Content-addressable identifier of a normalized backtest request.
pub type RequestId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("invalid backtest request: {0}")]
    Request(String),
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Top-level configuration (`stockviz.toml`). Every section and field is optional.
///
/// ```toml
/// [data]
/// prices = "data/sp500_stocks.csv"
/// companies = "data/sp500_companies.csv"
///
/// [dates]
/// min = "2014-01-01"
/// max = "2023-12-31"
///
/// [chart]
/// width = 650
/// price_field = "close"
/// aggregate = "mean"
///
/// [backtest]
/// max_positions = 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockvizConfig {
    pub data: DataConfig,
    pub dates: DateBounds,
    pub chart: ChartOptions,
    pub backtest: BacktestSettings,
}

impl StockvizConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&read_file(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dates.min > self.dates.max {
            return Err(ConfigError::Invalid(format!(
                "dates.min {} is after dates.max {}",
                self.dates.min, self.dates.max
            )));
        }
        if self.backtest.max_positions == 0 {
            return Err(ConfigError::Invalid("backtest.max_positions must be at least 1".into()));
        }
        if self.chart.width == 0 || self.chart.upper_height == 0 || self.chart.lower_height == 0 {
            return Err(ConfigError::Invalid("chart dimensions must be positive".into()));
        }
        Ok(())
    }
}

/// Where the dataset lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Wide export CSV, long CSV, or long Parquet store.
    pub prices: PathBuf,
    /// Constituent CSV; required when `prices` is a wide export.
    pub companies: Option<PathBuf>,
    /// `year,cpi` CSV replacing the built-in CPI-U table.
    pub inflation: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            prices: PathBuf::from("data/sp500_stocks.csv"),
            companies: Some(PathBuf::from("data/sp500_companies.csv")),
            inflation: None,
        }
    }
}

/// Inclusive date range every chart and position must stay within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl Default for DateBounds {
    fn default() -> Self {
        Self {
            min: NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or_default(),
            max: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default(),
        }
    }
}

impl DateBounds {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min <= date && date <= self.max
    }

    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    pub max_positions: usize,
    /// Price used when a request names none.
    pub price: PriceField,
    /// Inflation adjustment when a request does not say.
    pub adjust_inflation: bool,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            max_positions: 10,
            price: PriceField::Close,
            adjust_inflation: false,
        }
    }
}

/// A backtest request file.
///
/// ```toml
/// price = "adj_close"
/// adjust_inflation = true
///
/// [[positions]]
/// ticker = "aapl"
/// invest_amount = 1000.0
/// start_date = "2015-01-02"
/// end_date = "2020-12-31"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    #[serde(default)]
    pub price: Option<PriceField>,
    #[serde(default)]
    pub adjust_inflation: Option<bool>,
    #[serde(default)]
    pub positions: Vec<Position>,
}

impl BacktestRequest {
    pub fn new(positions: Vec<Position>) -> Self {
        Self {
            price: None,
            adjust_inflation: None,
            positions,
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&read_file(path)?)
    }

    /// Check against `config` and fill defaults; tickers are uppercased.
    pub fn normalize(mut self, config: &StockvizConfig) -> Result<Self, ConfigError> {
        let max = config.backtest.max_positions;
        if self.positions.is_empty() {
            return Err(ConfigError::Request("no positions".into()));
        }
        if self.positions.len() > max {
            return Err(ConfigError::Request(format!(
                "{} positions exceed the limit of {max}",
                self.positions.len()
            )));
        }

        for (i, p) in self.positions.iter_mut().enumerate() {
            let n = i + 1;
            p.ticker = p.ticker.trim().to_ascii_uppercase();
            if p.ticker.is_empty() {
                return Err(ConfigError::Request(format!("position {n}: empty ticker")));
            }
            if !p.invest_amount.is_finite() || p.invest_amount < 0.0 {
                return Err(ConfigError::Request(format!(
                    "position {n} ({}): invest_amount must be a non-negative number, got {}",
                    p.ticker, p.invest_amount
                )));
            }
            if p.start_date > p.end_date {
                return Err(ConfigError::Request(format!(
                    "position {n} ({}): start_date {} is after end_date {}",
                    p.ticker, p.start_date, p.end_date
                )));
            }
            for date in [p.start_date, p.end_date] {
                if !config.dates.contains(date) {
                    return Err(ConfigError::Request(format!(
                        "position {n} ({}): {date} is outside {}..={}",
                        p.ticker, config.dates.min, config.dates.max
                    )));
                }
            }
        }

        self.price.get_or_insert(config.backtest.price);
        self.adjust_inflation.get_or_insert(config.backtest.adjust_inflation);
        Ok(self)
    }

    pub fn price_field(&self) -> PriceField {
        self.price.unwrap_or(PriceField::Close)
    }

    pub fn adjusts_inflation(&self) -> bool {
        self.adjust_inflation.unwrap_or(false)
    }

    /// Deterministic BLAKE3 hash of the request's JSON form.
    pub fn request_id(&self) -> Result<RequestId, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }
}
