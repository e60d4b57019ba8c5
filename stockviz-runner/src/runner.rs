//! Backtest request runner: request in, gains, chart and summary out.

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use stockviz_core::backtest::{run_backtest, Backtest, BacktestError, InflationIndex};
use stockviz_core::chart::{format_usd, gains_chart, ChartError, ChartSpec};
use stockviz_core::domain::{GainRow, PriceField};
use thiserror::Error;

use crate::config::{BacktestRequest, ConfigError, RequestId, StockvizConfig};
use crate::data_loader::{Dataset, LoadError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
    #[error("chart error: {0}")]
    Chart(#[from] ChartError),
    #[error("failed to hash request: {0}")]
    RequestId(#[from] serde_json::Error),
}

/// Current schema version for persisted summaries.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Per-position line of the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub label: String,
    pub ticker: String,
    pub invest_amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// First date with a usable price; the purchase date.
    pub first_date: NaiveDate,
    pub start_price: f64,
    pub shares: f64,
    /// Gain on the last aligned date, after any inflation adjustment.
    pub final_gain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub request_id: RequestId,
    pub price: PriceField,
    pub inflation_adjusted: bool,
    /// Year whose dollars the gains are stated in, when adjusted.
    pub reference_year: Option<i32>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub total_invested: f64,
    pub final_total: f64,
    /// `final_total` as shown in the chart title.
    pub final_total_display: String,
    pub positions: Vec<PositionSummary>,
    /// Tickers dropped for lack of price data.
    pub skipped: Vec<String>,
}

/// Complete result of one backtest request.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub request: BacktestRequest,
    pub backtest: Backtest,
    pub rows: Vec<GainRow>,
    pub chart: ChartSpec,
    pub summary: BacktestSummary,
}

impl BacktestReport {
    pub fn request_id(&self) -> &str {
        &self.summary.request_id
    }
}

/// The configured inflation index, or the built-in CPI-U table.
pub fn load_inflation_index(config: &StockvizConfig) -> Result<InflationIndex, RunError> {
    Ok(match &config.data.inflation {
        Some(path) => InflationIndex::from_csv_path(path)?,
        None => InflationIndex::cpi_u(),
    })
}

/// Validate `request` and run it against `dataset`.
pub fn run_backtest_request(
    dataset: &Dataset,
    config: &StockvizConfig,
    request: BacktestRequest,
) -> Result<BacktestReport, RunError> {
    let request = request.normalize(config)?;
    let request_id = request.request_id()?;
    let price = request.price_field();

    let book = dataset.price_book(price);
    let mut backtest = run_backtest(&book, &request.positions)?;

    let mut reference_year = None;
    if request.adjusts_inflation() {
        let index = load_inflation_index(config)?;
        reference_year = Some(index.reference_year());
        backtest = backtest.adjust_for_inflation(&index)?;
    }

    let rows = backtest.rows();
    let final_total = backtest.final_total();
    let chart = gains_chart(&rows, final_total, &config.chart)?;
    let summary = summarize(&request, &backtest, request_id, price, reference_year);

    info!(
        "backtest {} finished: {} positions, {} skipped, total {}",
        &summary.request_id[..12],
        backtest.series.len(),
        backtest.skipped.len(),
        summary.final_total_display
    );

    Ok(BacktestReport {
        request,
        backtest,
        rows,
        chart,
        summary,
    })
}

fn summarize(
    request: &BacktestRequest,
    backtest: &Backtest,
    request_id: RequestId,
    price: PriceField,
    reference_year: Option<i32>,
) -> BacktestSummary {
    let aligned = &backtest.aligned;
    let final_gain = |label: &str| {
        aligned
            .columns
            .iter()
            .find(|(l, _)| l == label)
            .and_then(|(_, gains)| gains.last().copied())
            .unwrap_or(0.0)
    };

    // Series are produced in position order, skipped tickers omitted.
    let ran = request
        .positions
        .iter()
        .filter(|p| !backtest.skipped.contains(&p.ticker));
    let positions = backtest
        .series
        .iter()
        .zip(ran)
        .map(|(s, p)| PositionSummary {
            label: s.label.clone(),
            ticker: s.ticker.clone(),
            invest_amount: p.invest_amount,
            start_date: p.start_date,
            end_date: p.end_date,
            first_date: s.points.first().map(|pt| pt.date).unwrap_or(p.start_date),
            start_price: s.start_price,
            shares: s.shares,
            final_gain: final_gain(&s.label),
        })
        .collect::<Vec<_>>();

    let final_total = backtest.final_total();
    BacktestSummary {
        schema_version: SCHEMA_VERSION,
        request_id,
        price,
        inflation_adjusted: backtest.inflation_adjusted,
        reference_year,
        first_date: aligned.dates.first().copied(),
        last_date: aligned.dates.last().copied(),
        total_invested: positions.iter().map(|p| p.invest_amount).sum(),
        final_total,
        final_total_display: format_usd(final_total),
        positions,
        skipped: backtest.skipped.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockviz_core::data::CompanyDirectory;
    use stockviz_core::domain::{Position, PriceRecord, TOTAL_LABEL};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(ticker: &str, date: &str, close: f64) -> PriceRecord {
        PriceRecord {
            date: d(date),
            ticker: ticker.into(),
            adj_close: Some(close),
            close: Some(close),
            high: None,
            low: None,
            open: None,
            volume: None,
            sector: "Sector".into(),
            security: ticker.into(),
            sub_industry: None,
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                record("AAPL", "2019-12-30", 100.0),
                record("AAPL", "2019-12-31", 105.0),
                record("AAPL", "2020-01-02", 110.0),
                record("MSFT", "2019-12-31", 200.0),
                record("MSFT", "2020-01-02", 180.0),
            ],
            CompanyDirectory::default(),
        )
    }

    fn request() -> BacktestRequest {
        BacktestRequest::new(vec![
            Position::new("aapl", 1000.0, d("2019-12-30"), d("2020-01-02")),
            Position::new("tsla", 1000.0, d("2019-12-30"), d("2020-01-02")),
            Position::new("msft", 2000.0, d("2019-12-30"), d("2020-01-02")),
        ])
    }

    #[test]
    fn runs_request_end_to_end() {
        let report =
            run_backtest_request(&dataset(), &StockvizConfig::default(), request()).unwrap();

        assert_eq!(report.summary.skipped, vec!["TSLA"]);
        assert_eq!(report.summary.positions.len(), 2);
        assert_eq!(report.summary.positions[1].ticker, "MSFT");
        assert_eq!(report.summary.positions[1].first_date, d("2019-12-31"));
        // AAPL +100, MSFT -200.
        assert!((report.summary.final_total + 100.0).abs() < 1e-9);
        assert_eq!(report.summary.final_total_display, "-$100.00");
        assert_eq!(report.summary.total_invested, 3000.0);
        assert_eq!(
            report.chart.title.as_ref().unwrap().text,
            "Total Gained: -$100.00"
        );
        assert_eq!(report.rows.iter().filter(|r| r.label == TOTAL_LABEL).count(), 3);
        assert_eq!(report.request_id().len(), 64);
    }

    #[test]
    fn inflation_adjustment_records_reference_year() {
        let mut req = request();
        req.adjust_inflation = Some(true);
        let report = run_backtest_request(&dataset(), &StockvizConfig::default(), req).unwrap();
        assert!(report.summary.inflation_adjusted);
        assert_eq!(report.summary.reference_year, Some(2023));
        // Gains dated 2020 are scaled by CPI(2023)/CPI(2020).
        let factor = 304.702 / 258.811;
        assert!((report.summary.final_total - (-100.0 * factor)).abs() < 1e-9);
    }

    #[test]
    fn invalid_request_is_config_error() {
        let err = run_backtest_request(
            &dataset(),
            &StockvizConfig::default(),
            BacktestRequest::new(vec![]),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Config(ConfigError::Request(_))));
    }

    #[test]
    fn empty_window_surfaces() {
        let req = BacktestRequest::new(vec![Position::new(
            "AAPL",
            1000.0,
            d("2021-01-04"),
            d("2021-02-01"),
        )]);
        let err = run_backtest_request(&dataset(), &StockvizConfig::default(), req).unwrap_err();
        assert!(matches!(err, RunError::Backtest(BacktestError::EmptyWindow { .. })));
    }
}
