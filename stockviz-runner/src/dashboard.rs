//! Stock chart requests: ticker text, sector, and date range in; chart out.

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use stockviz_core::chart::{select_chart, AggregateOp, ChartError, ChartKind, ChartSpec};
use stockviz_core::data::{resolve_sector_choice, sector_options, PriceQuery, ALL_SECTORS};
use stockviz_core::domain::PriceField;
use stockviz_core::parse_tickers;
use thiserror::Error;

use crate::config::StockvizConfig;
use crate::data_loader::Dataset;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("sector '{sector}' is not available for this selection (options: {})", .options.join(", "))]
    UnknownSector { sector: String, options: Vec<String> },

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("chart error: {0}")]
    Chart(#[from] ChartError),
}

/// One dashboard interaction. Unset fields fall back to the configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    /// Free-form ticker text, e.g. `"AAPL, msft"`.
    pub tickers: String,
    /// A sector from the offered options, or `All` (the default).
    pub sector: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub price: Option<PriceField>,
    pub aggregate: Option<AggregateOp>,
}

#[derive(Debug, Clone)]
pub struct ChartResponse {
    pub tickers: Vec<String>,
    pub kind: ChartKind,
    /// Sector choices for the selection, `All` first.
    pub sector_options: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Rows that went into the chart.
    pub rows: usize,
    pub spec: ChartSpec,
}

/// Sector choices for the ticker text.
pub fn sector_choices(dataset: &Dataset, ticker_text: &str) -> Vec<String> {
    sector_options(&dataset.records, &parse_tickers(ticker_text))
}

/// Build the chart for `request`.
///
/// Requested dates are clamped into the configured bounds.
pub fn render_chart(
    dataset: &Dataset,
    config: &StockvizConfig,
    request: &ChartRequest,
) -> Result<ChartResponse, DashboardError> {
    let tickers = parse_tickers(&request.tickers);
    let options = sector_options(&dataset.records, &tickers);

    let choice = request.sector.as_deref().unwrap_or(ALL_SECTORS);
    if !options.iter().any(|o| o == choice) {
        return Err(DashboardError::UnknownSector {
            sector: choice.to_string(),
            options,
        });
    }
    let sectors = resolve_sector_choice(choice, &options);

    let bounds = config.dates;
    let start = bounds.clamp(request.start.unwrap_or(bounds.min));
    let end = bounds.clamp(request.end.unwrap_or(bounds.max));
    if start > end {
        return Err(DashboardError::InvalidRange { start, end });
    }

    let mut chart_options = config.chart.clone();
    if let Some(price) = request.price {
        chart_options.price_field = price;
    }
    if let Some(op) = request.aggregate {
        chart_options.aggregate = op;
    }

    let selected = dataset.select(&PriceQuery::new().sectors(sectors).between(start, end));
    debug!("{} rows after sector/date filter", selected.len());

    let kind = select_chart(&tickers, &chart_options);
    let spec = kind.build(&selected, &chart_options)?;
    info!("{} chart for {:?} ({start}..={end})", kind.name(), tickers);

    Ok(ChartResponse {
        tickers,
        kind,
        sector_options: options,
        start,
        end,
        rows: selected.len(),
        spec,
    })
}
