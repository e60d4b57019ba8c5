//! StockViz Runner: dataset loading, dashboard requests, backtest requests, export.
//!
//! This crate builds on `stockviz-core` to provide:
//! - TOML configuration and backtest request files
//! - Dataset loading from wide CSV exports, long CSV, or the Parquet store
//! - Chart requests with sector options and date clamping
//! - Backtest requests with request ids, summaries, and inflation adjustment
//! - CSV and JSON artifact export

pub mod config;
pub mod dashboard;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{
    BacktestRequest, BacktestSettings, ConfigError, DataConfig, DateBounds, RequestId,
    StockvizConfig,
};
pub use dashboard::{render_chart, sector_choices, ChartRequest, ChartResponse, DashboardError};
pub use data_loader::{detect_format, load_dataset, Dataset, LoadError, PriceFormat};
pub use export::{
    export_chart_json, export_gains_csv, export_summary_json, import_summary_json, save_chart,
    save_long_prices, save_report,
};
pub use runner::{
    load_inflation_index, run_backtest_request, BacktestReport, BacktestSummary,
    PositionSummary, RunError, SCHEMA_VERSION,
};
