//! StockViz Core: price data, chart generation, and backtest gains.
//!
//! This crate contains everything the dashboard computes:
//! - Ticker parsing from free-form text
//! - Wide-to-long price reshaping with company metadata
//! - Parquet price store with filtered scans
//! - Chart dispatch and Vega-Lite spec builders
//! - Buy-and-hold backtesting with optional inflation adjustment

pub mod backtest;
pub mod chart;
pub mod data;
pub mod domain;
pub mod tickers;

pub use tickers::{is_market_selection, is_market_ticker, parse_tickers, MARKET_TICKERS};
