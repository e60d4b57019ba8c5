//! Chart dispatch end to end: ticker text in, Vega-Lite JSON out.

use serde_json::Value;
use std::path::PathBuf;
use stockviz_core::chart::{stock_chart, AggregateOp, ChartOptions, BRUSH_PARAM};
use stockviz_core::data::{read_wide_csv_path, reshape, CompanyDirectory};
use stockviz_core::domain::PriceRecord;
use stockviz_core::parse_tickers;

fn records() -> Vec<PriceRecord> {
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let wide = read_wide_csv_path(&fixtures.join("sp500_prices.csv")).unwrap();
    let dir = CompanyDirectory::from_csv_path(&fixtures.join("sp500_companies.csv")).unwrap();
    reshape(&wide, &dir)
}

fn chart(text: &str, options: &ChartOptions) -> Value {
    let spec = stock_chart(&records(), &parse_tickers(text), options).unwrap();
    serde_json::from_str(&spec.to_json().unwrap()).unwrap()
}

fn assert_brush_linked(v: &Value) {
    let panels = v["vconcat"].as_array().unwrap();
    assert_eq!(panels.len(), 2);
    assert_eq!(panels[0]["encoding"]["x"]["scale"]["domain"]["param"], BRUSH_PARAM);
    assert_eq!(panels[1]["params"][0]["name"], BRUSH_PARAM);
    assert_eq!(panels[1]["params"][0]["select"]["encodings"][0], "x");
}

#[test]
fn market_ticker_draws_average_over_everything() {
    let v = chart("sp500", &ChartOptions::default());
    assert_brush_linked(&v);
    assert_eq!(v["vconcat"][0]["encoding"]["y"]["aggregate"], "mean");
    // JPM has no closes before 2023-01-03.
    assert_eq!(v["data"]["values"].as_array().unwrap().len(), 29);
}

#[test]
fn single_ticker_draws_candlestick() {
    let v = chart("aapl", &ChartOptions::default());
    assert_brush_linked(&v);
    assert_eq!(v["vconcat"][0]["layer"][0]["mark"], "rule");
    let values = v["data"]["values"].as_array().unwrap();
    assert_eq!(values.len(), 8);
    assert!(values.iter().all(|p| p.get("open").is_some()));
}

#[test]
fn few_tickers_draw_comparison() {
    let v = chart("AAPL, XOM", &ChartOptions::default());
    assert_brush_linked(&v);
    assert_eq!(v["vconcat"][0]["encoding"]["color"]["field"], "ticker");
    let tickers: std::collections::BTreeSet<&str> = v["data"]["values"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["ticker"].as_str().unwrap())
        .collect();
    assert_eq!(tickers.into_iter().collect::<Vec<_>>(), vec!["AAPL", "XOM"]);
}

#[test]
fn many_tickers_aggregate_every_filtered_row() {
    let options = ChartOptions {
        aggregate: AggregateOp::Max,
        ..Default::default()
    };
    // Six tickers, only three of them in the data; the aggregate still
    // covers every row passed in, MSFT included.
    let v = chart("AAPL XOM JPM NVDA ZZZ QQQ", &options);
    assert_brush_linked(&v);
    assert_eq!(v["vconcat"][0]["encoding"]["y"]["aggregate"], "max");
    assert_eq!(v["vconcat"][0]["encoding"]["y"]["title"], "Maximum Price");
    let values = v["data"]["values"].as_array().unwrap();
    assert_eq!(values.len(), 29);
    assert!(values.iter().any(|p| p["ticker"] == "MSFT"));
}

#[test]
fn empty_text_aggregates_everything() {
    let v = chart("  ,; ", &ChartOptions::default());
    assert_brush_linked(&v);
    assert_eq!(v["data"]["values"].as_array().unwrap().len(), 29);
}

#[test]
fn output_is_deterministic() {
    let a = chart("AAPL MSFT", &ChartOptions::default());
    let b = chart("AAPL MSFT", &ChartOptions::default());
    assert_eq!(a, b);
}
