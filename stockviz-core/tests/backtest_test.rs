//! Backtests over the fixture prices.

use chrono::NaiveDate;
use std::path::PathBuf;
use stockviz_core::backtest::{run_backtest, BacktestError, InflationIndex, PriceBook};
use stockviz_core::chart::{gains_chart, ChartOptions};
use stockviz_core::data::{read_wide_csv_path, reshape, CompanyDirectory};
use stockviz_core::domain::{Position, PriceField, TOTAL_LABEL};

fn book(field: PriceField) -> PriceBook {
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let wide = read_wide_csv_path(&fixtures.join("sp500_prices.csv")).unwrap();
    let dir = CompanyDirectory::from_csv_path(&fixtures.join("sp500_companies.csv")).unwrap();
    PriceBook::from_records(&reshape(&wide, &dir), field)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn single_position_gain() {
    let positions = vec![Position::new("AAPL", 1500.0, date("2022-12-28"), date("2023-01-09"))];
    let bt = run_backtest(&book(PriceField::Close), &positions).unwrap();

    let series = &bt.series[0];
    assert_eq!(series.start_price, 150.0);
    assert!((series.shares - 10.0).abs() < 1e-12);
    assert_eq!(series.points[0].gains, 0.0);
    // 150.00 -> 160.50 on ten shares.
    assert!((bt.final_total() - 105.0).abs() < 1e-6);
}

#[test]
fn late_listing_starts_at_first_available_price() {
    let positions = vec![Position::new("JPM", 1339.0, date("2022-12-01"), date("2023-01-09"))];
    let bt = run_backtest(&book(PriceField::Close), &positions).unwrap();
    assert_eq!(bt.series[0].points[0].date, date("2023-01-03"));
    assert_eq!(bt.series[0].start_price, 133.9);
}

#[test]
fn total_row_is_sum_of_positions() {
    let positions = vec![
        Position::new("AAPL", 1000.0, date("2022-12-28"), date("2023-01-04")),
        Position::new("XOM", 500.0, date("2022-12-30"), date("2023-01-09")),
        Position::new("AAPL", 250.0, date("2023-01-05"), date("2023-01-09")),
    ];
    let bt = run_backtest(&book(PriceField::AdjClose), &positions).unwrap();
    let rows = bt.rows();

    let labels: Vec<&str> = bt.aligned.columns.iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(labels, vec!["AAPL", "XOM", "AAPL #2"]);
    assert_eq!(rows.len(), bt.aligned.dates.len() * 4);

    for d in &bt.aligned.dates {
        let at: Vec<_> = rows.iter().filter(|r| r.date == *d).collect();
        let total = at.iter().find(|r| r.label == TOTAL_LABEL).unwrap().gains;
        let sum: f64 = at.iter().filter(|r| r.label != TOTAL_LABEL).map(|r| r.gains).sum();
        assert!((total - sum).abs() < 1e-9);
    }
}

#[test]
fn window_without_prices_is_an_error() {
    let positions = vec![Position::new("MSFT", 1000.0, date("2024-01-01"), date("2024-06-30"))];
    let err = run_backtest(&book(PriceField::Close), &positions).unwrap_err();
    assert!(matches!(err, BacktestError::EmptyWindow { ref ticker, .. } if ticker == "MSFT"));
}

#[test]
fn ticker_absent_from_data_is_skipped() {
    let positions = vec![
        Position::new("NVDA", 1000.0, date("2022-12-28"), date("2023-01-09")),
        Position::new("MSFT", 1000.0, date("2022-12-28"), date("2023-01-09")),
    ];
    let bt = run_backtest(&book(PriceField::Close), &positions).unwrap();
    assert_eq!(bt.skipped, vec!["NVDA"]);
    assert_eq!(bt.series.len(), 1);
}

#[test]
fn inflation_adjusts_by_row_year() {
    let positions = vec![Position::new("MSFT", 2500.0, date("2022-12-28"), date("2023-01-09"))];
    let raw = run_backtest(&book(PriceField::Close), &positions).unwrap();
    let adjusted = raw.clone().adjust_for_inflation(&InflationIndex::cpi_u()).unwrap();

    let factor_2022 = 304.702 / 292.655;
    for (i, d) in raw.aligned.dates.iter().enumerate() {
        let expected = if d.format("%Y").to_string() == "2022" {
            raw.aligned.total[i] * factor_2022
        } else {
            raw.aligned.total[i]
        };
        assert!((adjusted.aligned.total[i] - expected).abs() < 1e-9);
    }
}

#[test]
fn gains_chart_reports_final_total() {
    let positions = vec![Position::new("AAPL", 1500.0, date("2022-12-28"), date("2023-01-09"))];
    let bt = run_backtest(&book(PriceField::Close), &positions).unwrap();
    let spec = gains_chart(&bt.rows(), bt.final_total(), &ChartOptions::default()).unwrap();
    assert_eq!(spec.title.unwrap().text, "Total Gained: $105.00");
}
