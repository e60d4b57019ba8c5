//! Integration tests for the data pipeline using the frozen constituent fixtures.

use chrono::NaiveDate;
use std::path::PathBuf;
use stockviz_core::data::{
    melt, read_long_csv, read_wide_csv_path, reshape, sector_options, write_long_csv,
    write_wide_csv, CompanyDirectory, DataError, PriceQuery, PriceStore, ALL_SECTORS,
};
use stockviz_core::domain::PriceField;

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn load() -> (stockviz_core::data::WidePriceTable, CompanyDirectory) {
    let wide = read_wide_csv_path(&fixture_dir().join("sp500_prices.csv")).unwrap();
    let dir = CompanyDirectory::from_csv_path(&fixture_dir().join("sp500_companies.csv")).unwrap();
    (wide, dir)
}

#[test]
fn fixture_loads_as_wide_table() {
    let (wide, dir) = load();

    assert_eq!(wide.dates().len(), 8);
    assert_eq!(wide.dates()[0], date("2022-12-28"));
    assert_eq!(wide.tickers(), vec!["AAPL", "JPM", "MSFT", "XOM"]);
    assert_eq!(wide.fields(), PriceField::ALL.to_vec());
    assert_eq!(wide.get(date("2022-12-28"), PriceField::Close, "AAPL"), Some(150.0));
    assert_eq!(wide.get(date("2022-12-28"), PriceField::Close, "JPM"), None);

    assert_eq!(dir.len(), 5);
    assert_eq!(dir.sector_of("XOM"), Some("Energy"));
}

#[test]
fn reshape_joins_every_listed_ticker() {
    let (wide, dir) = load();
    let records = reshape(&wide, &dir);

    // 4 tickers x 8 dates; NVDA has metadata but no prices.
    assert_eq!(records.len(), 32);
    assert!(records.iter().all(|r| r.ticker != "NVDA"));

    let aapl = records
        .iter()
        .find(|r| r.ticker == "AAPL" && r.date == date("2023-01-03"))
        .unwrap();
    assert_eq!(aapl.sector, "Information Technology");
    assert_eq!(aapl.security, "Apple Inc.");
    assert_eq!(
        aapl.sub_industry.as_deref(),
        Some("Technology Hardware, Storage & Peripherals")
    );
    assert_eq!(aapl.close, Some(154.5));
}

#[test]
fn join_drops_tickers_without_metadata() {
    let (wide, _) = load();
    let dir = CompanyDirectory::from_csv_reader(
        "Symbol,Security,GICS Sector\nAAPL,Apple Inc.,Information Technology\n".as_bytes(),
    )
    .unwrap();
    let records = reshape(&wide, &dir);
    assert_eq!(records.len(), 8);
    assert!(records.iter().all(|r| r.ticker == "AAPL"));
}

#[test]
fn melt_then_widen_reproduces_fixture() {
    let (wide, _) = load();
    assert_eq!(melt(&wide).widen().unwrap(), wide);
}

#[test]
fn wide_csv_written_back_reads_identically() {
    let (wide, _) = load();
    let mut buf = Vec::new();
    write_wide_csv(&wide, &mut buf).unwrap();
    let again = stockviz_core::data::read_wide_csv(buf.as_slice()).unwrap();
    assert_eq!(again, wide);
}

#[test]
fn long_csv_preserves_records() {
    let (wide, dir) = load();
    let records = reshape(&wide, &dir);
    let mut buf = Vec::new();
    write_long_csv(&records, &mut buf).unwrap();
    assert_eq!(read_long_csv(buf.as_slice()).unwrap(), records);
}

#[test]
fn parquet_store_scan_matches_in_memory_filter() {
    let (wide, dir) = load();
    let records = reshape(&wide, &dir);
    let tmp = tempfile::tempdir().unwrap();
    let store = PriceStore::new(tmp.path().join("prices.parquet"));
    store.write(&records).unwrap();

    let query = PriceQuery::new()
        .tickers(["AAPL", "XOM"])
        .between(date("2022-12-30"), date("2023-01-05"));
    let scanned = store.scan(&query).unwrap();
    assert_eq!(scanned, query.apply(&records));
    assert_eq!(scanned.len(), 8);

    let energy = store.scan(&PriceQuery::new().sectors(["Energy"])).unwrap();
    assert_eq!(energy.len(), 8);
}

#[test]
fn sector_options_follow_selection() {
    let (wide, dir) = load();
    let records = reshape(&wide, &dir);

    let all = sector_options(&records, &["SP500".to_string()]);
    assert_eq!(all, vec![ALL_SECTORS, "Energy", "Financials", "Information Technology"]);
    assert_eq!(sector_options(&records, &[]), all);

    let some = sector_options(&records, &["XOM".to_string(), "MSFT".to_string()]);
    assert_eq!(some, vec![ALL_SECTORS, "Energy", "Information Technology"]);
}

#[test]
fn unknown_attribute_header_is_rejected() {
    let csv = "Price,Close,Dividends\nTicker,AAPL,AAPL\n2023-01-03,1.0,0.0\n";
    let err = stockviz_core::data::read_wide_csv(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, DataError::UnknownAttribute { column: 2, .. }));
}
