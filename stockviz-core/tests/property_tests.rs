//! Property tests for parsing, reshaping and backtest invariants.
//!
//! Uses proptest to verify:
//! 1. Ticker parsing: output is uppercase, matches the token pattern, and
//!    survives re-joining
//! 2. Reshape: melting then widening reproduces the wide table
//! 3. Gains: every series starts at exactly zero
//! 4. Total: equals the per-date sum of forward-filled series

use chrono::NaiveDate;
use proptest::prelude::*;
use stockviz_core::backtest::{run_backtest, PriceBook};
use stockviz_core::data::{melt, WidePriceTable};
use stockviz_core::domain::{Position, PriceField, TOTAL_LABEL};
use stockviz_core::parse_tickers;

// ── Strategies (proptest) ────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 2).unwrap()
}

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_cell() -> impl Strategy<Value = Option<f64>> {
    prop::option::weighted(0.85, arb_price())
}

fn arb_ticker() -> impl Strategy<Value = String> {
    "[A-Z]{1,4}[0-9]?"
}

/// A wide table with distinct tickers and a non-empty set of fields.
fn arb_wide() -> impl Strategy<Value = WidePriceTable> {
    (
        1usize..12,
        prop::collection::btree_set(arb_ticker(), 1..5),
        prop::sample::subsequence(PriceField::ALL.to_vec(), 1..=6),
    )
        .prop_flat_map(|(n_dates, tickers, fields)| {
            let n_cols = tickers.len() * fields.len();
            (
                Just(n_dates),
                Just(tickers.into_iter().collect::<Vec<_>>()),
                Just(fields),
                prop::collection::vec(prop::collection::vec(arb_cell(), n_dates), n_cols),
            )
        })
        .prop_map(|(n_dates, tickers, fields, cells)| {
            let dates = (0..n_dates)
                .map(|i| base_date() + chrono::Duration::days(i as i64))
                .collect();
            let mut wide = WidePriceTable::new(dates);
            let mut cells = cells.into_iter();
            for field in fields {
                for ticker in &tickers {
                    let values = cells.next().unwrap();
                    wide.push_column(field, ticker.clone(), values).unwrap();
                }
            }
            wide
        })
}

/// Prices for up to three tickers over 30 calendar days, with gaps.
fn arb_book() -> impl Strategy<Value = PriceBook> {
    prop::collection::vec(prop::collection::vec(arb_cell(), 30), 3).prop_map(|series| {
        let mut book = PriceBook::new(PriceField::Close);
        for (ticker, prices) in ["AAA", "BBB", "CCC"].iter().zip(series) {
            for (i, p) in prices.into_iter().enumerate() {
                book.insert(ticker, base_date() + chrono::Duration::days(i as i64), p);
            }
        }
        book
    })
}

fn arb_positions() -> impl Strategy<Value = Vec<Position>> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["AAA", "BBB", "CCC"]),
            0.0..10_000.0_f64,
            0i64..30,
            0i64..30,
        )
            .prop_map(|(ticker, amount, a, b)| {
                let (lo, hi) = (a.min(b), a.max(b));
                Position::new(
                    ticker,
                    amount,
                    base_date() + chrono::Duration::days(lo),
                    base_date() + chrono::Duration::days(hi),
                )
            }),
        0..6,
    )
}

// ── 1. Ticker parsing ────────────────────────────────────────────────

proptest! {
    #[test]
    fn parsed_tickers_are_uppercase_tokens(text in ".{0,64}") {
        for t in parse_tickers(&text) {
            let letters = t.trim_end_matches(|c: char| c.is_ascii_digit());
            prop_assert!(!letters.is_empty());
            prop_assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn joined_tickers_parse_back(tickers in prop::collection::vec(arb_ticker(), 0..8), sep in "[ ,;/]{1,3}") {
        let text = tickers.join(sep.as_str());
        prop_assert_eq!(parse_tickers(&text), tickers);
    }
}

// ── 2. Reshape round trip ────────────────────────────────────────────

proptest! {
    #[test]
    fn melt_then_widen_is_identity(wide in arb_wide()) {
        let long = melt(&wide);
        prop_assert_eq!(long.rows.len(), wide.dates().len() * wide.tickers().len());
        prop_assert_eq!(long.widen().unwrap(), wide);
    }
}

// ── 3 & 4. Backtest invariants ───────────────────────────────────────

proptest! {
    #[test]
    fn first_gain_is_zero(book in arb_book(), positions in arb_positions()) {
        if let Ok(bt) = run_backtest(&book, &positions) {
            for s in &bt.series {
                prop_assert_eq!(s.points[0].gains, 0.0);
            }
        }
    }

    #[test]
    fn total_is_sum_of_series(book in arb_book(), positions in arb_positions()) {
        if let Ok(bt) = run_backtest(&book, &positions) {
            let rows = bt.rows();
            for (i, d) in bt.aligned.dates.iter().enumerate() {
                let sum: f64 = rows
                    .iter()
                    .filter(|r| r.date == *d && r.label != TOTAL_LABEL)
                    .map(|r| r.gains)
                    .sum();
                prop_assert!((bt.aligned.total[i] - sum).abs() <= 1e-6 * (1.0 + sum.abs()));
            }
        }
    }
}
