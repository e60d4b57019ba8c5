//! Free-form ticker input parsing.
//!
//! Users type tickers separated by anything (commas, spaces, semicolons,
//! slashes). Every run of letters followed by optional digits is a ticker.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::Symbol;

static TICKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+[0-9]*").expect("ticker pattern is valid"));

/// Pseudo-tickers that select the whole market instead of one company.
pub const MARKET_TICKERS: [&str; 2] = ["SP500", "FULL"];

/// Extract uppercase ticker symbols in order of appearance.
///
/// Never fails: unmatched characters are skipped and duplicates are kept.
pub fn parse_tickers(input: &str) -> Vec<Symbol> {
    TICKER_RE
        .find_iter(input)
        .map(|m| m.as_str().to_ascii_uppercase())
        .collect()
}

/// True for `SP500` / `FULL`.
pub fn is_market_ticker(symbol: &str) -> bool {
    MARKET_TICKERS.contains(&symbol)
}

/// True when the selection is exactly one market pseudo-ticker.
pub fn is_market_selection(tickers: &[Symbol]) -> bool {
    matches!(tickers, [only] if is_market_ticker(only))
}
