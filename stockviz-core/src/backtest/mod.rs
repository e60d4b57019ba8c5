//! Buy-and-hold portfolio backtesting.
//!
//! Each position buys `invest_amount` dollars of one ticker at the first
//! price in its window. Series are aligned on the union of their dates and
//! summed into a `Total`; gains can optionally be restated in constant
//! dollars with an [`InflationIndex`].

pub mod align;
pub mod book;
pub mod engine;
pub mod error;
pub mod gains;
pub mod inflation;

pub use align::{align_gains, AlignedGains};
pub use book::PriceBook;
pub use engine::{run_backtest, Backtest};
pub use error::BacktestError;
pub use gains::{gain_series, position_labels};
pub use inflation::InflationIndex;
