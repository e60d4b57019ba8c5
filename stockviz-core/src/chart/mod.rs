//! Vega-Lite chart generation: dispatch, builders, and spec types

pub mod builders;
pub mod options;
pub mod select;
pub mod spec;

pub use builders::{
    aggregate_chart, candlestick_chart, comparison_chart, format_usd, gains_chart, ChartError,
};
pub use options::{AggregateOp, ChartOptions, UnknownAggregate};
pub use select::{select_chart, stock_chart, ChartKind, MAX_COMPARISON_TICKERS};
pub use spec::{brush_linked, ChartSpec, Panel, BRUSH_PARAM, VEGA_LITE_SCHEMA};
