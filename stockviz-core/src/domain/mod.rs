//! Domain types for StockViz

pub mod company;
pub mod position;
pub mod price;

pub use company::CompanyInfo;
pub use position::{GainPoint, GainRow, GainSeries, Position, TOTAL_LABEL};
pub use price::{PriceBar, PriceField, PriceRecord, UnknownPriceField};

/// Symbol type alias
pub type Symbol = String;
