//! Price data ingestion, reshaping, metadata and storage

pub mod companies;
pub mod ingest;
pub mod query;
pub mod reshape;
pub mod schema;
pub mod store;
pub mod wide;

pub use companies::CompanyDirectory;
pub use ingest::{
    parse_calendar_date, read_long_csv, read_wide_csv, read_wide_csv_path, write_long_csv,
    write_wide_csv, DataError,
};
pub use query::{resolve_sector_choice, sector_options, PriceQuery, ALL_SECTORS};
pub use reshape::{join_companies, melt, reshape, LongPrices};
pub use schema::{PriceSchema, SchemaError};
pub use store::PriceStore;
pub use wide::{WideColumn, WidePriceTable};
