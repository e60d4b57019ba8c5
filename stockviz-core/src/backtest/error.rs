use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("{ticker}: start date {start} is after end date {end}")]
    InvalidWindow {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("{ticker}: no prices between {start} and {end}")]
    EmptyWindow {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("{ticker}: unusable start price {price} on {date}")]
    InvalidStartPrice {
        ticker: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("no inflation index value for year {0}")]
    MissingInflationYear(i32),

    #[error("invalid inflation index: {0}")]
    InvalidIndex(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
