//! StockViz CLI: reshape, sectors, chart, and backtest commands.
//!
//! Commands:
//! - `reshape`: turn the wide CSV export into a joined long table (Parquet or CSV)
//! - `sectors`: list the sector choices for a ticker selection
//! - `chart`: write the Vega-Lite chart for a ticker selection
//! - `backtest`: run a backtest request file and write its artifacts
//!
//! Every command reads `stockviz.toml` from the working directory when it
//! exists, or the file named by `--config`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use stockviz_core::chart::AggregateOp;
use stockviz_core::data::{read_wide_csv_path, reshape, CompanyDirectory};
use stockviz_core::domain::PriceField;
use stockviz_runner::{
    load_dataset, render_chart, run_backtest_request, save_chart, save_long_prices, save_report,
    sector_choices, BacktestRequest, BacktestReport, ChartRequest, StockvizConfig,
};

const DEFAULT_CONFIG: &str = "stockviz.toml";

#[derive(Parser)]
#[command(
    name = "stockviz",
    about = "StockViz CLI: S&P 500 price charts and buy-and-hold backtests"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./stockviz.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reshape the wide price export into a joined long table.
    Reshape {
        /// Wide CSV export. Defaults to the configured price file.
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Constituent CSV. Defaults to the configured companies file.
        #[arg(long)]
        companies: Option<PathBuf>,

        /// Output file; `.parquet` or `.csv`.
        #[arg(long, default_value = "data/sp500_long.parquet")]
        out: PathBuf,
    },
    /// List the sector choices for a ticker selection.
    Sectors {
        /// Ticker text, e.g. "AAPL, MSFT". Empty or SP500 means the whole market.
        #[arg(long, default_value = "")]
        tickers: String,
    },
    /// Write the Vega-Lite chart for a ticker selection.
    Chart {
        /// Ticker text, e.g. "AAPL, MSFT". Empty or SP500 means the whole market.
        #[arg(long, default_value = "")]
        tickers: String,

        /// Sector filter. Defaults to All.
        #[arg(long)]
        sector: Option<String>,

        /// Start date (YYYY-MM-DD). Clamped to the configured bounds.
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD). Clamped to the configured bounds.
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Price for comparison and aggregate charts: adj_close, close, high, low, open, volume.
        #[arg(long)]
        price: Option<PriceField>,

        /// Aggregate for market charts: mean, median, min, max, sum, stdev, variance.
        #[arg(long)]
        aggregate: Option<AggregateOp>,

        /// Output JSON file.
        #[arg(long, default_value = "chart.json")]
        out: PathBuf,
    },
    /// Run a backtest request file and write gains.csv, chart.json, summary.json.
    Backtest {
        /// Path to a TOML request file with [[positions]].
        #[arg(long)]
        request: PathBuf,

        /// Restate gains in reference-year dollars.
        #[arg(long, default_value_t = false)]
        adjust_inflation: bool,

        /// Output directory for artifacts. Defaults to results/<request id>.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Reshape {
            prices,
            companies,
            out,
        } => run_reshape(&config, prices, companies, &out),
        Commands::Sectors { tickers } => run_sectors(&config, &tickers),
        Commands::Chart {
            tickers,
            sector,
            start,
            end,
            price,
            aggregate,
            out,
        } => {
            let request = ChartRequest {
                tickers,
                sector,
                start,
                end,
                price,
                aggregate,
            };
            run_chart(&config, &request, &out)
        }
        Commands::Backtest {
            request,
            adjust_inflation,
            out_dir,
        } => run_backtest_cmd(&config, &request, adjust_inflation, out_dir),
    }
}

fn load_config(path: Option<&Path>) -> Result<StockvizConfig> {
    match path {
        Some(path) => StockvizConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None if Path::new(DEFAULT_CONFIG).is_file() => {
            Ok(StockvizConfig::from_file(Path::new(DEFAULT_CONFIG))?)
        }
        None => Ok(StockvizConfig::default()),
    }
}

fn run_reshape(
    config: &StockvizConfig,
    prices: Option<PathBuf>,
    companies: Option<PathBuf>,
    out: &Path,
) -> Result<()> {
    let prices = prices.unwrap_or_else(|| config.data.prices.clone());
    let companies = companies
        .or_else(|| config.data.companies.clone())
        .context("--companies is required when no companies file is configured")?;

    let wide = read_wide_csv_path(&prices)
        .with_context(|| format!("failed to read {}", prices.display()))?;
    let directory = CompanyDirectory::from_csv_path(&companies)
        .with_context(|| format!("failed to read {}", companies.display()))?;
    let records = reshape(&wide, &directory);
    save_long_prices(&records, out)?;

    info!("wrote {} rows to {}", records.len(), out.display());
    println!(
        "Reshaped {} dates x {} tickers into {} rows: {}",
        wide.dates().len(),
        wide.tickers().len(),
        records.len(),
        out.display()
    );
    Ok(())
}

fn run_sectors(config: &StockvizConfig, tickers: &str) -> Result<()> {
    let dataset = load_dataset(&config.data)?;
    for sector in sector_choices(&dataset, tickers) {
        println!("{sector}");
    }
    Ok(())
}

fn run_chart(config: &StockvizConfig, request: &ChartRequest, out: &Path) -> Result<()> {
    let dataset = load_dataset(&config.data)?;
    let response = render_chart(&dataset, config, request)?;
    save_chart(&response.spec, out)?;

    println!(
        "{} chart for {} ({} to {}, {} rows): {}",
        response.kind.name(),
        if response.tickers.is_empty() {
            "the market".to_string()
        } else {
            response.tickers.join(", ")
        },
        response.start,
        response.end,
        response.rows,
        out.display()
    );
    Ok(())
}

fn run_backtest_cmd(
    config: &StockvizConfig,
    request_path: &Path,
    adjust_inflation: bool,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    let mut request = BacktestRequest::from_file(request_path)
        .with_context(|| format!("failed to load request {}", request_path.display()))?;
    if adjust_inflation {
        request.adjust_inflation = Some(true);
    }

    let dataset = load_dataset(&config.data)?;
    let report = run_backtest_request(&dataset, config, request)?;
    print_summary(&report);

    let dir = out_dir.unwrap_or_else(|| PathBuf::from("results").join(report.request_id()));
    save_report(&report, &dir)?;
    println!("Artifacts saved to: {}", dir.display());
    Ok(())
}

fn print_summary(report: &BacktestReport) {
    let s = &report.summary;
    println!("Request:  {}", s.request_id);
    println!("Price:    {}", s.price);
    if let (Some(first), Some(last)) = (s.first_date, s.last_date) {
        println!("Period:   {first} to {last}");
    }
    if let Some(year) = s.reference_year {
        println!("Dollars:  {year} (inflation-adjusted)");
    }
    println!();
    println!(
        "{:<10} {:>12} {:<12} {:>10} {:>12} {:>14}",
        "Label", "Invested", "Bought", "Price", "Shares", "Gain"
    );
    println!("{}", "-".repeat(75));
    for p in &s.positions {
        println!(
            "{:<10} {:>12.2} {:<12} {:>10.2} {:>12.4} {:>14.2}",
            p.label, p.invest_amount, p.first_date, p.start_price, p.shares, p.final_gain
        );
    }
    for ticker in &s.skipped {
        println!("{ticker:<10} skipped: no price data");
    }
    println!();
    println!("Total Gained: {}", s.final_total_display);
}
