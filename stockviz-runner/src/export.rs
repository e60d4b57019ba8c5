//! Artifact export: gains CSV, chart JSON, summary JSON, long price tables.
//!
//! A backtest writes three files into its output directory:
//! - `gains.csv`: tidy `(date, ticker, gains)` rows, positions then `Total`
//! - `chart.json`: the Vega-Lite gains chart
//! - `summary.json`: request id, per-position figures, final total
//!
//! Persisted summaries carry a `schema_version`; newer versions are rejected
//! on load.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use stockviz_core::chart::ChartSpec;
use stockviz_core::data::{write_long_csv, PriceStore};
use stockviz_core::domain::{GainRow, PriceRecord};

use crate::runner::{BacktestReport, BacktestSummary, SCHEMA_VERSION};

pub const GAINS_FILE: &str = "gains.csv";
pub const CHART_FILE: &str = "chart.json";
pub const SUMMARY_FILE: &str = "summary.json";

// ─── CSV export ─────────────────────────────────────────────────────

/// Tidy gains rows. Columns: date, ticker, gains.
pub fn export_gains_csv(rows: &[GainRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "ticker", "gains"])?;
    for r in rows {
        wtr.write_record([&r.date.to_string(), &r.label, &format!("{:.6}", r.gains)])?;
    }
    let bytes = wtr.into_inner().context("failed to flush gains CSV")?;
    String::from_utf8(bytes).context("gains CSV is not UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_chart_json(spec: &ChartSpec) -> Result<String> {
    spec.to_json_pretty().context("failed to serialize chart spec")
}

pub fn export_summary_json(summary: &BacktestSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize backtest summary")
}

/// Parse a summary, rejecting schema versions newer than this build writes.
pub fn import_summary_json(json: &str) -> Result<BacktestSummary> {
    let summary: BacktestSummary =
        serde_json::from_str(json).context("failed to deserialize backtest summary")?;
    if summary.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            summary.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(summary)
}

// ─── File output ────────────────────────────────────────────────────

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Write a chart spec as pretty JSON.
pub fn save_chart(spec: &ChartSpec, path: &Path) -> Result<()> {
    write_file(path, &export_chart_json(spec)?)
}

/// Write the three backtest artifacts into `dir`, returning their paths.
pub fn save_report(report: &BacktestReport, dir: &Path) -> Result<Vec<PathBuf>> {
    let files = [
        (GAINS_FILE, export_gains_csv(&report.rows)?),
        (CHART_FILE, export_chart_json(&report.chart)?),
        (SUMMARY_FILE, export_summary_json(&report.summary)?),
    ];
    let mut written = Vec::with_capacity(files.len());
    for (name, content) in files {
        let path = dir.join(name);
        write_file(&path, &content)?;
        written.push(path);
    }
    Ok(written)
}

/// Write joined long records as Parquet or CSV, chosen by extension.
pub fn save_long_prices(records: &[PriceRecord], path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("parquet") => PriceStore::new(path)
            .write(records)
            .with_context(|| format!("failed to write {}", path.display())),
        Some("csv") => {
            let mut buf = Vec::new();
            write_long_csv(records, &mut buf).context("failed to encode long CSV")?;
            let text = String::from_utf8(buf).context("long CSV is not UTF-8")?;
            write_file(path, &text)
        }
        _ => bail!(
            "unsupported output '{}' (expected .parquet or .csv)",
            path.display()
        ),
    }
}
