//! Chart sizing and field choices.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::PriceField;

/// Per-date statistic for the aggregate chart, named as in Vega-Lite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    Mean,
    Median,
    Min,
    Max,
    Sum,
    Stdev,
    Variance,
}

impl AggregateOp {
    pub const ALL: [AggregateOp; 7] = [
        AggregateOp::Mean,
        AggregateOp::Median,
        AggregateOp::Min,
        AggregateOp::Max,
        AggregateOp::Sum,
        AggregateOp::Stdev,
        AggregateOp::Variance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AggregateOp::Mean => "mean",
            AggregateOp::Median => "median",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
            AggregateOp::Sum => "sum",
            AggregateOp::Stdev => "stdev",
            AggregateOp::Variance => "variance",
        }
    }

    /// Axis title for the aggregated price.
    pub fn axis_title(self) -> &'static str {
        match self {
            AggregateOp::Mean => "Average Price",
            AggregateOp::Median => "Median Price",
            AggregateOp::Min => "Minimum Price",
            AggregateOp::Max => "Maximum Price",
            AggregateOp::Sum => "Summed Price",
            AggregateOp::Stdev => "Price Std. Dev.",
            AggregateOp::Variance => "Price Variance",
        }
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown aggregate '{0}' (expected one of: mean, median, min, max, sum, stdev, variance)")]
pub struct UnknownAggregate(pub String);

impl FromStr for AggregateOp {
    type Err = UnknownAggregate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let lower = match lower.as_str() {
            "average" | "avg" => "mean",
            other => other,
        };
        AggregateOp::ALL
            .into_iter()
            .find(|op| op.as_str() == lower)
            .ok_or_else(|| UnknownAggregate(s.to_string()))
    }
}

/// Dimensions and field choices shared by every chart variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub width: u32,
    /// Height of the brush-controlled detail panel.
    pub upper_height: u32,
    /// Height of the brush-owning overview panel.
    pub lower_height: u32,
    /// Price plotted by the comparison and aggregate charts.
    pub price_field: PriceField,
    pub aggregate: AggregateOp,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 650,
            upper_height: 650,
            lower_height: 100,
            price_field: PriceField::Close,
            aggregate: AggregateOp::Mean,
        }
    }
}
