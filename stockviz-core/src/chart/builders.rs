//! Chart builders for each dashboard view.
//!
//! Every builder turns rows into inline Vega-Lite data plus a detail and an
//! overview panel, then hands both to [`brush_linked`].

use serde::Serialize;
use serde_json::Value;

use super::options::{AggregateOp, ChartOptions};
use super::spec::{
    brush_linked, Channel, ChartSpec, ColorEncoding, Encoding, Layer, Mark, Panel, SecondaryChannel,
};
use crate::domain::{GainRow, PriceField, PriceRecord};

pub const RISING_COLOR: &str = "#06982d";
pub const FALLING_COLOR: &str = "#ae1325";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("chart data serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct OhlcPoint {
    date: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
}

#[derive(Serialize)]
struct PricePoint<'a> {
    date: String,
    ticker: &'a str,
    price: f64,
}

#[derive(Serialize)]
struct GainsPoint<'a> {
    date: String,
    label: &'a str,
    gains: f64,
}

fn to_values<T: Serialize>(points: impl IntoIterator<Item = T>) -> Result<Vec<Value>, ChartError> {
    points
        .into_iter()
        .map(|p| serde_json::to_value(p).map_err(ChartError::from))
        .collect()
}

fn date_axis() -> Channel {
    Channel::temporal("date").title("Date")
}

/// Rule low→high under a bar open→close, colored by direction, over a
/// close-price overview.
pub fn candlestick_chart(
    rows: &[&PriceRecord],
    options: &ChartOptions,
) -> Result<ChartSpec, ChartError> {
    let points = rows
        .iter()
        .filter(|r| [r.open, r.high, r.low, r.close].iter().any(Option::is_some))
        .map(|r| OhlcPoint {
            date: r.date.to_string(),
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
        });
    let data = to_values(points)?;

    let shared = Encoding {
        x: Some(date_axis().format(DATE_FORMAT)),
        color: Some(ColorEncoding::conditional(
            "datum.open <= datum.close",
            RISING_COLOR,
            FALLING_COLOR,
        )),
        ..Default::default()
    };
    let wick = Layer {
        mark: Mark::Rule,
        encoding: Encoding {
            y: Some(Channel::quantitative("low").title("Price (USD)").unzeroed()),
            y2: Some(SecondaryChannel::new("high")),
            ..Default::default()
        },
    };
    let body = Layer {
        mark: Mark::Bar,
        encoding: Encoding {
            y: Some(Channel::quantitative("open").unzeroed()),
            y2: Some(SecondaryChannel::new("close")),
            ..Default::default()
        },
    };
    let detail = Panel::layered(vec![wick, body], shared, options.width, options.upper_height);

    let overview = Panel::single(
        Mark::Line,
        Encoding {
            x: Some(date_axis()),
            y: Some(Channel::quantitative("close").title("Close (USD)").unzeroed()),
            ..Default::default()
        },
        options.width,
        options.lower_height,
    );

    Ok(brush_linked(data, detail, overview))
}

fn price_points<'a>(
    rows: &'a [&PriceRecord],
    field: PriceField,
) -> impl Iterator<Item = PricePoint<'a>> {
    rows.iter().filter_map(move |r| {
        r.price(field).filter(|p| p.is_finite()).map(|price| PricePoint {
            date: r.date.to_string(),
            ticker: r.ticker.as_str(),
            price,
        })
    })
}

/// One line per ticker of `field`.
pub fn comparison_chart(
    rows: &[&PriceRecord],
    field: PriceField,
    options: &ChartOptions,
) -> Result<ChartSpec, ChartError> {
    let data = to_values(price_points(rows, field))?;

    let panel = |height: u32, titled: bool| {
        let y = Channel::quantitative("price").unzeroed();
        Panel::single(
            Mark::Line,
            Encoding {
                x: Some(date_axis()),
                y: Some(if titled { y.title("Price") } else { y }),
                color: Some(ColorEncoding::Field(Channel::nominal("ticker").title("Ticker"))),
                ..Default::default()
            },
            options.width,
            height,
        )
    };

    Ok(brush_linked(
        data,
        panel(options.upper_height, true),
        panel(options.lower_height, false),
    ))
}

/// One line of `op` over every ticker's `field`, per date.
pub fn aggregate_chart(
    rows: &[&PriceRecord],
    field: PriceField,
    op: AggregateOp,
    options: &ChartOptions,
) -> Result<ChartSpec, ChartError> {
    let data = to_values(price_points(rows, field))?;

    let panel = |height: u32| {
        Panel::single(
            Mark::Line,
            Encoding {
                x: Some(date_axis()),
                y: Some(
                    Channel::quantitative("price")
                        .aggregate(op)
                        .title(op.axis_title())
                        .unzeroed(),
                ),
                ..Default::default()
            },
            options.width,
            height,
        )
    };

    Ok(brush_linked(
        data,
        panel(options.upper_height),
        panel(options.lower_height),
    ))
}

/// Multi-line gains chart titled with the final total.
pub fn gains_chart(
    rows: &[GainRow],
    final_total: f64,
    options: &ChartOptions,
) -> Result<ChartSpec, ChartError> {
    let data = to_values(rows.iter().map(|r| GainsPoint {
        date: r.date.to_string(),
        label: r.label.as_str(),
        gains: r.gains,
    }))?;

    let detail = Panel::single(
        Mark::Line,
        Encoding {
            x: Some(date_axis()),
            y: Some(Channel::quantitative("gains").title("Gains (USD)")),
            color: Some(ColorEncoding::Field(Channel::nominal("label").title("Ticker"))),
            tooltip: vec![
                Channel::temporal("date").title("Date"),
                Channel::nominal("label").title("Ticker"),
                Channel::quantitative("gains").title("Gains (USD)"),
            ],
            ..Default::default()
        },
        options.width,
        options.upper_height,
    );
    let overview = Panel::single(
        Mark::Line,
        Encoding {
            x: Some(date_axis()),
            y: Some(Channel::quantitative("gains")),
            color: Some(ColorEncoding::Field(Channel::nominal("label"))),
            ..Default::default()
        },
        options.width,
        options.lower_height,
    );

    Ok(brush_linked(data, detail, overview)
        .with_title(format!("Total Gained: {}", format_usd(final_total))))
}

/// `$1,234.56`; negatives as `-$1,234.56`.
pub fn format_usd(value: f64) -> String {
    if !value.is_finite() {
        return format!("${value}");
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed != "0.00";
    format!("{}${grouped}.{frac_part}", if negative { "-" } else { "" })
}
