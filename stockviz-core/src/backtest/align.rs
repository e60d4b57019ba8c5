//! Multi-series time alignment for gain series.
//!
//! Series are placed on the union of their dates. Between observations a
//! series carries its last gain forward; before its first observation it is 0
//! (nothing invested yet, nothing gained).

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::domain::{GainPoint, GainRow, GainSeries, TOTAL_LABEL};

/// Gain series on a common timeline plus their per-date sum.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedGains {
    /// The common date axis (sorted ascending).
    pub dates: Vec<NaiveDate>,
    /// `(label, gains)` per series; each gains Vec has the length of `dates`.
    pub columns: Vec<(String, Vec<f64>)>,
    /// Per-date sum over `columns`.
    pub total: Vec<f64>,
}

impl AlignedGains {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn final_total(&self) -> f64 {
        self.total.last().copied().unwrap_or(0.0)
    }

    pub fn total_points(&self) -> Vec<GainPoint> {
        self.dates
            .iter()
            .zip(&self.total)
            .map(|(&date, &gains)| GainPoint { date, gains })
            .collect()
    }

    /// Tidy rows: every date of the first series, then the next series, and
    /// finally [`TOTAL_LABEL`].
    pub fn rows(&self) -> Vec<GainRow> {
        let labelled = self
            .columns
            .iter()
            .map(|(label, gains)| (label.as_str(), gains))
            .chain(std::iter::once((TOTAL_LABEL, &self.total)));

        let mut rows = Vec::with_capacity(self.dates.len() * (self.columns.len() + 1));
        for (label, gains) in labelled {
            rows.extend(self.dates.iter().zip(gains).map(|(&date, &gains)| GainRow {
                date,
                label: label.to_string(),
                gains,
            }));
        }
        rows
    }

    /// Apply `f(date, gain)` to every aligned value, including the total.
    pub fn try_map<E>(
        &self,
        mut f: impl FnMut(NaiveDate, f64) -> Result<f64, E>,
    ) -> Result<Self, E> {
        let mut map_column = |gains: &[f64]| -> Result<Vec<f64>, E> {
            self.dates.iter().zip(gains).map(|(&d, &g)| f(d, g)).collect()
        };
        let columns = self
            .columns
            .iter()
            .map(|(label, gains)| Ok((label.clone(), map_column(gains)?)))
            .collect::<Result<Vec<_>, E>>()?;
        let total = map_column(&self.total)?;
        Ok(Self {
            dates: self.dates.clone(),
            columns,
            total,
        })
    }
}

/// Align series to the union of their dates, forward-filling each one.
pub fn align_gains(series: &[GainSeries]) -> AlignedGains {
    let dates: Vec<NaiveDate> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let columns: Vec<(String, Vec<f64>)> = series
        .iter()
        .map(|s| (s.label.clone(), forward_fill(&dates, &s.points)))
        .collect();

    let total: Vec<f64> = (0..dates.len())
        .map(|i| columns.iter().map(|(_, gains)| gains[i]).sum::<f64>())
        .collect();

    AlignedGains {
        dates,
        columns,
        total,
    }
}

/// `points` must be sorted by date and every date must appear in `dates`.
fn forward_fill(dates: &[NaiveDate], points: &[GainPoint]) -> Vec<f64> {
    let mut out = Vec::with_capacity(dates.len());
    let mut next = points.iter().peekable();
    let mut last = 0.0;
    for date in dates {
        if let Some(p) = next.next_if(|p| p.date == *date) {
            last = p.gains;
        }
        out.push(last);
    }
    out
}
