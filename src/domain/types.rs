//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built in-memory by the fetch/normalize pipeline
//! - reshaped by the collector, tidy builder, and pivot engine
//! - exported to CSV or rendered in the TUI

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A logical series: a provider-specific compound code plus the friendly
/// name used as the output column label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesKey {
    pub code: String,
    pub name: String,
}

impl SeriesKey {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Inclusive fetch bounds, forwarded to the transport verbatim.
///
/// Providers accept different period grains (`YYYY-MM` for monthly series,
/// `YYYY-MM-DD` for daily), so the bounds stay opaque strings here; their
/// exact semantics are provider-defined and not validated at this layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateSpan {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateSpan {
    pub fn new(start: Option<String>, end: Option<String>) -> Self {
        Self { start, end }
    }
}

/// A canonical numeric series: `(date, value)` points with non-decreasing
/// dates. Duplicate dates are preserved in encounter order here; the pivot
/// engine applies its first-observation-wins rule when collapsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericSeries {
    points: Vec<(NaiveDate, f64)>,
}

impl NumericSeries {
    /// Build from unordered points. Uses a stable sort so that points sharing
    /// a date keep their encounter order.
    pub fn from_unsorted(mut points: Vec<(NaiveDate, f64)>) -> Self {
        points.sort_by_key(|(date, _)| *date);
        Self { points }
    }

    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|(d, _)| *d)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|(d, _)| *d)
    }
}

/// One long-format observation: `(date, category, entity, value)`.
///
/// For the HICP sweep the category is a sector name and the entity a geo
/// code, but the reshaping code never assumes those meanings.
#[derive(Debug, Clone, PartialEq)]
pub struct TidyObservation {
    pub date: NaiveDate,
    pub category: String,
    pub entity: String,
    pub value: f64,
}

/// A wide table: one row per date (plus an optional secondary key), one
/// value column per counterpart.
///
/// Column order is deterministic and significant; the exporter writes the
/// columns exactly as stored here.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    /// Header name of the secondary key column (`country`, `sector`), when present.
    pub key_label: Option<String>,
    /// Value column labels, in output order.
    pub columns: Vec<String>,
    pub rows: Vec<WideRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub date: NaiveDate,
    /// Secondary key value; `None` for date-only tables.
    pub key: Option<String>,
    /// One cell per `columns` entry; `None` renders as an empty CSV cell.
    pub cells: Vec<Option<f64>>,
}

/// HICP measure dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    /// Annual rate of change (% YoY).
    Anr,
    /// Index, 2015 = 100.
    Inx,
}

impl Measure {
    /// Code used in the ECB compound series key.
    pub fn code(self) -> &'static str {
        match self {
            Measure::Anr => "ANR",
            Measure::Inx => "INX",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn from_unsorted_orders_by_date() {
        let s = NumericSeries::from_unsorted(vec![
            (d(2024, 3, 1), 3.0),
            (d(2024, 1, 1), 1.0),
            (d(2024, 2, 1), 2.0),
        ]);
        let dates: Vec<_> = s.points().iter().map(|(date, _)| *date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 2, 1), d(2024, 3, 1)]);
    }

    #[test]
    fn from_unsorted_keeps_encounter_order_for_ties() {
        let s = NumericSeries::from_unsorted(vec![
            (d(2024, 1, 1), 10.0),
            (d(2024, 1, 1), 20.0),
        ]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.points()[0].1, 10.0);
        assert_eq!(s.points()[1].1, 20.0);
    }
}
