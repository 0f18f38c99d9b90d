//! Raw response normalization.
//!
//! This module turns a heterogeneous provider response into a canonical
//! numeric series:
//!
//! - date/value columns resolved by case-insensitive alias match
//! - dates accepted at daily, monthly, or annual grain (pinned to day 1)
//! - decimal commas normalized to points before numeric parsing
//! - rows where either parse fails are dropped, not defaulted
//! - output sorted ascending by date (stable, so duplicate dates keep
//!   encounter order)
//!
//! Dropped rows are counted and surfaced as a diagnostic, but do not change
//! the success/failure contract.

use chrono::NaiveDate;

use crate::data::RawTable;
use crate::domain::NumericSeries;
use crate::error::{AppError, MalformedKind};

/// Date-column aliases, checked in order.
pub const DATE_ALIASES: [&str; 3] = ["TIME_PERIOD", "DATE", "OBSERVATION_DATE"];

/// Value-column aliases, checked in order.
pub const VALUE_ALIASES: [&str; 2] = ["OBS_VALUE", "VALUE"];

/// Normalizer output: the canonical series plus row-level diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    pub series: NumericSeries,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

/// Normalize one raw response into a `NumericSeries`.
///
/// `key` only labels error messages. Fails with `MalformedData` when the
/// date or value column is absent, when the response carries no rows, when
/// every date fails to parse (wrong column entirely), or when nothing
/// survives parsing.
pub fn normalize_series(
    key: &str,
    raw: &RawTable,
    date_aliases: &[&str],
    value_aliases: &[&str],
) -> Result<NormalizedSeries, AppError> {
    // A fully empty response (no header line at all) is "no data", not a
    // structural failure; sweeps over many series treat it as valid absence.
    if raw.headers.is_empty() && raw.rows.is_empty() {
        return Err(AppError::malformed(
            key,
            MalformedKind::NoObservations,
            "empty response",
        ));
    }

    let date_idx = resolve_column(&raw.headers, date_aliases).ok_or_else(|| {
        AppError::malformed(
            key,
            MalformedKind::MissingDateColumn,
            format!("no column matched date aliases {date_aliases:?}"),
        )
    })?;
    let value_idx = resolve_column(&raw.headers, value_aliases).ok_or_else(|| {
        AppError::malformed(
            key,
            MalformedKind::MissingValueColumn,
            format!("no column matched value aliases {value_aliases:?}"),
        )
    })?;

    if raw.rows.is_empty() {
        return Err(AppError::malformed(
            key,
            MalformedKind::NoObservations,
            "no observation rows returned",
        ));
    }

    let mut points = Vec::with_capacity(raw.rows.len());
    let mut any_date_parsed = false;
    for row in &raw.rows {
        let date = row.get(date_idx).and_then(|cell| parse_obs_date(cell));
        if date.is_some() {
            any_date_parsed = true;
        }
        let value = row.get(value_idx).and_then(|cell| parse_obs_value(cell));
        if let (Some(date), Some(value)) = (date, value) {
            points.push((date, value));
        }
    }

    if !any_date_parsed {
        return Err(AppError::malformed(
            key,
            MalformedKind::InvalidDates,
            "no date cell could be parsed",
        ));
    }
    if points.is_empty() {
        return Err(AppError::malformed(
            key,
            MalformedKind::Empty,
            "no row survived parsing",
        ));
    }

    let rows_read = raw.rows.len();
    let rows_dropped = rows_read - points.len();
    Ok(NormalizedSeries {
        series: NumericSeries::from_unsorted(points),
        rows_read,
        rows_dropped,
    })
}

/// Resolve a column index by case-insensitive alias lookup, in alias order.
fn resolve_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    for alias in aliases {
        let hit = headers
            .iter()
            .position(|h| clean_header(h).eq_ignore_ascii_case(alias));
        if let Some(idx) = hit {
            return Some(idx);
        }
    }
    None
}

/// Trim whitespace and a UTF-8 BOM, which some exports prefix to the first
/// header (e.g. `\u{feff}DATE`).
fn clean_header(name: &str) -> &str {
    name.trim().trim_start_matches('\u{feff}')
}

/// Parse an observation date.
///
/// Monthly periods (`2024-01`) pin to the first of the month and annual
/// periods (`2024`) to January 1, matching how the providers label
/// lower-frequency observations.
pub fn parse_obs_date(cell: &str) -> Option<NaiveDate> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01-01"), "%Y-%m-%d") {
        return Some(d);
    }
    None
}

/// Parse an observation value.
///
/// FRED marks missing observations with `.`; some ECB exports use decimal
/// commas. Non-finite values are rejected.
pub fn parse_obs_value(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    let v = trimmed.replace(',', ".").parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn normalize(raw: &RawTable) -> Result<NormalizedSeries, AppError> {
        normalize_series("TEST.KEY", raw, &DATE_ALIASES, &VALUE_ALIASES)
    }

    #[test]
    fn monthly_periods_pin_to_first_of_month() {
        let raw = table(
            &["TIME_PERIOD", "OBS_VALUE"],
            &[&["2024-01", "-0.40"], &["2024-02", "-0,41"]],
        );
        let n = normalize(&raw).unwrap();
        assert_eq!(
            n.series.points(),
            &[(d(2024, 1, 1), -0.40), (d(2024, 2, 1), -0.41)]
        );
        assert_eq!(n.rows_dropped, 0);
    }

    #[test]
    fn decimal_comma_and_point_are_equivalent() {
        let comma = table(&["DATE", "VALUE"], &[&["2024-01-01", "1,23"]]);
        let point = table(&["DATE", "VALUE"], &[&["2024-01-01", "1.23"]]);
        assert_eq!(
            normalize(&comma).unwrap().series,
            normalize(&point).unwrap().series
        );
    }

    #[test]
    fn column_match_is_case_insensitive_with_bom() {
        let raw = table(
            &["\u{feff}observation_date", "obs_value"],
            &[&["2024-01-01", "5.25"]],
        );
        let n = normalize(&raw).unwrap();
        assert_eq!(n.series.points(), &[(d(2024, 1, 1), 5.25)]);
    }

    #[test]
    fn missing_value_column_is_malformed() {
        let raw = table(&["TIME_PERIOD", "OBS_STATUS"], &[&["2024-01", "A"]]);
        match normalize(&raw).unwrap_err() {
            AppError::MalformedData { kind, .. } => {
                assert_eq!(kind, MalformedKind::MissingValueColumn);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_date_column_is_malformed() {
        let raw = table(&["OBS_VALUE"], &[&["2.0"]]);
        match normalize(&raw).unwrap_err() {
            AppError::MalformedData { kind, .. } => {
                assert_eq!(kind, MalformedKind::MissingDateColumn);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unparseable_rows_are_dropped_and_counted() {
        let raw = table(
            &["DATE", "VALUE"],
            &[
                &["2024-01-01", "1.0"],
                &["2024-01-02", "."],
                &["not-a-date", "2.0"],
                &["2024-01-04", "2.5"],
            ],
        );
        let n = normalize(&raw).unwrap();
        assert_eq!(n.rows_read, 4);
        assert_eq!(n.rows_dropped, 2);
        assert_eq!(n.series.len(), 2);
    }

    #[test]
    fn all_dates_invalid_distinguished_from_no_data() {
        let raw = table(&["DATE", "VALUE"], &[&["x", "1.0"], &["y", "2.0"]]);
        match normalize(&raw).unwrap_err() {
            AppError::MalformedData { kind, .. } => {
                assert_eq!(kind, MalformedKind::InvalidDates);
                assert!(!kind.is_empty_data());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn all_values_missing_is_empty_data() {
        let raw = table(&["DATE", "VALUE"], &[&["2024-01-01", "."]]);
        match normalize(&raw).unwrap_err() {
            AppError::MalformedData { kind, .. } => {
                assert_eq!(kind, MalformedKind::Empty);
                assert!(kind.is_empty_data());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_rows_is_empty_data() {
        let raw = table(&["DATE", "VALUE"], &[]);
        match normalize(&raw).unwrap_err() {
            AppError::MalformedData { kind, .. } => {
                assert_eq!(kind, MalformedKind::NoObservations);
                assert!(kind.is_empty_data());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn output_sorted_ascending_with_ties_in_encounter_order() {
        let raw = table(
            &["DATE", "VALUE"],
            &[
                &["2024-02-01", "2.0"],
                &["2024-01-01", "1.0"],
                &["2024-01-01", "9.0"],
            ],
        );
        let n = normalize(&raw).unwrap();
        assert_eq!(
            n.series.points(),
            &[
                (d(2024, 1, 1), 1.0),
                (d(2024, 1, 1), 9.0),
                (d(2024, 2, 1), 2.0)
            ]
        );
    }

    #[test]
    fn renormalizing_normalized_output_is_a_no_op() {
        let raw = table(
            &["TIME_PERIOD", "OBS_VALUE"],
            &[&["2024-02", "2,5"], &["2024-01", "1.5"]],
        );
        let first = normalize(&raw).unwrap();

        // Re-present the normalized output as a trivial well-formed response.
        let round_trip = RawTable {
            headers: vec!["DATE".to_string(), "VALUE".to_string()],
            rows: first
                .series
                .points()
                .iter()
                .map(|(date, value)| vec![date.to_string(), value.to_string()])
                .collect(),
        };
        let second = normalize(&round_trip).unwrap();
        assert_eq!(second.series, first.series);
        assert_eq!(second.rows_dropped, 0);
    }
}
