//! Multi-series wide collection.
//!
//! Fetches an ordered set of logical series and aligns them into one wide
//! table: one column per series (input order preserved), rows on the union
//! of all observed dates, ascending. Dates missing from a series leave the
//! cell absent; they are never zero-filled.

use std::collections::BTreeSet;
use std::collections::HashMap;

use chrono::NaiveDate;

use crate::data::SeriesTransport;
use crate::data::fetch::SeriesFetcher;
use crate::domain::{DateSpan, NumericSeries, SeriesKey, WideRow, WideTable};
use crate::error::AppError;
use crate::frame::Progress;

/// Fetch every series and assemble the wide table.
///
/// Fail-fast: any single fetch failure aborts the whole collection.
pub fn collect_wide<T: SeriesTransport>(
    fetcher: &SeriesFetcher<T>,
    series: &[SeriesKey],
    span: &DateSpan,
    progress: Progress<'_>,
) -> Result<WideTable, AppError> {
    let mut fetched: Vec<(String, NumericSeries)> = Vec::with_capacity(series.len());
    for key in series {
        progress(&format!("Fetching {key} ..."));
        let normalized = fetcher.fetch(key, span)?;
        fetched.push((key.name.clone(), normalized.series));
    }
    Ok(align_wide(&fetched))
}

/// Align already-fetched series into a wide table keyed by date only.
///
/// Public so pipelines can append derived series (e.g. a percent-change
/// column) before alignment.
pub fn align_wide(fetched: &[(String, NumericSeries)]) -> WideTable {
    let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
    for (_, s) in fetched {
        for (date, _) in s.points() {
            dates.insert(*date);
        }
    }

    // Per-series lookup; first observation wins on duplicate dates.
    let lookups: Vec<HashMap<NaiveDate, f64>> = fetched
        .iter()
        .map(|(_, s)| {
            let mut map = HashMap::with_capacity(s.len());
            for (date, value) in s.points() {
                map.entry(*date).or_insert(*value);
            }
            map
        })
        .collect();

    let rows = dates
        .into_iter()
        .map(|date| WideRow {
            date,
            key: None,
            cells: lookups.iter().map(|map| map.get(&date).copied()).collect(),
        })
        .collect();

    WideTable {
        key_label: None,
        columns: fetched.iter().map(|(name, _)| name.clone()).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawTable;
    use crate::data::fetch::RetryPolicy;
    use crate::error::TransportError;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(points: &[(NaiveDate, f64)]) -> NumericSeries {
        NumericSeries::from_unsorted(points.to_vec())
    }

    #[test]
    fn aligns_on_union_of_dates() {
        // "a" covers Jan-Mar, "b" covers Feb-Apr: 4 rows, complementary gaps.
        let a = series(&[
            (d(2024, 1, 1), 1.0),
            (d(2024, 2, 1), 1.1),
            (d(2024, 3, 1), 1.2),
        ]);
        let b = series(&[
            (d(2024, 2, 1), 2.0),
            (d(2024, 3, 1), 2.1),
            (d(2024, 4, 1), 2.2),
        ]);
        let table = align_wide(&[("a".to_string(), a), ("b".to_string(), b)]);

        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[0].date, d(2024, 1, 1));
        assert_eq!(table.rows[0].cells, vec![Some(1.0), None]);
        assert_eq!(table.rows[3].date, d(2024, 4, 1));
        assert_eq!(table.rows[3].cells, vec![None, Some(2.2)]);
    }

    #[test]
    fn column_order_follows_input_regardless_of_date_coverage() {
        // "late" starts earlier than "early" but comes second in the input.
        let late = series(&[(d(2020, 1, 1), 9.0)]);
        let early = series(&[(d(2024, 1, 1), 1.0)]);
        let table = align_wide(&[("early".to_string(), early), ("late".to_string(), late)]);
        assert_eq!(table.columns, vec!["early", "late"]);
    }

    #[test]
    fn duplicate_dates_within_a_series_keep_first_value() {
        let s = NumericSeries::from_unsorted(vec![(d(2024, 1, 1), 1.0), (d(2024, 1, 1), 2.0)]);
        let table = align_wide(&[("x".to_string(), s)]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells, vec![Some(1.0)]);
    }

    /// Serves one good series; every other code fails at the transport.
    struct OneGoodTransport {
        good_code: &'static str,
    }

    impl SeriesTransport for OneGoodTransport {
        fn fetch_raw(&self, code: &str, _span: &DateSpan) -> Result<RawTable, TransportError> {
            if code == self.good_code {
                Ok(RawTable {
                    headers: vec!["DATE".to_string(), "VALUE".to_string()],
                    rows: vec![vec!["2024-01-01".to_string(), "1.0".to_string()]],
                })
            } else {
                Err(TransportError::new("connection refused"))
            }
        }
    }

    #[test]
    fn one_failing_series_aborts_the_whole_collection() {
        let fetcher = SeriesFetcher::new(
            OneGoodTransport { good_code: "GOOD" },
            RetryPolicy {
                attempts: 2,
                pause: std::time::Duration::ZERO,
            },
        );
        let keys = vec![SeriesKey::new("a", "GOOD"), SeriesKey::new("b", "BAD")];

        let mut quiet = |_: &str| {};
        let err = collect_wide(&fetcher, &keys, &DateSpan::default(), &mut quiet).unwrap_err();
        match err {
            AppError::FetchExhausted { key, attempts, .. } => {
                assert_eq!(key, "BAD");
                assert_eq!(attempts, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
