//! Two-dimensional tidy sweeps.
//!
//! For every (category, entity) pair a compound series key is built and
//! fetched; non-empty series contribute one long-format row per observation.
//! Pairs with no data are skipped silently, which keeps sparse sweeps (e.g.
//! sector aggregates unavailable for some countries) from aborting the run.

use crate::data::SeriesTransport;
use crate::data::fetch::SeriesFetcher;
use crate::domain::{DateSpan, SeriesKey, TidyObservation};
use crate::error::AppError;
use crate::frame::Progress;

/// Sweep categories × entities into a sorted tidy table.
///
/// `key_fn` builds the provider compound code from `(category_code, entity)`.
/// Output is sorted by (date, category, entity) ascending. Fail-fast on any
/// fetch error other than "empty series".
pub fn build_tidy<T, K>(
    fetcher: &SeriesFetcher<T>,
    categories: &[(&str, &str)],
    entities: &[&str],
    key_fn: K,
    span: &DateSpan,
    progress: Progress<'_>,
) -> Result<Vec<TidyObservation>, AppError>
where
    T: SeriesTransport,
    K: Fn(&str, &str) -> String,
{
    let mut out = Vec::new();
    for (category, category_code) in categories {
        for entity in entities {
            progress(&format!("Fetching {category} for {entity} ..."));
            let key = SeriesKey::new(
                format!("{category}/{entity}"),
                key_fn(category_code, entity),
            );
            let Some(normalized) = fetcher.fetch_optional(&key, span)? else {
                continue;
            };
            for (date, value) in normalized.series.points() {
                out.push(TidyObservation {
                    date: *date,
                    category: category.to_string(),
                    entity: entity.to_string(),
                    value: *value,
                });
            }
        }
    }

    out.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.entity.cmp(&b.entity))
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::RawTable;
    use crate::data::fetch::RetryPolicy;
    use crate::error::TransportError;

    /// Serves canned tables by series code; unknown codes yield no rows.
    struct MapTransport {
        tables: HashMap<String, RawTable>,
    }

    impl SeriesTransport for MapTransport {
        fn fetch_raw(&self, code: &str, _span: &DateSpan) -> Result<RawTable, TransportError> {
            Ok(self.tables.get(code).cloned().unwrap_or_default())
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn table(rows: &[(&str, &str)]) -> RawTable {
        RawTable {
            headers: vec!["TIME_PERIOD".to_string(), "OBS_VALUE".to_string()],
            rows: rows
                .iter()
                .map(|(date, value)| vec![date.to_string(), value.to_string()])
                .collect(),
        }
    }

    fn fetcher(tables: HashMap<String, RawTable>) -> SeriesFetcher<MapTransport> {
        SeriesFetcher::new(
            MapTransport { tables },
            RetryPolicy {
                attempts: 1,
                pause: std::time::Duration::ZERO,
            },
        )
    }

    #[test]
    fn skips_empty_pairs_without_error() {
        let mut tables = HashMap::new();
        tables.insert("K.000000.DE".to_string(), table(&[("2024-01", "2.9")]));
        tables.insert("K.000000.FR".to_string(), table(&[("2024-01", "3.1")]));
        tables.insert("K.NRGY00.DE".to_string(), table(&[("2024-01", "-1.2")]));
        // ENERGY/FR intentionally absent: the sweep must skip it silently.

        let mut quiet = |_: &str| {};
        let tidy = build_tidy(
            &fetcher(tables),
            &[("ALL", "000000"), ("ENERGY", "NRGY00")],
            &["DE", "FR"],
            |coicop, geo| format!("K.{coicop}.{geo}"),
            &DateSpan::default(),
            &mut quiet,
        )
        .unwrap();

        assert_eq!(tidy.len(), 3);
        assert!(
            !tidy
                .iter()
                .any(|o| o.category == "ENERGY" && o.entity == "FR")
        );
    }

    #[test]
    fn output_sorted_by_date_category_entity() {
        let mut tables = HashMap::new();
        tables.insert(
            "K.B.Y".to_string(),
            table(&[("2024-02", "1.0"), ("2024-01", "2.0")]),
        );
        tables.insert("K.A.Z".to_string(), table(&[("2024-01", "3.0")]));
        tables.insert("K.A.Y".to_string(), table(&[("2024-01", "4.0")]));

        let mut quiet = |_: &str| {};
        let tidy = build_tidy(
            &fetcher(tables),
            &[("B", "B"), ("A", "A")],
            &["Z", "Y"],
            |cat, ent| format!("K.{cat}.{ent}"),
            &DateSpan::default(),
            &mut quiet,
        )
        .unwrap();

        let keys: Vec<(NaiveDate, &str, &str)> = tidy
            .iter()
            .map(|o| (o.date, o.category.as_str(), o.entity.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (d(2024, 1, 1), "A", "Y"),
                (d(2024, 1, 1), "A", "Z"),
                (d(2024, 1, 1), "B", "Y"),
                (d(2024, 2, 1), "B", "Y"),
            ]
        );
    }

    #[test]
    fn structural_errors_abort_the_sweep() {
        let mut tables = HashMap::new();
        tables.insert(
            "K.A.Y".to_string(),
            RawTable {
                headers: vec!["TIME_PERIOD".to_string(), "OBS_VALUE".to_string()],
                rows: vec![vec!["garbage".to_string(), "1.0".to_string()]],
            },
        );

        let mut quiet = |_: &str| {};
        let err = build_tidy(
            &fetcher(tables),
            &[("A", "A")],
            &["Y"],
            |cat, ent| format!("K.{cat}.{ent}"),
            &DateSpan::default(),
            &mut quiet,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MalformedData { .. }));
    }
}
