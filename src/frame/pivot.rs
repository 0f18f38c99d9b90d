//! Tidy-to-wide pivots.
//!
//! From one tidy table two complementary views are built:
//!
//! - *by-entity*: rows keyed (date, entity), one column per category
//! - *by-category*: rows keyed (date, category), one column per entity
//!
//! Both views are deterministic: rows sort lexicographically by (date, key)
//! and columns follow the configured enumeration order, with any unexpected
//! names appended in first-seen order. Stable ordering keeps the exported
//! files diffable across runs.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::domain::{TidyObservation, WideRow, WideTable};

/// Pivot with rows keyed by (date, entity) and one column per category.
pub fn pivot_by_entity(
    observations: &[TidyObservation],
    category_order: &[&str],
    key_label: &str,
) -> WideTable {
    pivot(
        observations,
        |o| o.entity.as_str(),
        |o| o.category.as_str(),
        category_order,
        key_label,
    )
}

/// Pivot with rows keyed by (date, category) and one column per entity.
pub fn pivot_by_category(
    observations: &[TidyObservation],
    entity_order: &[&str],
    key_label: &str,
) -> WideTable {
    pivot(
        observations,
        |o| o.category.as_str(),
        |o| o.entity.as_str(),
        entity_order,
        key_label,
    )
}

fn pivot<'a>(
    observations: &'a [TidyObservation],
    key_of: impl Fn(&'a TidyObservation) -> &'a str,
    column_of: impl Fn(&'a TidyObservation) -> &'a str,
    configured_order: &[&str],
    key_label: &str,
) -> WideTable {
    // Configured names that actually appeared, then extras in first-seen order.
    let mut columns: Vec<String> = Vec::new();
    for configured in configured_order {
        if observations.iter().any(|o| column_of(o) == *configured) {
            columns.push(configured.to_string());
        }
    }
    for o in observations {
        let name = column_of(o);
        if !configured_order.contains(&name) && !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }

    let column_index: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    // BTreeMap keys give the lexicographic (date, key) row order directly.
    let mut cells: BTreeMap<(NaiveDate, String), Vec<Option<f64>>> = BTreeMap::new();
    for o in observations {
        let row = cells
            .entry((o.date, key_of(o).to_string()))
            .or_insert_with(|| vec![None; columns.len()]);
        let idx = column_index[column_of(o)];
        // First observation wins; later duplicates are discarded.
        if row[idx].is_none() {
            row[idx] = Some(o.value);
        }
    }

    WideTable {
        key_label: Some(key_label.to_string()),
        columns,
        rows: cells
            .into_iter()
            .map(|((date, key), cells)| WideRow {
                date,
                key: Some(key),
                cells,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn obs(date: NaiveDate, category: &str, entity: &str, value: f64) -> TidyObservation {
        TidyObservation {
            date,
            category: category.to_string(),
            entity: entity.to_string(),
            value,
        }
    }

    #[test]
    fn by_entity_uses_configured_category_order() {
        let tidy = vec![
            obs(d(2024, 1, 1), "ENERGY", "DE", -1.2),
            obs(d(2024, 1, 1), "ALL_ITEMS", "DE", 2.9),
        ];
        let table = pivot_by_entity(&tidy, &["ALL_ITEMS", "ENERGY", "FOOD"], "country");
        // FOOD never appeared, so it is absent; configured order otherwise.
        assert_eq!(table.columns, vec!["ALL_ITEMS", "ENERGY"]);
        assert_eq!(table.key_label.as_deref(), Some("country"));
        assert_eq!(table.rows[0].cells, vec![Some(2.9), Some(-1.2)]);
    }

    #[test]
    fn unexpected_columns_append_in_first_seen_order() {
        let tidy = vec![
            obs(d(2024, 1, 1), "ZEBRA", "DE", 1.0),
            obs(d(2024, 1, 1), "ALL_ITEMS", "DE", 2.0),
            obs(d(2024, 1, 1), "APPLE", "DE", 3.0),
        ];
        let table = pivot_by_entity(&tidy, &["ALL_ITEMS"], "country");
        assert_eq!(table.columns, vec!["ALL_ITEMS", "ZEBRA", "APPLE"]);
    }

    #[test]
    fn by_category_rows_sort_by_date_then_key() {
        let tidy = vec![
            obs(d(2024, 2, 1), "ALL_ITEMS", "DE", 2.0),
            obs(d(2024, 1, 1), "ENERGY", "DE", -1.0),
            obs(d(2024, 1, 1), "ALL_ITEMS", "DE", 1.0),
        ];
        let table = pivot_by_category(&tidy, &["DE", "FR"], "sector");
        let keys: Vec<(NaiveDate, &str)> = table
            .rows
            .iter()
            .map(|r| (r.date, r.key.as_deref().unwrap()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (d(2024, 1, 1), "ALL_ITEMS"),
                (d(2024, 1, 1), "ENERGY"),
                (d(2024, 2, 1), "ALL_ITEMS"),
            ]
        );
        assert_eq!(table.columns, vec!["DE"]);
    }

    #[test]
    fn duplicate_keys_keep_first_value() {
        let tidy = vec![
            obs(d(2024, 1, 1), "ALL_ITEMS", "DE", 1.0),
            obs(d(2024, 1, 1), "ALL_ITEMS", "DE", 99.0),
        ];
        let table = pivot_by_entity(&tidy, &["ALL_ITEMS"], "country");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells, vec![Some(1.0)]);
    }

    #[test]
    fn gaps_stay_absent() {
        let tidy = vec![
            obs(d(2024, 1, 1), "ALL_ITEMS", "DE", 1.0),
            obs(d(2024, 1, 1), "ENERGY", "FR", 2.0),
        ];
        let table = pivot_by_entity(&tidy, &["ALL_ITEMS", "ENERGY"], "country");
        assert_eq!(table.rows.len(), 2);
        // DE row has no ENERGY value, FR row has no ALL_ITEMS value.
        assert_eq!(table.rows[0].cells, vec![Some(1.0), None]);
        assert_eq!(table.rows[1].cells, vec![None, Some(2.0)]);
    }
}
