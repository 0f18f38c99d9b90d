//! Terminal previews of built tables.
//!
//! Formatting lives in one place so the pipeline code stays clean and output
//! changes are localized.

use crate::domain::{TidyObservation, WideTable};

/// Format the last `n` rows of a wide table, pandas-`tail` style.
pub fn format_table_tail(table: &WideTable, n: usize, precision: usize) -> String {
    let mut out = String::new();

    out.push_str("date");
    if let Some(label) = &table.key_label {
        out.push(',');
        out.push_str(label);
    }
    for column in &table.columns {
        out.push(',');
        out.push_str(column);
    }
    out.push('\n');

    let start = table.rows.len().saturating_sub(n);
    for row in &table.rows[start..] {
        out.push_str(&row.date.format("%Y-%m-%d").to_string());
        if table.key_label.is_some() {
            out.push(',');
            out.push_str(row.key.as_deref().unwrap_or(""));
        }
        for cell in &row.cells {
            out.push(',');
            if let Some(value) = cell {
                out.push_str(&format!("{value:.precision$}"));
            }
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "[{} rows x {} columns]\n",
        table.rows.len(),
        table.columns.len()
    ));
    out
}

/// Format the first `n` tidy observations.
pub fn format_tidy_head(observations: &[TidyObservation], n: usize) -> String {
    let mut out = String::from("date,sector,geo,value\n");
    for o in observations.iter().take(n) {
        out.push_str(&format!(
            "{},{},{},{}\n",
            o.date.format("%Y-%m-%d"),
            o.category,
            o.entity,
            o.value
        ));
    }
    out.push_str(&format!("[{} rows]\n", observations.len()));
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::WideRow;

    #[test]
    fn tail_shows_only_last_rows() {
        let rows: Vec<WideRow> = (1..=10)
            .map(|day| WideRow {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                key: None,
                cells: vec![Some(day as f64)],
            })
            .collect();
        let table = WideTable {
            key_label: None,
            columns: vec!["x".to_string()],
            rows,
        };
        let text = format_table_tail(&table, 3, 2);
        assert!(!text.contains("2024-01-07"));
        assert!(text.contains("2024-01-08"));
        assert!(text.contains("[10 rows x 1 columns]"));
    }
}
