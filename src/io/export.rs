//! Export wide tables to CSV.
//!
//! The layout is a declared output contract: one header row, dates as
//! `YYYY-MM-DD`, absent cells empty, and values at a fixed decimal precision
//! (6 for rate/FX artifacts, 4 for price-index artifacts).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::domain::WideTable;
use crate::error::AppError;

/// Write a wide table to `path`.
pub fn write_wide_csv(path: &Path, table: &WideTable, precision: usize) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("failed to create '{}'", path.display()), e))?;
    let mut writer = BufWriter::new(file);
    write_wide(&mut writer, table, precision)
        .map_err(|e| AppError::io(format!("failed to write '{}'", path.display()), e))
}

/// Write a wide table to any writer (split out for tests).
pub fn write_wide<W: Write>(w: &mut W, table: &WideTable, precision: usize) -> io::Result<()> {
    write!(w, "date")?;
    if let Some(label) = &table.key_label {
        write!(w, ",{label}")?;
    }
    for column in &table.columns {
        write!(w, ",{column}")?;
    }
    writeln!(w)?;

    for row in &table.rows {
        write!(w, "{}", row.date.format("%Y-%m-%d"))?;
        if table.key_label.is_some() {
            write!(w, ",{}", row.key.as_deref().unwrap_or(""))?;
        }
        for cell in &row.cells {
            match cell {
                Some(value) => write!(w, ",{value:.precision$}")?,
                None => write!(w, ",")?,
            }
        }
        writeln!(w)?;
    }
    Ok(())
}
