use crate::error::{PamError, Result};
use crate::types::{CanonicalRecord, NormalizedTable};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

fn csv_err(path: &Path) -> impl Fn(csv::Error) -> PamError + '_ {
    move |e| PamError::Csv {
        path: path.to_path_buf(),
        source: e,
    }
}

fn io_err(path: &Path) -> impl Fn(std::io::Error) -> PamError + '_ {
    move |e| PamError::Io {
        path: path.to_path_buf(),
        source: e,
    }
}

/// Write `records` with the table's own header, as UTF-8 CSV.
///
/// Used both for the filtered export and for persisting the canonical file;
/// reading the result back through the normalizer yields the same rows.
pub fn write_records<'a, I>(path: &Path, table: &NormalizedTable, records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err(path))?;
    wtr.write_record(&table.columns).map_err(csv_err(path))?;
    let mut written = 0usize;
    for r in records {
        wtr.write_record(table.row_cells(r)).map_err(csv_err(path))?;
        written += 1;
    }
    wtr.flush().map_err(io_err(path))?;
    Ok(written)
}

pub fn write_normalized(path: &Path, table: &NormalizedTable) -> Result<usize> {
    write_records(path, table, &table.records)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(io_err(path))?;
    Ok(())
}

/// Markdown rendering of the first `max_rows` rows, or `(no rows)`.
pub fn markdown_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", markdown_table(rows, max_rows));
}
