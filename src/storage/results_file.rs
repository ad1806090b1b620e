//! Results CSV files: `url, display_name, category`, then one column per
//! site field. An empty cell is a null value.

use std::fs::File;
use std::path::Path;

use tracing::debug;

use super::{write_new, StorageError};
use crate::models::{AircraftRecord, ResultsTable};

const FIXED: [&str; 3] = ["url", "display_name", "category"];

/// Write a results table to a new file. An existing file at `path` is left
/// untouched and the write fails with an `AlreadyExists` I/O error.
pub fn write_results(path: &Path, table: &ResultsTable) -> Result<(), StorageError> {
    write_new(path, |out| {
        let mut writer = csv::Writer::from_writer(out);
        let header = FIXED
            .iter()
            .copied()
            .chain(table.columns.iter().map(String::as_str));
        writer
            .write_record(header)
            .map_err(|e| StorageError::csv(path, e))?;

        for row in &table.rows {
            let cells = [
                row.url.as_str(),
                row.display_name.as_str(),
                row.category.as_deref().unwrap_or(""),
            ]
            .into_iter()
            .chain(table.columns.iter().map(|c| row.get(c).unwrap_or("")));
            writer
                .write_record(cells)
                .map_err(|e| StorageError::csv(path, e))?;
        }
        writer.flush().map_err(|e| StorageError::io(path, e))
    })?;

    debug!(path = %path.display(), rows = table.len(), "Wrote results");
    Ok(())
}

/// Read a results file back into a table.
///
/// The header must start with the fixed `url, display_name, category`
/// columns; every later column is a field.
pub fn read_results(path: &Path) -> Result<ResultsTable, StorageError> {
    let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);

    let header = reader
        .headers()
        .map_err(|e| StorageError::csv(path, e))?
        .clone();
    let names: Vec<&str> = header.iter().map(str::trim).collect();
    if names.len() < FIXED.len() || names[..FIXED.len()] != FIXED {
        return Err(StorageError::malformed(
            path,
            1,
            format!("header must start with {}", FIXED.join(",")),
        ));
    }
    let columns: Vec<String> = names[FIXED.len()..]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut table = ResultsTable::new(columns);
    for row in reader.records() {
        let row = row.map_err(|e| StorageError::csv(path, e))?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let url = row.get(0).unwrap_or("").trim();
        if url.is_empty() {
            return Err(StorageError::malformed(path, line, "empty url"));
        }

        let cell = |idx: usize| {
            row.get(idx)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let mut record = AircraftRecord {
            url: url.to_string(),
            display_name: row.get(1).unwrap_or("").trim().to_string(),
            category: cell(2),
            fields: Vec::with_capacity(table.columns.len()),
        };
        for (offset, column) in table.columns.iter().enumerate() {
            record.fields.push((column.clone(), cell(FIXED.len() + offset)));
        }
        table.push(record);
    }

    debug!(path = %path.display(), rows = table.len(), "Read results");
    Ok(table)
}
