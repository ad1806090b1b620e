//! Directory CSV files: `url, display_name, category, discovered_at`.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{write_atomic, StorageError};
use crate::models::{Directory, DirectoryEntry};

const HEADER: [&str; 4] = ["url", "display_name", "category", "discovered_at"];

/// Column positions resolved from a file's header row.
struct Columns {
    url: usize,
    display_name: usize,
    category: Option<usize>,
    discovered_at: usize,
}

impl Columns {
    fn from_header(path: &Path, header: &csv::StringRecord) -> Result<Self, StorageError> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                StorageError::malformed(path, 1, format!("missing '{}' column", name))
            })
        };
        Ok(Self {
            url: require("url")?,
            display_name: require("display_name")?,
            // Files written before grouped listings have no category column
            category: find("category"),
            discovered_at: require("discovered_at")?,
        })
    }
}

/// Read a directory file.
///
/// Rows are kept in file order. A url that appears twice keeps its first
/// row; an empty `category` cell reads as `None`.
pub fn read_directory(path: &Path) -> Result<Directory, StorageError> {
    let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new().flexible(false).from_reader(file);

    let header = reader
        .headers()
        .map_err(|e| StorageError::csv(path, e))?
        .clone();
    let columns = Columns::from_header(path, &header)?;

    let mut directory = Directory::new();
    for row in reader.records() {
        let row = row.map_err(|e| StorageError::csv(path, e))?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let cell = |idx: usize| row.get(idx).unwrap_or("").trim();

        let url = cell(columns.url);
        if url.is_empty() {
            return Err(StorageError::malformed(path, line, "empty url"));
        }
        let discovered_at = NaiveDate::parse_from_str(cell(columns.discovered_at), "%Y-%m-%d")
            .map_err(|e| {
                StorageError::malformed(
                    path,
                    line,
                    format!("bad discovered_at '{}': {}", cell(columns.discovered_at), e),
                )
            })?;
        let category = columns
            .category
            .map(cell)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        let entry = DirectoryEntry {
            url: url.to_string(),
            display_name: cell(columns.display_name).to_string(),
            category,
            discovered_at,
        };
        if !directory.insert(entry) {
            warn!(path = %path.display(), line, url, "Duplicate url in directory file");
        }
    }

    debug!(path = %path.display(), entries = directory.len(), "Read directory");
    Ok(directory)
}

/// Write a directory file atomically.
pub fn write_directory(path: &Path, directory: &Directory) -> Result<(), StorageError> {
    write_atomic(path, |out| {
        let mut writer = csv::Writer::from_writer(out);
        writer
            .write_record(HEADER)
            .map_err(|e| StorageError::csv(path, e))?;
        for entry in directory {
            let discovered_at = entry.discovered_at.format("%Y-%m-%d").to_string();
            writer
                .write_record([
                    entry.url.as_str(),
                    entry.display_name.as_str(),
                    entry.category.as_deref().unwrap_or(""),
                    discovered_at.as_str(),
                ])
                .map_err(|e| StorageError::csv(path, e))?;
        }
        writer
            .flush()
            .map_err(|e| StorageError::io(path, e))
    })?;

    debug!(path = %path.display(), entries = directory.len(), "Wrote directory");
    Ok(())
}
