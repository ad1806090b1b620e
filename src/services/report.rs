//! Reports over the files already in the data directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::storage::{self, StorageError, TableKind};

/// A table file and its row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFile {
    pub path: PathBuf,
    pub rows: usize,
}

/// State of one site's data on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteStatus {
    pub site_id: String,
    pub directory: Option<TableFile>,
    pub results: Option<TableFile>,
    /// Directory urls with no row in the latest results file.
    pub pending: Vec<String>,
}

/// Summarise the latest directory and results files for a site.
pub fn site_status(data_dir: &Path, site_id: &str) -> Result<SiteStatus, StorageError> {
    let directory = match storage::latest_file(data_dir, site_id, TableKind::Directory)? {
        Some(path) => Some((storage::read_directory(&path)?, path)),
        None => None,
    };
    let results = match storage::latest_file(data_dir, site_id, TableKind::Results)? {
        Some(path) => Some((storage::read_results(&path)?, path)),
        None => None,
    };

    let scraped: HashSet<&str> = results
        .iter()
        .flat_map(|(table, _)| table.rows.iter().map(|r| r.url.as_str()))
        .collect();
    let pending = directory
        .iter()
        .flat_map(|(dir, _)| dir.iter())
        .filter(|e| !scraped.contains(e.url.as_str()))
        .map(|e| e.url.clone())
        .collect();

    Ok(SiteStatus {
        site_id: site_id.to_string(),
        directory: directory.as_ref().map(|(dir, path)| TableFile {
            path: path.clone(),
            rows: dir.len(),
        }),
        results: results.as_ref().map(|(table, path)| TableFile {
            path: path.clone(),
            rows: table.len(),
        }),
        pending,
    })
}

/// Null counts per column of the latest results file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullReport {
    pub file: TableFile,
    /// `(column, nulls)` sorted by nulls descending; complete columns omitted.
    pub nulls: Vec<(String, usize)>,
}

pub fn null_report(data_dir: &Path, site_id: &str) -> Result<Option<NullReport>, StorageError> {
    let Some(path) = storage::latest_file(data_dir, site_id, TableKind::Results)? else {
        return Ok(None);
    };
    let table = storage::read_results(&path)?;
    Ok(Some(NullReport {
        file: TableFile {
            rows: table.len(),
            path,
        },
        nulls: table.null_counts(),
    }))
}
