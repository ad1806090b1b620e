//! Flat-file persistence for directories and results tables.
//!
//! Files live directly in the data directory and are named after the site,
//! the kind of table and the date they were written:
//! `{site}_directory_{YYYY-MM-DD}.csv` and
//! `{site}_results_{YYYY-MM-DD}[_{n}].csv`.

mod directory_file;
mod results_file;

pub use directory_file::{read_directory, write_directory};
pub use results_file::{read_results, write_results};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

/// Error reading or writing a table file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Malformed file {path} (line {line}): {reason}")]
    Malformed {
        path: PathBuf,
        line: u64,
        reason: String,
    },
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        StorageError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn malformed(path: &Path, line: u64, reason: impl Into<String>) -> Self {
        StorageError::Malformed {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }

    /// True when a write failed because the destination already exists.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StorageError::Io { source, .. } if source.kind() == io::ErrorKind::AlreadyExists)
    }
}

/// Kind of table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Directory,
    Results,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::Results => "results",
        }
    }
}

fn file_stem(site_id: &str, kind: TableKind, date: NaiveDate) -> String {
    format!("{}_{}_{}", site_id, kind.as_str(), date.format("%Y-%m-%d"))
}

/// Path of the directory file for a site and date.
///
/// A directory written twice on the same day replaces the earlier file; the
/// later one is always a superset.
pub fn directory_path(data_dir: &Path, site_id: &str, date: NaiveDate) -> PathBuf {
    data_dir.join(format!(
        "{}.csv",
        file_stem(site_id, TableKind::Directory, date)
    ))
}

/// First unused results path for a site and date.
///
/// Results snapshots are never overwritten: a second run on the same day
/// gets a `_2` suffix, then `_3`, and so on.
pub fn next_results_path(data_dir: &Path, site_id: &str, date: NaiveDate) -> PathBuf {
    let stem = file_stem(site_id, TableKind::Results, date);
    let first = data_dir.join(format!("{}.csv", stem));
    if !first.exists() {
        return first;
    }
    (2u32..)
        .map(|n| data_dir.join(format!("{}_{}.csv", stem, n)))
        .find(|path| !path.exists())
        .unwrap_or(first)
}

/// Parse `(date, sequence)` out of a table file name for a site and kind.
fn parse_table_file_name(name: &str, site_id: &str, kind: TableKind) -> Option<(NaiveDate, u32)> {
    let prefix = format!("{}_{}_", site_id, kind.as_str());
    let rest = name.strip_prefix(&prefix)?.strip_suffix(".csv")?;
    let (date_part, seq) = match rest.split_once('_') {
        Some((date, seq)) => (date, seq.parse::<u32>().ok()?),
        None => (rest, 1),
    };
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    Some((date, seq))
}

/// Most recent table file of a kind for a site, if any exists.
pub fn latest_file(
    data_dir: &Path,
    site_id: &str,
    kind: TableKind,
) -> Result<Option<PathBuf>, StorageError> {
    let entries = match fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(data_dir, e)),
    };

    let mut best: Option<((NaiveDate, u32), PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| StorageError::io(data_dir, e))?;
        let name = entry.file_name();
        let Some(key) = name
            .to_str()
            .and_then(|n| parse_table_file_name(n, site_id, kind))
        else {
            continue;
        };
        if best.as_ref().map_or(true, |(best_key, _)| key > *best_key) {
            best = Some((key, entry.path()));
        }
    }
    Ok(best.map(|(_, path)| path))
}

/// Write a file atomically: data goes to a temp file in the same directory,
/// which is then renamed over the destination.
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> Result<(), StorageError>
where
    F: FnOnce(&mut dyn io::Write) -> Result<(), StorageError>,
{
    let tmp = write_temp(path, write)?;
    tmp.persist(path)
        .map_err(|e| StorageError::io(path, e.error))?;
    Ok(())
}

/// Like [`write_atomic`], but fails with `AlreadyExists` instead of
/// replacing an existing destination.
pub(crate) fn write_new<F>(path: &Path, write: F) -> Result<(), StorageError>
where
    F: FnOnce(&mut dyn io::Write) -> Result<(), StorageError>,
{
    let tmp = write_temp(path, write)?;
    tmp.persist_noclobber(path)
        .map_err(|e| StorageError::io(path, e.error))?;
    Ok(())
}

fn write_temp<F>(path: &Path, write: F) -> Result<tempfile::NamedTempFile, StorageError>
where
    F: FnOnce(&mut dyn io::Write) -> Result<(), StorageError>,
{
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
    write(tmp.as_file_mut())?;
    tmp.as_file_mut()
        .sync_all()
        .map_err(|e| StorageError::io(path, e))?;
    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    #[test]
    fn test_directory_path() {
        let path = directory_path(Path::new("/data"), "evtol_news", date(9));
        assert_eq!(
            path,
            PathBuf::from("/data/evtol_news_directory_2024-07-09.csv")
        );
    }

    #[test]
    fn test_next_results_path_never_overwrites() {
        let dir = tempdir().unwrap();
        let first = next_results_path(dir.path(), "tu", date(1));
        assert!(first.ends_with("tu_results_2024-07-01.csv"));

        fs::write(&first, "url\n").unwrap();
        let second = next_results_path(dir.path(), "tu", date(1));
        assert!(second.ends_with("tu_results_2024-07-01_2.csv"));

        fs::write(&second, "url\n").unwrap();
        let third = next_results_path(dir.path(), "tu", date(1));
        assert!(third.ends_with("tu_results_2024-07-01_3.csv"));
    }

    #[test]
    fn test_write_new_refuses_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tu_results_2024-07-01.csv");
        fs::write(&path, "earlier run\n").unwrap();

        let err = write_new(&path, |out| {
            out.write_all(b"later run\n")
                .map_err(|e| StorageError::io(Path::new("tmp"), e))
        })
        .unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier run\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_parse_table_file_name() {
        assert_eq!(
            parse_table_file_name("tu_results_2024-07-01_12.csv", "tu", TableKind::Results),
            Some((date(1), 12))
        );
        assert_eq!(
            parse_table_file_name("tu_results_2024-07-01.csv", "tu", TableKind::Results),
            Some((date(1), 1))
        );
        assert_eq!(
            parse_table_file_name("tu_directory_2024-07-01.csv", "tu", TableKind::Results),
            None
        );
        assert_eq!(
            parse_table_file_name("tu_results_latest.csv", "tu", TableKind::Results),
            None
        );
    }

    #[test]
    fn test_latest_file_orders_by_date_then_sequence() {
        let dir = tempdir().unwrap();
        for name in [
            "tu_results_2024-07-01.csv",
            "tu_results_2024-07-02.csv",
            "tu_results_2024-07-02_2.csv",
            "tu_results_2024-07-02_10.csv",
            "other_results_2024-08-01.csv",
            "tu_directory_2024-09-01.csv",
        ] {
            fs::write(dir.path().join(name), "url\n").unwrap();
        }

        let latest = latest_file(dir.path(), "tu", TableKind::Results)
            .unwrap()
            .unwrap();
        assert!(latest.ends_with("tu_results_2024-07-02_10.csv"));

        let latest = latest_file(dir.path(), "tu", TableKind::Directory)
            .unwrap()
            .unwrap();
        assert!(latest.ends_with("tu_directory_2024-09-01.csv"));
    }

    #[test]
    fn test_latest_file_missing_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(latest_file(&missing, "tu", TableKind::Results)
            .unwrap()
            .is_none());
    }
}
