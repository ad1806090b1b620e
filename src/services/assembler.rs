//! Table assembly: extract one record per directory entry and collect them
//! into a results table in directory order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::extractor;
use crate::models::{AircraftRecord, AssemblySummary, Directory, DirectoryEntry, ResultsTable};
use crate::scrapers::{PageSource, SiteConfig};
use crate::storage::{self, StorageError};

/// Events emitted while assembling a table.
#[derive(Debug, Clone)]
pub enum AssemblyEvent {
    /// Total number of rows that will be processed.
    Planned { total: usize, to_fetch: usize },
    /// A detail page was fetched and extracted.
    Extracted { url: String, missing: usize },
    /// A row was carried over from the previous results file.
    Reused { url: String },
    /// A detail page could not be fetched; the row is omitted.
    Failed { url: String, error: String },
}

/// Options for one assembly run.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Maximum extractions in flight.
    pub concurrency: usize,
    /// Only process the first N directory entries.
    pub limit: Option<usize>,
    /// Rows to reuse instead of refetching, keyed by url.
    pub previous: Option<ResultsTable>,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            limit: None,
            previous: None,
        }
    }
}

enum Outcome {
    Extracted(AircraftRecord),
    Reused(AircraftRecord),
    Failed,
}

/// Restrict a previous row to the site's current columns.
fn realign(previous: &AircraftRecord, entry: &DirectoryEntry, columns: &[String]) -> AircraftRecord {
    let mut record = AircraftRecord::for_entry(entry);
    record.fields = columns
        .iter()
        .map(|c| (c.clone(), previous.get(c).map(str::to_string)))
        .collect();
    record
}

/// Assemble a results table for a directory.
///
/// Rows whose detail page fails to fetch are omitted. With `concurrency`
/// above one, extractions overlap but the table is still in directory order.
pub async fn assemble(
    source: &dyn PageSource,
    site: &SiteConfig,
    directory: &Directory,
    options: &AssembleOptions,
    events: Option<mpsc::Sender<AssemblyEvent>>,
) -> (ResultsTable, AssemblySummary) {
    let columns = site.columns();
    let previous: HashMap<&str, &AircraftRecord> = options
        .previous
        .as_ref()
        .map(|table| table.by_url())
        .unwrap_or_default();

    let entries: Vec<&DirectoryEntry> = directory
        .iter()
        .take(options.limit.unwrap_or(usize::MAX))
        .collect();
    let to_fetch = entries
        .iter()
        .filter(|e| !previous.contains_key(e.url.as_str()))
        .count();

    info!(
        site = %site.id,
        rows = entries.len(),
        to_fetch,
        concurrency = options.concurrency,
        "Assembling results"
    );
    if let Some(tx) = &events {
        let _ = tx
            .send(AssemblyEvent::Planned {
                total: entries.len(),
                to_fetch,
            })
            .await;
    }

    let columns_ref = &columns;
    let previous_ref = &previous;
    let outcomes: Vec<Outcome> = stream::iter(entries.into_iter().map(|entry| {
        let tx = events.clone();
        async move {
            if let Some(prev) = previous_ref.get(entry.url.as_str()) {
                if let Some(tx) = &tx {
                    let _ = tx
                        .send(AssemblyEvent::Reused {
                            url: entry.url.clone(),
                        })
                        .await;
                }
                return Outcome::Reused(realign(prev, entry, columns_ref));
            }

            match extractor::extract(source, site, entry).await {
                Ok(record) => {
                    if let Some(tx) = &tx {
                        let _ = tx
                            .send(AssemblyEvent::Extracted {
                                url: entry.url.clone(),
                                missing: record.missing().count(),
                            })
                            .await;
                    }
                    Outcome::Extracted(record)
                }
                Err(e) => {
                    warn!(site = %site.id, url = %entry.url, error = %e, "Skipping row");
                    if let Some(tx) = &tx {
                        let _ = tx
                            .send(AssemblyEvent::Failed {
                                url: entry.url.clone(),
                                error: e.to_string(),
                            })
                            .await;
                    }
                    Outcome::Failed
                }
            }
        }
    }))
    .buffered(options.concurrency.max(1))
    .collect()
    .await;

    let mut table = ResultsTable::new(columns.clone());
    let mut summary = AssemblySummary::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Extracted(record) => {
                summary.attempted += 1;
                summary.succeeded += 1;
                table.push(record);
            }
            Outcome::Reused(record) => {
                summary.reused += 1;
                table.push(record);
            }
            Outcome::Failed => {
                summary.attempted += 1;
                summary.failed += 1;
            }
        }
    }

    info!(site = %site.id, "Assembly finished: {}", summary);
    (table, summary)
}

/// Write a results table under today's date without overwriting earlier runs.
pub fn save_results(
    data_dir: &Path,
    site_id: &str,
    table: &ResultsTable,
) -> Result<PathBuf, StorageError> {
    let today = chrono::Local::now().date_naive();
    loop {
        let path = storage::next_results_path(data_dir, site_id, today);
        match storage::write_results(&path, table) {
            Ok(()) => {
                info!(path = %path.display(), rows = table.len(), "Saved results");
                return Ok(path);
            }
            // Another run took this name between the lookup and the write
            Err(e) if e.is_already_exists() => {
                debug!(path = %path.display(), "Results file appeared, trying next name");
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::testing::MemorySource;
    use crate::scrapers::{FieldRule, ListingConfig, Locator};
    use tempfile::tempdir;

    fn site() -> SiteConfig {
        SiteConfig {
            id: "test".to_string(),
            name: "Test".to_string(),
            base_url: "https://t.test".to_string(),
            listing: ListingConfig::default(),
            fields: vec![
                FieldRule::new(
                    "manufacturer",
                    Locator::Text {
                        selector: "span.mfr".to_string(),
                        index: 0,
                    },
                ),
                FieldRule::new(
                    "range",
                    Locator::Text {
                        selector: "span.range".to_string(),
                        index: 0,
                    },
                ),
            ],
            request_delay_ms: None,
            request_jitter_ms: None,
        }
    }

    fn directory(urls: &[&str]) -> Directory {
        Directory::from_entries(
            urls.iter()
                .map(|u| DirectoryEntry::new(u.to_string(), u.to_string(), None)),
        )
    }

    fn page(mfr: &str) -> String {
        format!(r#"<span class="mfr">{}</span>"#, mfr)
    }

    fn source() -> MemorySource {
        MemorySource::new()
            .page("https://t.test/1", &page("One"))
            .page("https://t.test/3", &page("Three"))
            .page("https://t.test/4", &page("Four"))
            .page("https://t.test/5", &page("Five"))
    }

    fn urls(table: &ResultsTable) -> Vec<&str> {
        table.rows.iter().map(|r| r.url.as_str()).collect()
    }

    #[tokio::test]
    async fn test_failed_row_is_isolated() {
        let dir = directory(&["https://t.test/1", "https://t.test/2", "https://t.test/3"]);
        let (table, summary) =
            assemble(&source(), &site(), &dir, &AssembleOptions::default(), None).await;

        assert_eq!(urls(&table), vec!["https://t.test/1", "https://t.test/3"]);
        assert_eq!(table.rows[0].get("manufacturer"), Some("One"));
        assert_eq!(table.rows[1].get("manufacturer"), Some("Three"));
        assert_eq!(table.rows[1].get("range"), None);
        assert_eq!(table.columns, vec!["manufacturer", "range"]);
        assert_eq!(
            summary,
            AssemblySummary {
                attempted: 3,
                succeeded: 2,
                failed: 1,
                reused: 0
            }
        );
    }

    #[tokio::test]
    async fn test_empty_directory_saves_empty_table() {
        let data = tempdir().unwrap();
        let (table, summary) = assemble(
            &source(),
            &site(),
            &Directory::default(),
            &AssembleOptions::default(),
            None,
        )
        .await;

        assert!(table.is_empty());
        assert_eq!(table.columns, vec!["manufacturer", "range"]);
        assert_eq!(summary, AssemblySummary::default());

        let path = save_results(data.path(), "test", &table).unwrap();
        let read = storage::read_results(&path).unwrap();
        assert!(read.is_empty());
        assert_eq!(read.columns, table.columns);
    }

    #[tokio::test]
    async fn test_concurrent_run_keeps_directory_order() {
        let dir = directory(&[
            "https://t.test/5",
            "https://t.test/1",
            "https://t.test/4",
            "https://t.test/2",
            "https://t.test/3",
        ]);
        let options = AssembleOptions {
            concurrency: 4,
            ..AssembleOptions::default()
        };
        let (table, summary) = assemble(&source(), &site(), &dir, &options, None).await;

        assert_eq!(
            urls(&table),
            vec![
                "https://t.test/5",
                "https://t.test/1",
                "https://t.test/4",
                "https://t.test/3"
            ]
        );
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_limit_and_reuse() {
        let dir = directory(&["https://t.test/1", "https://t.test/3", "https://t.test/4"]);

        let mut previous = ResultsTable::new(vec!["manufacturer".to_string(), "old".to_string()]);
        let mut old = AircraftRecord::for_entry(&dir.entries()[0]);
        old.set("manufacturer", Some("Cached".to_string()));
        old.set("old", Some("gone".to_string()));
        previous.push(old);

        let options = AssembleOptions {
            concurrency: 1,
            limit: Some(2),
            previous: Some(previous),
        };
        let source = source();
        let (tx, mut rx) = mpsc::channel(16);
        let (table, summary) = assemble(&source, &site(), &dir, &options, Some(tx)).await;

        assert_eq!(urls(&table), vec!["https://t.test/1", "https://t.test/3"]);
        assert_eq!(table.rows[0].get("manufacturer"), Some("Cached"));
        assert_eq!(
            table.rows[0].fields,
            vec![
                ("manufacturer".to_string(), Some("Cached".to_string())),
                ("range".to_string(), None),
            ]
        );
        assert_eq!(summary.reused, 1);
        assert_eq!(summary.attempted, 1);
        assert_eq!(source.requests(), vec!["https://t.test/3".to_string()]);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(matches!(
            events[0],
            AssemblyEvent::Planned {
                total: 2,
                to_fetch: 1
            }
        ));
        assert!(matches!(events[1], AssemblyEvent::Reused { .. }));
        assert!(matches!(events[2], AssemblyEvent::Extracted { missing: 1, .. }));
    }

    #[test]
    fn test_save_results_never_overwrites() {
        let dir = tempdir().unwrap();
        let table = ResultsTable::new(vec!["manufacturer".to_string()]);

        let first = save_results(dir.path(), "test", &table).unwrap();
        let second = save_results(dir.path(), "test", &table).unwrap();
        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
    }
}
