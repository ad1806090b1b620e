//! Directory models: the persisted list of known detail pages per site.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A known detail page.
///
/// Entries are append-only: once a url is in a directory its display name,
/// category and discovery date never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Absolute URL of the detail page (unique key).
    pub url: String,
    /// Human-readable label taken from the listing link.
    pub display_name: String,
    /// Listing group the link was found under, if the listing is grouped.
    pub category: Option<String>,
    /// Date the url was first seen.
    pub discovered_at: NaiveDate,
}

impl DirectoryEntry {
    /// Create a new entry discovered today.
    pub fn new(url: String, display_name: String, category: Option<String>) -> Self {
        Self {
            url,
            display_name,
            category,
            discovered_at: chrono::Local::now().date_naive(),
        }
    }
}

/// Ordered, url-unique collection of directory entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    entries: Vec<DirectoryEntry>,
    seen: HashSet<String>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from entries, keeping the first entry for each url.
    pub fn from_entries(entries: impl IntoIterator<Item = DirectoryEntry>) -> Self {
        let mut directory = Self::new();
        for entry in entries {
            directory.insert(entry);
        }
        directory
    }

    /// Append an entry unless its url is already present.
    ///
    /// Returns true if the entry was added.
    pub fn insert(&mut self, entry: DirectoryEntry) -> bool {
        if !self.seen.insert(entry.url.clone()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Merge newly discovered entries into this directory.
    ///
    /// Existing urls are left untouched; new urls are appended in the order
    /// given. Returns the number of entries added.
    pub fn merge(&mut self, discovered: impl IntoIterator<Item = DirectoryEntry>) -> usize {
        discovered
            .into_iter()
            .filter(|entry| self.insert(entry.clone()))
            .count()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DirectoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Directory {
    type Item = &'a DirectoryEntry;
    type IntoIter = std::slice::Iter<'a, DirectoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, name: &str, day: u32) -> DirectoryEntry {
        DirectoryEntry {
            url: url.to_string(),
            display_name: name.to_string(),
            category: None,
            discovered_at: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        }
    }

    #[test]
    fn test_insert_skips_duplicate_urls() {
        let mut dir = Directory::new();
        assert!(dir.insert(entry("https://x.test/a", "A", 1)));
        assert!(!dir.insert(entry("https://x.test/a", "Other", 2)));
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.entries()[0].display_name, "A");
    }

    #[test]
    fn test_merge_into_itself_is_identity() {
        let mut dir = Directory::from_entries(vec![
            entry("https://x.test/a", "A", 1),
            entry("https://x.test/b", "B", 2),
        ]);
        let before = dir.clone();
        let added = dir.merge(before.entries().to_vec());
        assert_eq!(added, 0);
        assert_eq!(dir, before);
    }

    #[test]
    fn test_merge_appends_new_in_discovery_order() {
        let mut dir = Directory::from_entries(vec![entry("https://x.test/a", "A", 1)]);
        let added = dir.merge(vec![
            entry("https://x.test/c", "C", 5),
            entry("https://x.test/a", "A renamed", 5),
            entry("https://x.test/b", "B", 5),
        ]);

        assert_eq!(added, 2);
        let urls: Vec<&str> = dir.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://x.test/a", "https://x.test/c", "https://x.test/b"]
        );
        assert_eq!(dir.entries()[0].display_name, "A");
        assert_eq!(
            dir.entries()[0].discovered_at,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }
}
