//! Extracted aircraft records and the results table they form.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::DirectoryEntry;

/// Fields extracted from one detail page.
///
/// `fields` keeps the site's rule order; a `None` value means the page had
/// no markup for that field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AircraftRecord {
    pub url: String,
    pub display_name: String,
    pub category: Option<String>,
    pub fields: Vec<(String, Option<String>)>,
}

impl AircraftRecord {
    /// Create an empty record for a directory entry.
    pub fn for_entry(entry: &DirectoryEntry) -> Self {
        Self {
            url: entry.url.clone(),
            display_name: entry.display_name.clone(),
            category: entry.category.clone(),
            fields: Vec::new(),
        }
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Set a field, replacing any previous value for the same name.
    pub fn set(&mut self, name: &str, value: Option<String>) {
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Names of fields that are null.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name.as_str())
    }
}

impl Serialize for AircraftRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + self.fields.len()))?;
        map.serialize_entry("url", &self.url)?;
        map.serialize_entry("display_name", &self.display_name)?;
        map.serialize_entry("category", &self.category)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Ordered results of one assembly run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsTable {
    /// Field columns after the fixed `url, display_name, category` prefix.
    pub columns: Vec<String>,
    pub rows: Vec<AircraftRecord>,
}

impl ResultsTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, record: AircraftRecord) {
        self.rows.push(record);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index rows by url.
    pub fn by_url(&self) -> HashMap<&str, &AircraftRecord> {
        self.rows.iter().map(|r| (r.url.as_str(), r)).collect()
    }

    /// Null counts per field column, sorted by count descending.
    ///
    /// Columns without any null value are omitted.
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .columns
            .iter()
            .map(|column| {
                let nulls = self
                    .rows
                    .iter()
                    .filter(|row| row.get(column).is_none())
                    .count();
                (column.clone(), nulls)
            })
            .filter(|(_, nulls)| *nulls > 0)
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}
