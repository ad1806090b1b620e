//! Record extraction for a single detail page.

use scraper::Html;
use tracing::debug;

use crate::models::{AircraftRecord, DirectoryEntry};
use crate::scrapers::{FetchError, PageSource, SiteConfig};

/// Apply every field rule of a site to a parsed page.
///
/// Never fails: a field whose markup is missing is stored as `None`.
pub fn extract_record(site: &SiteConfig, entry: &DirectoryEntry, document: &Html) -> AircraftRecord {
    let mut record = AircraftRecord::for_entry(entry);
    record.fields = site
        .fields
        .iter()
        .map(|rule| (rule.name.clone(), rule.extract(document)))
        .collect();
    record
}

/// Fetch a detail page and extract its record.
pub async fn extract(
    source: &dyn PageSource,
    site: &SiteConfig,
    entry: &DirectoryEntry,
) -> Result<AircraftRecord, FetchError> {
    let html = source.fetch_text(&entry.url).await?;
    // Html is not Send; keep it out of any await
    let record = {
        let document = Html::parse_document(&html);
        extract_record(site, entry, &document)
    };

    let missing: Vec<&str> = record.missing().collect();
    debug!(
        url = %entry.url,
        site = %site.id,
        missing = missing.len(),
        "Extracted record"
    );
    Ok(record)
}
