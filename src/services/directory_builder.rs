//! Directory building: crawl a site's listing pages and merge the detail
//! links they hold into an existing directory.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::models::{Directory, DirectoryEntry, DirectorySummary};
use crate::scrapers::links::{extract_listing_links, next_page_url};
use crate::scrapers::{PageSource, SiteConfig, SiteError};

/// Fetch every listing page of a site, following pagination, and return the
/// discovered entries in discovery order.
///
/// Listing pages that fail to fetch or hold no matching link are skipped
/// with a warning.
pub async fn discover(
    source: &dyn PageSource,
    site: &SiteConfig,
) -> Result<(Vec<DirectoryEntry>, DirectorySummary), SiteError> {
    let pattern = site.link_pattern()?;
    let listing = &site.listing;
    let mut summary = DirectorySummary::default();
    let mut discovered = Vec::new();
    let mut visited = HashSet::new();

    for page in &listing.pages {
        let mut url = page.url.clone();
        for page_no in 1..=listing.max_pages.max(1) {
            if !visited.insert(url.clone()) {
                debug!(url = %url, "Listing page already visited");
                break;
            }

            let html = match source.fetch_text(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(site = %site.id, url = %url, error = %e, "Skipping listing page");
                    summary.listings_failed += 1;
                    break;
                }
            };

            let links = extract_listing_links(
                &html,
                &url,
                listing,
                pattern.as_ref(),
                page.category.as_deref(),
            );
            if links.is_empty() {
                warn!(site = %site.id, url = %url, "No detail links on listing page");
                summary.listings_failed += 1;
            } else {
                info!(site = %site.id, url = %url, page = page_no, links = links.len(), "Listing page");
                summary.listings_fetched += 1;
                discovered.extend(links.into_iter().map(|link| {
                    DirectoryEntry::new(link.url, link.display_name, link.category)
                }));
            }

            let next = listing
                .next_selector
                .as_deref()
                .and_then(|sel| next_page_url(&html, &url, sel));
            match next {
                Some(next) => url = next,
                None => break,
            }
        }
    }

    summary.discovered = discovered
        .iter()
        .map(|e| e.url.as_str())
        .collect::<HashSet<_>>()
        .len();
    Ok((discovered, summary))
}

/// Discover a site's listings and merge them into `existing`.
///
/// Entries already in `existing` are left untouched; new urls are appended
/// in discovery order.
pub async fn build_directory(
    source: &dyn PageSource,
    site: &SiteConfig,
    mut existing: Directory,
) -> Result<(Directory, DirectorySummary), SiteError> {
    let (discovered, mut summary) = discover(source, site).await?;
    summary.added = existing.merge(discovered);
    summary.total = existing.len();

    info!(site = %site.id, "Directory built: {}", summary);
    Ok((existing, summary))
}
