//! Single-page extraction command.

use crate::cli::helpers::latest_directory;
use crate::config::Settings;
use crate::models::DirectoryEntry;
use crate::scrapers::links::name_from_url;
use crate::scrapers::sites::find_site;
use crate::services::extract;

/// Extract one detail page and print the record as JSON.
///
/// Display name and category come from the site's latest directory when the
/// url is listed there.
pub async fn cmd_extract(settings: &Settings, site_id: &str, url: &str) -> anyhow::Result<()> {
    let site = find_site(&settings.sites, site_id)?;

    let known = latest_directory(settings, &site.id)?
        .and_then(|(_, directory)| directory.iter().find(|e| e.url == url).cloned());
    let entry = known
        .unwrap_or_else(|| DirectoryEntry::new(url.to_string(), name_from_url(url), None));

    let client = settings.client_for(&site)?;
    let record = extract(&client, &site, &entry).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
