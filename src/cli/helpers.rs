//! Shared helper functions for CLI commands.

use std::path::PathBuf;

use anyhow::bail;

use crate::config::Settings;
use crate::models::Directory;
use crate::scrapers::sites::{find_site, lookup_site};
use crate::scrapers::SiteConfig;
use crate::storage::{self, TableKind};

/// Resolve the sites a command should run on.
///
/// Requires explicit ids unless `all` is set.
pub fn select_sites(
    settings: &Settings,
    site_ids: &[String],
    all: bool,
) -> anyhow::Result<Vec<SiteConfig>> {
    if all {
        return settings
            .sites
            .keys()
            .map(|id| find_site(&settings.sites, id).map_err(Into::into))
            .collect();
    }
    if site_ids.is_empty() {
        bail!("Specify one or more site ids, or use --all (see 'vtolscrape sites')");
    }
    site_ids
        .iter()
        .map(|id| find_site(&settings.sites, id).map_err(Into::into))
        .collect()
}

/// Sites to report on: the given ids, or every site when none are given.
///
/// Definitions are not validated, so one broken override does not hide the
/// files of the others.
pub fn sites_or_all(settings: &Settings, site_ids: &[String]) -> anyhow::Result<Vec<SiteConfig>> {
    if site_ids.is_empty() {
        return Ok(settings.sites.values().cloned().collect());
    }
    site_ids
        .iter()
        .map(|id| lookup_site(&settings.sites, id).map_err(Into::into))
        .collect()
}

/// Latest directory file for a site, read from the data directory.
pub fn latest_directory(
    settings: &Settings,
    site_id: &str,
) -> anyhow::Result<Option<(PathBuf, Directory)>> {
    let Some(path) = storage::latest_file(&settings.data_dir, site_id, TableKind::Directory)?
    else {
        return Ok(None);
    };
    let directory = storage::read_directory(&path)?;
    Ok(Some((path, directory)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::sites::evtol_news;

    fn settings_with_broken_site() -> Settings {
        let mut settings = Settings::default();
        let mut broken = evtol_news::site();
        broken.listing.link_pattern = Some("(unclosed".to_string());
        settings.sites.insert("evtol_news".to_string(), broken);
        settings
    }

    #[test]
    fn test_sites_or_all_tolerates_invalid_site() {
        let settings = settings_with_broken_site();
        let ids: Vec<String> = sites_or_all(&settings, &[])
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["evtol_news", "transportup"]);
        assert!(sites_or_all(&settings, &["evtol_news".to_string()]).is_ok());
        assert!(sites_or_all(&settings, &["nope".to_string()]).is_err());
    }

    #[test]
    fn test_select_sites_validates() {
        let settings = settings_with_broken_site();
        assert!(select_sites(&settings, &[], true).is_err());
        assert!(select_sites(&settings, &["transportup".to_string()], false).is_ok());
        assert!(select_sites(&settings, &[], false).is_err());
    }
}
