//! Built-in site definitions and lookup.

pub mod evtol_news;
pub mod transportup;

use std::collections::BTreeMap;

use super::config::{SiteConfig, SiteError};

/// Site definitions shipped with the crate.
pub fn builtin_sites() -> Vec<SiteConfig> {
    vec![evtol_news::site(), transportup::site()]
}

/// Built-in sites with configured overrides applied.
///
/// A configured site replaces the built-in definition with the same id
/// wholesale; configured sites with new ids are added. Results are keyed and
/// ordered by id.
pub fn resolve_sites(overrides: &BTreeMap<String, SiteConfig>) -> BTreeMap<String, SiteConfig> {
    let mut sites: BTreeMap<String, SiteConfig> = builtin_sites()
        .into_iter()
        .map(|site| (site.id.clone(), site))
        .collect();

    for (id, site) in overrides {
        let mut site = site.clone();
        // The table key is authoritative for file naming
        site.id = id.clone();
        sites.insert(id.clone(), site);
    }
    sites
}

/// Look up a site by id without validating it.
///
/// For commands that only read files already on disk.
pub fn lookup_site(
    sites: &BTreeMap<String, SiteConfig>,
    id: &str,
) -> Result<SiteConfig, SiteError> {
    sites
        .get(id)
        .cloned()
        .ok_or_else(|| SiteError::UnknownSite(id.to_string()))
}

/// Look up and validate a site by id.
pub fn find_site(
    sites: &BTreeMap<String, SiteConfig>,
    id: &str,
) -> Result<SiteConfig, SiteError> {
    let site = lookup_site(sites, id)?;
    site.validate()?;
    Ok(site)
}
