//! Site listing command.

use std::collections::BTreeMap;

use console::style;
use serde::Serialize;

use crate::config::Settings;
use crate::scrapers::sites::find_site;
use crate::scrapers::SiteConfig;

#[derive(Serialize)]
struct SiteDump<'a> {
    sites: BTreeMap<&'a str, &'a SiteConfig>,
}

/// List configured sites, or print one definition in config-file form.
pub fn cmd_sites(settings: &Settings, show: Option<&str>) -> anyhow::Result<()> {
    if let Some(id) = show {
        let site = find_site(&settings.sites, id)?;
        let dump = SiteDump {
            sites: BTreeMap::from([(site.id.as_str(), &site)]),
        };
        print!("{}", toml::to_string_pretty(&dump)?);
        return Ok(());
    }

    println!("{}", style("Configured sites").bold());
    for (id, site) in &settings.sites {
        let validation = site.validate();
        let marker = match validation {
            Ok(()) => style("✓").green(),
            Err(_) => style("✗").red(),
        };
        println!(
            "  {} {:<14} {} ({} listing pages, {} fields)",
            marker,
            id,
            site.name,
            site.listing.pages.len(),
            site.fields.len()
        );
        if let Err(e) = validation {
            println!("      {}", style(e).red());
        }
    }
    Ok(())
}
