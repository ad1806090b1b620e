//! Directory command: crawl listing pages and merge new links.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::helpers::{latest_directory, select_sites};
use crate::config::Settings;
use crate::models::Directory;
use crate::scrapers::SiteConfig;
use crate::services::build_directory;
use crate::storage;

pub async fn cmd_directory(settings: &Settings, site_ids: &[String], all: bool) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    for site in select_sites(settings, site_ids, all)? {
        update_directory(settings, &site).await?;
    }
    Ok(())
}

/// Merge a site's listings into its latest directory and write today's file.
pub(super) async fn update_directory(
    settings: &Settings,
    site: &SiteConfig,
) -> anyhow::Result<Directory> {
    let existing = match latest_directory(settings, &site.id)? {
        Some((path, directory)) => {
            tracing::debug!("Merging into {}", path.display());
            directory
        }
        None => Directory::new(),
    };
    let client = settings.client_for(site)?;

    let pb = ProgressBar::new_spinner();
    if let Ok(spinner) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner);
    }
    pb.set_message(format!("Crawling listing pages of {}...", site.name));
    pb.enable_steady_tick(std::time::Duration::from_millis(120));

    let result = build_directory(&client, site, existing).await;
    pb.finish_and_clear();
    let (directory, summary) = result?;

    let today = chrono::Local::now().date_naive();
    let path = storage::directory_path(&settings.data_dir, &site.id, today);
    storage::write_directory(&path, &directory)?;

    let marker = if summary.listings_fetched == 0 {
        style("!").yellow()
    } else {
        style("✓").green()
    };
    println!("{} {}: {}", marker, site.name, summary);
    println!("  {} {}", style("→").dim(), path.display());
    Ok(directory)
}
