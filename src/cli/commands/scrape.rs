//! Scrape and run commands: assemble results tables from directories.

use anyhow::anyhow;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use super::directory::update_directory;
use super::ScrapeArgs;
use crate::cli::helpers::{latest_directory, select_sites};
use crate::config::Settings;
use crate::models::Directory;
use crate::scrapers::SiteConfig;
use crate::services::{assemble, save_results, AssembleOptions, AssemblyEvent};
use crate::storage::{self, TableKind};

/// Scrape each selected site from its latest directory file.
pub async fn cmd_scrape(settings: &Settings, args: &ScrapeArgs) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    for site in select_sites(settings, &args.site_ids, args.all)? {
        let (_, directory) = latest_directory(settings, &site.id)?.ok_or_else(|| {
            anyhow!(
                "No directory file for '{}' in {}; run 'vtolscrape directory {}' first",
                site.id,
                settings.data_dir.display(),
                site.id
            )
        })?;
        scrape_site(settings, &site, &directory, args).await?;
    }
    Ok(())
}

/// Update each selected site's directory, then scrape it.
pub async fn cmd_run(settings: &Settings, args: &ScrapeArgs) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    for site in select_sites(settings, &args.site_ids, args.all)? {
        let directory = update_directory(settings, &site).await?;
        scrape_site(settings, &site, &directory, args).await?;
    }
    Ok(())
}

async fn scrape_site(
    settings: &Settings,
    site: &SiteConfig,
    directory: &Directory,
    args: &ScrapeArgs,
) -> anyhow::Result<()> {
    // An empty directory still gets an empty results file and a zero summary
    if directory.is_empty() {
        println!("{} {}: directory is empty", style("!").yellow(), site.name);
    }

    let previous = if args.only_new {
        match storage::latest_file(&settings.data_dir, &site.id, TableKind::Results)? {
            Some(path) => {
                println!("{} Reusing rows from {}", style("→").dim(), path.display());
                Some(storage::read_results(&path)?)
            }
            None => None,
        }
    } else {
        None
    };

    let options = AssembleOptions {
        concurrency: args.concurrency.unwrap_or(settings.concurrency).max(1),
        limit: (args.limit > 0).then_some(args.limit),
        previous,
    };
    let client = settings.client_for(site)?;

    println!(
        "{} Scraping {} ({} directory entries)",
        style("→").cyan(),
        site.name,
        directory.len()
    );

    // Event channel for progress updates
    let (event_tx, mut event_rx) = mpsc::channel::<AssemblyEvent>(100);

    let event_handler = tokio::spawn(async move {
        let mut pb: Option<ProgressBar> = None;
        while let Some(event) = event_rx.recv().await {
            match event {
                AssemblyEvent::Planned { total, .. } => {
                    let bar = ProgressBar::new(total as u64);
                    if let Ok(bar_style) = ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                    {
                        bar.set_style(bar_style.progress_chars("█▓░"));
                    }
                    pb = Some(bar);
                }
                AssemblyEvent::Extracted { url, missing } => {
                    if let Some(ref bar) = pb {
                        bar.set_message(format!("{} ({} empty fields)", url, missing));
                        bar.inc(1);
                    }
                }
                AssemblyEvent::Reused { url } => {
                    if let Some(ref bar) = pb {
                        bar.set_message(format!("{} (reused)", url));
                        bar.inc(1);
                    }
                }
                AssemblyEvent::Failed { url, error } => {
                    let line = format!("{} Failed to fetch {}: {}", style("✗").red(), url, error);
                    match pb {
                        Some(ref bar) => {
                            bar.println(line);
                            bar.inc(1);
                        }
                        None => eprintln!("{}", line),
                    }
                }
            }
        }
        if let Some(bar) = pb {
            bar.finish_and_clear();
        }
    });

    let (table, summary) = assemble(&client, site, directory, &options, Some(event_tx)).await;
    event_handler.await?;

    let path = save_results(&settings.data_dir, &site.id, &table)?;

    let marker = if summary.failed > 0 {
        style("!").yellow()
    } else {
        style("✓").green()
    };
    println!("{} {}: {}", marker, site.name, summary);
    println!("  {} {}", style("→").dim(), path.display());
    Ok(())
}
