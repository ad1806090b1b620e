//! Status command: latest files per site and null reports.

use console::style;

use crate::cli::helpers::sites_or_all;
use crate::config::Settings;
use crate::services::{null_report, site_status, TableFile};

fn describe(file: &Option<TableFile>, what: &str) -> String {
    match file {
        Some(f) => format!("{} {} rows ({})", what, f.rows, f.path.display()),
        None => format!("{} none", what),
    }
}

pub fn cmd_status(settings: &Settings, site_ids: &[String], nulls: bool) -> anyhow::Result<()> {
    println!(
        "{} Data directory: {}",
        style("→").cyan(),
        settings.data_dir.display()
    );

    for site in sites_or_all(settings, site_ids)? {
        let status = site_status(&settings.data_dir, &site.id)?;
        println!();
        println!("{} ({})", style(&site.name).bold(), status.site_id);
        println!("  {}", describe(&status.directory, "directory:"));
        println!("  {}", describe(&status.results, "results:  "));

        if status.directory.is_some() {
            if status.pending.is_empty() {
                println!("  {} every directory entry has a results row", style("✓").green());
            } else {
                println!(
                    "  {} {} entries not yet scraped (use 'vtolscrape scrape {} --only-new')",
                    style("!").yellow(),
                    status.pending.len(),
                    site.id
                );
                for url in status.pending.iter().take(5) {
                    println!("    {}", style(url).dim());
                }
                if status.pending.len() > 5 {
                    println!("    {}", style(format!("... {} more", status.pending.len() - 5)).dim());
                }
            }
        }

        if nulls {
            if let Some(report) = null_report(&settings.data_dir, &site.id)? {
                println!("  Null counts ({} rows):", report.file.rows);
                if report.nulls.is_empty() {
                    println!("    {} no empty fields", style("✓").green());
                }
                for (column, count) in &report.nulls {
                    println!("    {:<26} {:>5}", column, count);
                }
            }
        }
    }
    Ok(())
}
