//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod directory;
mod extract;
mod scrape;
mod sites;
mod status;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "vtolscrape")]
#[command(about = "Aircraft directory scraper for evtol.news and transportup.com")]
#[command(version)]
pub struct Cli {
    /// Directory holding directory and results files (overrides config file)
    #[arg(long, short = 'd', global = true)]
    data_dir: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Options shared by `scrape` and `run`.
#[derive(Args, Debug, Clone)]
pub struct ScrapeArgs {
    /// Site ids to scrape (can specify multiple, or use --all)
    site_ids: Vec<String>,
    /// Scrape all configured sites
    #[arg(short, long)]
    all: bool,
    /// Only process the first N directory entries (0 = unlimited)
    #[arg(short, long, default_value = "0")]
    limit: usize,
    /// Reuse rows from the latest results file and only fetch new urls
    #[arg(long)]
    only_new: bool,
    /// Detail pages fetched concurrently (overrides config)
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured sites
    Sites {
        /// Print one site's full definition as TOML
        #[arg(long)]
        show: Option<String>,
    },

    /// Crawl listing pages and update the directory file
    Directory {
        /// Site ids (can specify multiple, or use --all)
        site_ids: Vec<String>,
        /// Update all configured sites
        #[arg(short, long)]
        all: bool,
    },

    /// Extract every directory entry into a new results file
    Scrape(ScrapeArgs),

    /// Update the directory, then scrape it
    Run(ScrapeArgs),

    /// Extract a single detail page and print it as JSON
    Extract {
        /// Site id whose field rules to apply
        site_id: String,
        /// Detail page URL
        url: String,
    },

    /// Show the latest files per site and how many entries are unscraped
    Status {
        /// Site ids (defaults to all)
        site_ids: Vec<String>,
        /// Also report null counts per column of the latest results
        #[arg(long)]
        nulls: bool,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        data_dir: cli.data_dir,
    };
    let (settings, _config) = load_settings_with_options(options)
        .await
        .map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Sites { show } => sites::cmd_sites(&settings, show.as_deref()),
        Commands::Directory { site_ids, all } => {
            directory::cmd_directory(&settings, &site_ids, all).await
        }
        Commands::Scrape(args) => scrape::cmd_scrape(&settings, &args).await,
        Commands::Run(args) => scrape::cmd_run(&settings, &args).await,
        Commands::Extract { site_id, url } => extract::cmd_extract(&settings, &site_id, &url).await,
        Commands::Status { site_ids, nulls } => status::cmd_status(&settings, &site_ids, nulls),
    }
}
