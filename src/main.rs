//! vtolscrape - aircraft directory and specification scraper.
//!
//! Crawls aircraft listings on evtol.news and transportup.com and extracts
//! every aircraft page into dated CSV tables.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vtolscrape::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "vtolscrape=info"
    } else {
        "vtolscrape=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli::run().await
}
