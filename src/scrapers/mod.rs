//! Page sources, site definitions and the declarative field rules.

pub mod config;
mod http_client;
pub mod links;
pub mod rules;
pub mod sites;

pub use config::{GroupConfig, ListingConfig, ListingPage, SiteConfig, SiteError};
pub use http_client::HttpClient;
pub use rules::{FieldRule, LeadPart, Locator, Transform};

use async_trait::async_trait;
use thiserror::Error;

/// Error fetching a page. Always recoverable at the page/row boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

/// Something that can fetch pages for one site.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Identifier of the site this source fetches for.
    fn site_id(&self) -> &str;

    /// Fetch the raw body of a page.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Fetch a page and decode it as text (lossy UTF-8).
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let body = self.fetch(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
