//! HTTP page source with timeout, user agent and politeness delay.

mod user_agent;

pub use user_agent::resolve_user_agent;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{FetchError, PageSource};

/// HTTP client used as the page source for a site.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    site_id: String,
    request_delay: Duration,
    request_jitter: Duration,
}

impl HttpClient {
    /// Create a new HTTP client.
    ///
    /// `user_agent_config`:
    /// - None: default vtolscrape user agent
    /// - Some("impersonate"): random real browser user agent
    /// - Some(custom): custom user agent string
    pub fn new(
        site_id: &str,
        timeout: Duration,
        user_agent_config: Option<&str>,
    ) -> Result<Self, FetchError> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            site_id: site_id.to_string(),
            request_delay: Duration::ZERO,
            request_jitter: Duration::ZERO,
        })
    }

    /// Pause for `delay` plus a random share of `jitter` after every request.
    pub fn with_delay(mut self, delay: Duration, jitter: Duration) -> Self {
        self.request_delay = delay;
        self.request_jitter = jitter;
        self
    }

    fn pause(&self) -> Duration {
        let jitter_ms = self.request_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.request_delay;
        }
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map(|d| d.subsec_nanos() as u64)
            .unwrap_or(0);
        self.request_delay + Duration::from_millis(nanos % jitter_ms)
    }
}

#[async_trait]
impl PageSource for HttpClient {
    fn site_id(&self) -> &str {
        &self.site_id
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let start = Instant::now();
        let result = self.client.get(url).send().await;

        // Pause even after failures so a flaky site is not hammered
        let pause = self.pause();

        let outcome = match result {
            Ok(response) if response.status().is_success() => response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(FetchError::from),
            Ok(response) => Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            }),
            Err(e) => Err(FetchError::from(e)),
        };

        debug!(
            site = %self.site_id,
            url,
            elapsed_ms = start.elapsed().as_millis() as u64,
            ok = outcome.is_ok(),
            "GET"
        );

        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        outcome
    }
}
