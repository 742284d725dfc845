//! HTTP fetcher with retry and proxy support.

mod user_agent;

pub use user_agent::{resolve_user_agent, IMPERSONATE_USER_AGENTS, USER_AGENT};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Proxy};
use tracing::{debug, warn};

use super::{FetchError, FetchedPage, PageFetcher};
use crate::config::CrawlerSettings;
use crate::models::CrawlRequest;

/// First retry waits this long; each further retry doubles it.
const BASE_BACKOFF: Duration = Duration::from_millis(500);

/// `reqwest`-backed [`PageFetcher`].
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    request_delay: Duration,
    base_backoff: Duration,
}

impl HttpClient {
    /// Create a client from crawler settings.
    /// - `settings.user_agent`: `None` for the crate agent, `"impersonate"`
    ///   for a browser agent, anything else verbatim
    /// - `proxy`: http(s) or socks5 URL every request is sent through
    pub fn from_settings(settings: &CrawlerSettings, proxy: Option<&str>) -> Result<Self, FetchError> {
        let user_agent = resolve_user_agent(settings.user_agent.as_deref());
        let mut builder = Client::builder()
            .user_agent(&user_agent)
            .timeout(settings.request_timeout)
            .cookie_store(true)
            .gzip(true)
            .brotli(true);

        if let Some(proxy) = proxy {
            let proxy_config = Proxy::all(proxy).map_err(|e| FetchError::InvalidProxy {
                proxy: proxy.to_string(),
                reason: e.to_string(),
            })?;
            builder = builder.proxy(proxy_config);
        }

        Ok(Self {
            client: builder.build()?,
            max_retries: settings.max_retries,
            request_delay: settings.request_delay,
            base_backoff: BASE_BACKOFF,
        })
    }

    /// Override the initial retry delay.
    pub fn with_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }

    async fn get_once(&self, url: &str) -> Result<FetchedPage, FetchError> {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!("Fetched {} ({} bytes)", final_url, body.len());
        Ok(FetchedPage::new(final_url, status.as_u16(), body))
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, request: &mut CrawlRequest) -> Result<FetchedPage, FetchError> {
        loop {
            let error = match self.get_once(&request.url).await {
                Ok(page) => return Ok(page),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            if request.retry_count >= self.max_retries {
                return Err(FetchError::RetriesExhausted {
                    url: request.url.clone(),
                    attempts: request.retry_count + 1,
                    last_error: error.to_string(),
                });
            }

            let backoff = self.base_backoff * 2u32.saturating_pow(request.retry_count);
            request.retry_count += 1;
            warn!(
                "{} {} failed ({}), retry {}/{} in {:.1}s",
                request.kind,
                request.url,
                error,
                request.retry_count,
                self.max_retries,
                backoff.as_secs_f64()
            );
            tokio::time::sleep(backoff).await;
        }
    }
}
