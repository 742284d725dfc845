//! Page fetching.
//!
//! The crawler only sees [`PageFetcher`]; [`HttpClient`] is the network
//! implementation. Fetchers hand back raw HTML so parsing happens inside
//! synchronous handler code.

mod http_client;

pub use http_client::{resolve_user_agent, HttpClient, IMPERSONATE_USER_AGENTS, USER_AGENT};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::CrawlRequest;

/// Errors from fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Giving up on {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Invalid proxy {proxy}: {reason}")]
    InvalidProxy { proxy: String, reason: String },
}

impl FetchError {
    /// Whether trying the same URL again could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder(),
            Self::Status { status, .. } => !matches!(status, 404 | 410),
            Self::RetriesExhausted { .. } | Self::InvalidProxy { .. } => false,
        }
    }
}

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects.
    pub url: String,
    pub status: u16,
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
            fetched_at: Utc::now(),
        }
    }
}

/// Retrieves pages for crawl requests.
///
/// Implementations own their retry policy and record attempts in
/// `request.retry_count`. An error means the request is abandoned.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &mut CrawlRequest) -> Result<FetchedPage, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_pages_are_not_retried() {
        let gone = FetchError::Status {
            url: "https://a.example".to_string(),
            status: 410,
        };
        let missing = FetchError::Status {
            url: "https://a.example".to_string(),
            status: 404,
        };
        let busy = FetchError::Status {
            url: "https://a.example".to_string(),
            status: 503,
        };
        assert!(!gone.is_retryable());
        assert!(!missing.is_retryable());
        assert!(busy.is_retryable());
    }

    #[test]
    fn test_fetched_page_timestamp() {
        let before = Utc::now();
        let page = FetchedPage::new("https://a.example", 200, "<html></html>");
        assert!(page.fetched_at >= before);
        assert_eq!(page.status, 200);
    }
}
