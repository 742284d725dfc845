//! Crawl request model.

use serde::{Deserialize, Serialize};

/// What a queued request is expected to yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestKind {
    /// A paginated category or search result page.
    List,
    /// A single job posting.
    Detail,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "LIST",
            Self::Detail => "DETAIL",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work in the crawl frontier.
///
/// Only `retry_count` changes after the request is enqueued, and only the
/// fetcher touches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    pub url: String,
    pub kind: RequestKind,
    /// 1-based page number for LIST requests; DETAIL requests inherit the
    /// page they were discovered on.
    pub page_number: u32,
    pub retry_count: u32,
}

impl CrawlRequest {
    /// Seed request for the first page of a listing.
    pub fn seed(url: impl Into<String>) -> Self {
        Self::list(url, 1)
    }

    pub fn list(url: impl Into<String>, page_number: u32) -> Self {
        Self {
            url: url.into(),
            kind: RequestKind::List,
            page_number,
            retry_count: 0,
        }
    }

    pub fn detail(url: impl Into<String>, page_number: u32) -> Self {
        Self {
            url: url.into(),
            kind: RequestKind::Detail,
            page_number,
            retry_count: 0,
        }
    }

    pub fn is_list(&self) -> bool {
        self.kind == RequestKind::List
    }
}
