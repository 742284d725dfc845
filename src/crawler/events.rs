//! Crawl progress events and the end-of-run summary.

use chrono::{DateTime, Utc};

/// Events emitted while a crawl runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// A listing page was parsed
    ListPage { url: String, page: u32, links: usize },
    /// A record reached the sink
    Saved { url: String },
    /// A request was dropped without an error
    Skipped { url: String, reason: String },
    /// A request failed
    Failed { url: String, error: String },
}

/// Totals for a finished crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub saved: usize,
    pub list_pages: usize,
    pub detail_pages: usize,
    pub failed: usize,
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlSummary {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
