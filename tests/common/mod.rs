//! Shared fixtures for crawler integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use jobacquire::fetch::{FetchError, FetchedPage, PageFetcher};
use jobacquire::models::{CrawlRequest, OutputRecord};
use jobacquire::sink::{RecordSink, SinkError};

pub const CATEGORY_URL: &str = "https://weworkremotely.com/categories/remote-programming-jobs";

/// Listing URL for `page` (1-based), as the crawler builds it.
pub fn listing_url(page: u32) -> String {
    if page == 1 {
        CATEGORY_URL.to_string()
    } else {
        format!("{}?page={}", CATEGORY_URL, page)
    }
}

pub fn job_url(slug: &str) -> String {
    format!("https://weworkremotely.com/remote-jobs/{}", slug)
}

/// A listing page linking to each slug, plus some non-job links.
pub fn listing_page<S: AsRef<str>>(slugs: &[S]) -> String {
    let items: String = slugs
        .iter()
        .map(|slug| {
            format!(
                r#"<li><a href="/company/{0}-inc">Company</a><a href="/remote-jobs/{0}">{0}</a></li>"#,
                slug.as_ref()
            )
        })
        .collect();
    format!(
        r#"<html><body><nav><a href="/categories/design">Design</a></nav><section class="jobs"><ul>{}</ul></section></body></html>"#,
        items
    )
}

/// A minimal job detail page.
pub fn job_page(title: &str, company: &str) -> String {
    format!(
        r#"<html><head><title>{title} at {company}</title></head><body>
        <div class="listing-header-container"><h1>{title}</h1><span class="listing-tag">Full-Time</span></div>
        <div class="company-card"><h2>{company}</h2></div>
        <div id="job-listing-show-container"><p>About the {title} role.</p></div>
        <div class="salary">$100,000 - $120,000</div>
        </body></html>"#
    )
}

pub fn slugs(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{prefix}-{i}")).collect()
}

/// Serves canned HTML by URL and records every fetch. Unknown URLs get 404.
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Register a detail page for every slug.
    pub fn with_jobs<S: AsRef<str>>(mut self, slugs: &[S]) -> Self {
        for slug in slugs {
            let slug = slug.as_ref();
            self.pages
                .insert(job_url(slug), job_page(&format!("Engineer {slug}"), "Acme"));
        }
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn detail_fetches(&self) -> usize {
        self.fetched()
            .iter()
            .filter(|url| url.contains("/remote-jobs/"))
            .count()
    }

    pub fn listing_fetches(&self) -> usize {
        self.fetched()
            .iter()
            .filter(|url| url.contains("/categories/"))
            .count()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, request: &mut CrawlRequest) -> Result<FetchedPage, FetchError> {
        self.fetched.lock().unwrap().push(request.url.clone());
        tokio::task::yield_now().await;
        match self.pages.get(&request.url) {
            Some(body) => Ok(FetchedPage::new(request.url.clone(), 200, body.clone())),
            None => Err(FetchError::Status {
                url: request.url.clone(),
                status: 404,
            }),
        }
    }
}

/// Sink that rejects records for chosen URLs and keeps the rest.
#[derive(Default)]
pub struct RejectingSink {
    rejected: HashSet<String>,
    accepted: Mutex<Vec<OutputRecord>>,
}

impl RejectingSink {
    pub fn rejecting(urls: &[String]) -> Self {
        Self {
            rejected: urls.iter().cloned().collect(),
            accepted: Mutex::new(Vec::new()),
        }
    }

    pub fn accepted(&self) -> Vec<OutputRecord> {
        self.accepted.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSink for RejectingSink {
    async fn push(&self, record: &OutputRecord) -> Result<(), SinkError> {
        if self.rejected.contains(record.url()) {
            return Err(SinkError::Io(std::io::Error::other("disk full")));
        }
        self.accepted.lock().unwrap().push(record.clone());
        Ok(())
    }
}
