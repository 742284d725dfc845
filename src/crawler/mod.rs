//! Two-phase crawl controller.
//!
//! LIST requests are listing pages: their job links become DETAIL requests
//! (or link-only records) and they may enqueue the next listing page. DETAIL
//! requests run field extraction and emit one record each. A fixed pool of
//! workers drains a shared [`Frontier`]; the [`CrawlBudget`] decides when to
//! stop.

mod budget;
mod events;
mod frontier;
mod links;

pub use budget::CrawlBudget;
pub use events::{CrawlEvent, CrawlSummary};
pub use frontier::{Completion, Frontier};
pub use links::{find_job_links, find_next_page, is_job_detail_path};

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use scraper::Html;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::{CrawlInput, CrawlerSettings, DEFAULT_CONCURRENCY};
use crate::extract::extract_job_from_html;
use crate::fetch::PageFetcher;
use crate::models::{CrawlRequest, LinkRecord, OutputRecord, RequestKind};
use crate::sink::{RecordSink, SinkError};

/// Errors that end a crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("No valid start URLs")]
    NoSeeds,

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

/// What a crawl run should do.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub seeds: Vec<String>,
    /// `None` means unbounded.
    pub results_wanted: Option<usize>,
    pub max_pages: u32,
    /// When false, listing pages emit link-only records and detail pages are
    /// never fetched.
    pub collect_details: bool,
    /// Category recorded on jobs whose page does not name one.
    pub category: Option<String>,
    pub concurrency: usize,
}

impl CrawlOptions {
    pub fn from_input(input: &CrawlInput, settings: &CrawlerSettings) -> Self {
        Self {
            seeds: input.seed_urls(),
            results_wanted: input.results_wanted,
            max_pages: input.max_pages,
            collect_details: input.collect_details,
            category: Some(input.category_slug().to_string()),
            concurrency: settings.concurrency,
        }
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from_input(&CrawlInput::default(), &CrawlerSettings::default())
    }
}

/// Crawl driver; see the module docs.
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    sink: Arc<dyn RecordSink>,
    options: CrawlOptions,
    events: Option<mpsc::Sender<CrawlEvent>>,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        sink: Arc<dyn RecordSink>,
        options: CrawlOptions,
    ) -> Self {
        Self {
            fetcher,
            sink,
            options,
            events: None,
        }
    }

    /// Send progress events to `events` while running.
    pub fn with_events(mut self, events: mpsc::Sender<CrawlEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Crawl until the frontier is empty or the budget is spent.
    ///
    /// Per-request failures are logged and counted; only a missing seed or
    /// a failure to flush the sink fails the run.
    pub async fn run(&self) -> Result<CrawlSummary, CrawlError> {
        if self.options.seeds.is_empty() {
            return Err(CrawlError::NoSeeds);
        }
        let started_at = Utc::now();

        let state = Arc::new(CrawlState {
            fetcher: self.fetcher.clone(),
            sink: self.sink.clone(),
            budget: CrawlBudget::new(self.options.results_wanted, self.options.max_pages),
            frontier: Frontier::new(),
            seen: Mutex::new(HashSet::new()),
            visited_lists: Mutex::new(HashSet::new()),
            collect_details: self.options.collect_details,
            category: self.options.category.clone(),
            events: self.events.clone(),
            list_pages: AtomicUsize::new(0),
            detail_pages: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
        });

        for seed in &self.options.seeds {
            state.frontier.push(CrawlRequest::seed(seed.clone())).await;
        }

        let workers = if self.options.concurrency == 0 {
            DEFAULT_CONCURRENCY
        } else {
            self.options.concurrency
        };
        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                while let Some(request) = state.frontier.next().await {
                    let _done = state.frontier.completion();
                    debug!("Worker {} took {} {}", worker_id, request.kind, request.url);
                    state.handle(request).await;
                }
            }));
        }

        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                error!("Crawl worker stopped unexpectedly: {}", e);
            }
        }

        self.sink.flush().await?;

        let summary = CrawlSummary {
            saved: state.budget.saved(),
            list_pages: state.list_pages.load(Ordering::SeqCst),
            detail_pages: state.detail_pages.load(Ordering::SeqCst),
            failed: state.failed.load(Ordering::SeqCst),
            skipped: state.skipped.load(Ordering::SeqCst),
            started_at,
            finished_at: Utc::now(),
        };
        info!("Finished. Saved {} items", summary.saved);
        Ok(summary)
    }
}

/// State shared by all workers of one run.
struct CrawlState {
    fetcher: Arc<dyn PageFetcher>,
    sink: Arc<dyn RecordSink>,
    budget: CrawlBudget,
    frontier: Frontier,
    /// Job URLs already enqueued or emitted.
    seen: Mutex<HashSet<String>>,
    /// Listing URLs already handled.
    visited_lists: Mutex<HashSet<String>>,
    collect_details: bool,
    category: Option<String>,
    events: Option<mpsc::Sender<CrawlEvent>>,
    list_pages: AtomicUsize,
    detail_pages: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
}

impl CrawlState {
    async fn handle(&self, request: CrawlRequest) {
        if self.budget.is_exhausted() {
            if request.kind == RequestKind::Detail {
                self.skip(&request.url, "result budget reached").await;
            }
            return;
        }

        match request.kind {
            RequestKind::List => self.handle_list(request).await,
            RequestKind::Detail => self.handle_detail(request).await,
        }
    }

    async fn handle_list(&self, mut request: CrawlRequest) {
        if !self.visited_lists.lock().await.insert(request.url.clone()) {
            debug!("LIST {} already handled", request.url);
            return;
        }

        let page = match self.fetcher.fetch(&mut request).await {
            Ok(page) => page,
            Err(e) => {
                self.fail(&request.url, &e.to_string()).await;
                return;
            }
        };

        let links = discover_links(&page.body, &page.url);
        self.list_pages.fetch_add(1, Ordering::SeqCst);
        info!("LIST {} -> found {} links", request.url, links.len());
        self.emit(CrawlEvent::ListPage {
            url: request.url.clone(),
            page: request.page_number,
            links: links.len(),
        })
        .await;

        if self.budget.is_exhausted() {
            return;
        }

        if self.collect_details {
            self.enqueue_details(&links, request.page_number).await;
        } else {
            self.emit_links(&links).await;
        }

        if !links.is_empty() && self.budget.allows_page_after(request.page_number) {
            match find_next_page(&request.url, request.page_number) {
                Some(next) => {
                    self.frontier
                        .push(CrawlRequest::list(next, request.page_number + 1))
                        .await
                }
                None => warn!("Cannot build next page URL from {}", request.url),
            }
        }
    }

    /// Enqueue up to the remaining budget of links not seen before.
    async fn enqueue_details(&self, links: &[String], page_number: u32) {
        let fresh = {
            let mut seen = self.seen.lock().await;
            let remaining = self.budget.remaining();
            let mut fresh = Vec::new();
            for link in links {
                if fresh.len() >= remaining {
                    break;
                }
                if seen.insert(link.clone()) {
                    fresh.push(link.clone());
                }
            }
            fresh
        };

        debug!("Enqueueing {} detail pages", fresh.len());
        for link in fresh {
            self.frontier.push(CrawlRequest::detail(link, page_number)).await;
        }
    }

    /// Link-only mode: push `{url, source}` records straight to the sink.
    async fn emit_links(&self, links: &[String]) {
        let granted = {
            let mut seen = self.seen.lock().await;
            let fresh: Vec<&String> = links.iter().filter(|l| !seen.contains(*l)).collect();
            let granted = self.budget.try_reserve(fresh.len());
            let granted: Vec<String> = fresh.into_iter().take(granted).cloned().collect();
            seen.extend(granted.iter().cloned());
            granted
        };

        for link in granted {
            let record = OutputRecord::Link(LinkRecord::new(link.clone()));
            self.save(&link, &record).await;
        }
    }

    async fn handle_detail(&self, mut request: CrawlRequest) {
        let page = match self.fetcher.fetch(&mut request).await {
            Ok(page) => page,
            Err(e) => {
                self.fail(&request.url, &e.to_string()).await;
                return;
            }
        };
        self.detail_pages.fetch_add(1, Ordering::SeqCst);

        let job = match extract_job_from_html(&request.url, &page.body, self.category.as_deref()) {
            Ok(job) => job,
            Err(e) => {
                error!("DETAIL {} extraction failed: {}", request.url, e);
                self.skip(&request.url, &e.to_string()).await;
                return;
            }
        };

        if self.budget.try_reserve(1) == 0 {
            self.skip(&request.url, "result budget reached").await;
            return;
        }
        self.save(&request.url, &OutputRecord::Job(job)).await;
    }

    /// Push a record whose budget slot is already reserved.
    async fn save(&self, url: &str, record: &OutputRecord) {
        match self.sink.push(record).await {
            Ok(()) => {
                debug!("Saved {}", url);
                self.emit(CrawlEvent::Saved {
                    url: url.to_string(),
                })
                .await;
            }
            Err(e) => {
                self.budget.release(1);
                self.fail(url, &format!("sink: {e}")).await;
            }
        }
    }

    async fn fail(&self, url: &str, message: &str) {
        error!("Failed {}: {}", url, message);
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.emit(CrawlEvent::Failed {
            url: url.to_string(),
            error: message.to_string(),
        })
        .await;
    }

    async fn skip(&self, url: &str, reason: &str) {
        debug!("Skipped {}: {}", url, reason);
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.emit(CrawlEvent::Skipped {
            url: url.to_string(),
            reason: reason.to_string(),
        })
        .await;
    }

    async fn emit(&self, event: CrawlEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }
}

/// Parse a listing page and collect its job links.
///
/// Kept synchronous so the parsed document never lives across an await.
fn discover_links(body: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(body);
    find_job_links(&document, base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_input() {
        let input = CrawlInput {
            results_wanted: None,
            max_pages: 3,
            collect_details: false,
            ..CrawlInput::default()
        };
        let settings = CrawlerSettings {
            concurrency: 4,
            ..CrawlerSettings::default()
        };
        let options = CrawlOptions::from_input(&input, &settings);
        assert_eq!(options.results_wanted, None);
        assert_eq!(options.max_pages, 3);
        assert!(!options.collect_details);
        assert_eq!(options.concurrency, 4);
        assert_eq!(options.category.as_deref(), Some("all-other-remote-jobs"));
        assert_eq!(options.seeds.len(), 1);
    }

    #[test]
    fn test_discover_links_resolves_against_base() {
        let body = r#"<html><body><a href="/remote-jobs/a">A</a><a href="b">B</a></body></html>"#;
        let links = discover_links(body, "https://weworkremotely.com/remote-jobs/search?term=x");
        assert_eq!(links, vec!["https://weworkremotely.com/remote-jobs/a".to_string()]);
    }
}
