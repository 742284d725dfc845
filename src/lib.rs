//! jobacquire - remote job listing crawler.
//!
//! Walks paginated category and search pages on We Work Remotely, follows
//! links to individual postings and turns each posting into a normalized
//! [`models::JobRecord`].

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod sink;
pub mod utils;

pub use config::{load_input, CrawlInput, CrawlerSettings};
pub use crawler::{CrawlError, CrawlEvent, CrawlOptions, CrawlSummary, Crawler};
pub use extract::{extract_job, extract_job_from_html, ExtractError};
pub use fetch::{FetchError, FetchedPage, HttpClient, PageFetcher};
pub use models::{JobRecord, LinkRecord, OutputRecord};
pub use sink::{JsonLinesSink, MemorySink, RecordSink, SinkError};
