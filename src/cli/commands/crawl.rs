//! Crawl command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use console::style;
use tokio::sync::mpsc;

use jobacquire::config::{load_input, CrawlInput, CrawlerSettings, ProxyConfiguration, StartUrl};
use jobacquire::crawler::{CrawlEvent, CrawlOptions, CrawlSummary, Crawler};
use jobacquire::fetch::HttpClient;
use jobacquire::sink::JsonLinesSink;

use crate::cli::helpers::{crawl_spinner, truncate};

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Input document (JSON or TOML)
    #[arg(short, long, env = "CRAWL_INPUT")]
    pub input: Option<PathBuf>,
    /// Category slug, e.g. remote-design-jobs
    #[arg(long)]
    pub category: Option<String>,
    /// Search term; crawls search results instead of a category
    #[arg(short, long)]
    pub keyword: Option<String>,
    /// Region filter for keyword searches
    #[arg(long)]
    pub location: Option<String>,
    /// Stop after this many records
    #[arg(short = 'n', long)]
    pub results_wanted: Option<usize>,
    /// Maximum listing pages to walk per start URL
    #[arg(long)]
    pub max_pages: Option<u32>,
    /// Only record job URLs; never fetch job pages
    #[arg(long)]
    pub links_only: bool,
    /// Listing page to start from (repeatable); overrides category and keyword
    #[arg(long = "start-url")]
    pub start_url: Vec<String>,
    /// Proxy URL for every request
    #[arg(long, env = "JOBACQUIRE_PROXY")]
    pub proxy: Option<String>,
    /// Requests handled at once
    #[arg(short = 'c', long, default_value = "10")]
    pub concurrency: usize,
    /// Retries per request after the first failure
    #[arg(long, default_value = "3")]
    pub retries: u32,
    /// Request timeout in seconds
    #[arg(long, default_value = "60")]
    pub timeout: u64,
    /// Delay before each request in milliseconds
    #[arg(long, default_value = "0")]
    pub delay_ms: u64,
    /// User agent ("impersonate" for a browser agent)
    #[arg(long, env = "JOBACQUIRE_USER_AGENT")]
    pub user_agent: Option<String>,
    /// Output file for JSON lines ("-" for stdout)
    #[arg(short, long, default_value = "jobs.jsonl")]
    pub output: String,
}

impl CrawlArgs {
    /// Apply command-line flags on top of an input document.
    pub fn overlay(&self, mut input: CrawlInput) -> CrawlInput {
        if let Some(category) = &self.category {
            input.category = category.clone();
        }
        if let Some(keyword) = &self.keyword {
            input.keyword = Some(keyword.clone());
        }
        if let Some(location) = &self.location {
            input.location = Some(location.clone());
        }
        if let Some(wanted) = self.results_wanted {
            input.results_wanted = Some(wanted.max(1));
        }
        if let Some(pages) = self.max_pages {
            input.max_pages = pages.max(1);
        }
        if self.links_only {
            input.collect_details = false;
        }
        if !self.start_url.is_empty() {
            input.start_urls = self.start_url.iter().cloned().map(StartUrl::Plain).collect();
            input.start_url = None;
            input.url = None;
        }
        if let Some(proxy) = &self.proxy {
            input.proxy_configuration = Some(ProxyConfiguration {
                proxy_urls: vec![proxy.clone()],
                ..ProxyConfiguration::default()
            });
        }
        input
    }

    pub fn settings(&self) -> CrawlerSettings {
        CrawlerSettings {
            concurrency: self.concurrency.max(1),
            max_retries: self.retries,
            request_timeout: Duration::from_secs(self.timeout),
            request_delay: Duration::from_millis(self.delay_ms),
            user_agent: self.user_agent.clone(),
        }
    }
}

pub async fn cmd_crawl(args: CrawlArgs) -> anyhow::Result<()> {
    let input = match &args.input {
        Some(path) => load_input(path)?,
        None => CrawlInput::default(),
    };
    let input = args.overlay(input);
    let settings = args.settings();

    let options = CrawlOptions::from_input(&input, &settings);
    if options.seeds.is_empty() {
        anyhow::bail!("No valid start URLs; check startUrls/startUrl/url");
    }

    let fetcher = HttpClient::from_settings(&settings, input.proxy_url())?;
    let sink = JsonLinesSink::open(&args.output).await?;
    let to_stdout = args.output == "-";

    if !to_stdout {
        println!(
            "{} Crawling {} start URL(s) into {}",
            style("→").cyan(),
            options.seeds.len(),
            style(&args.output).bold()
        );
    }

    let (event_tx, event_rx) = mpsc::channel(256);
    let crawler = Crawler::new(Arc::new(fetcher), Arc::new(sink), options).with_events(event_tx);
    let progress = tokio::spawn(render_progress(event_rx));

    let result = crawler.run().await;
    drop(crawler);
    let _ = progress.await;

    let summary = result?;
    print_summary(&summary, to_stdout);
    Ok(())
}

/// Drive a spinner from crawl events until the sender side closes.
async fn render_progress(mut events: mpsc::Receiver<CrawlEvent>) {
    let pb = crawl_spinner();
    let mut saved = 0usize;
    let mut pages = 0usize;

    while let Some(event) = events.recv().await {
        match event {
            CrawlEvent::ListPage { url, page, links } => {
                pages += 1;
                pb.set_message(format!(
                    "{} saved, {} listing pages (page {}, {} links: {})",
                    saved,
                    pages,
                    page,
                    links,
                    truncate(&url, 60)
                ));
            }
            CrawlEvent::Saved { url } => {
                saved += 1;
                pb.set_message(format!("{} saved, last: {}", saved, truncate(&url, 70)));
            }
            CrawlEvent::Skipped { .. } => {}
            CrawlEvent::Failed { url, error } => {
                pb.println(format!(
                    "  {} {}: {}",
                    style("✗").red(),
                    truncate(&url, 80),
                    error
                ));
            }
        }
    }
    pb.finish_and_clear();
}

fn print_summary(summary: &CrawlSummary, to_stderr: bool) {
    let elapsed = summary.elapsed().num_milliseconds() as f64 / 1000.0;
    let lines = [
        format!(
            "{} Saved {} records in {:.1}s",
            style("✓").green(),
            style(summary.saved).bold(),
            elapsed
        ),
        format!(
            "  {} listing pages, {} job pages, {} failed, {} skipped",
            summary.list_pages, summary.detail_pages, summary.failed, summary.skipped
        ),
    ];
    for line in lines {
        if to_stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}
