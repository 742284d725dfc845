//! Crawl input and runtime settings.
//!
//! The input document keeps the key names used by hosted crawler platforms
//! (`collectDetails`, `startUrls`, `proxyConfiguration`, ...) and also accepts
//! snake_case spellings. It can be loaded from JSON or TOML and is then
//! overlaid by command-line flags.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::warn;
use url::Url;

/// Root of the crawled site.
pub const SITE_ROOT: &str = "https://weworkremotely.com";
pub const DEFAULT_CATEGORY: &str = "all-other-remote-jobs";
pub const DEFAULT_RESULTS_WANTED: usize = 100;
pub const DEFAULT_MAX_PAGES: u32 = 999;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Errors loading an input document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported input format for {0} (expected .json or .toml)")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML input: {0}")]
    Toml(#[from] toml::de::Error),
}

/// One entry of `startUrls`: either a bare URL or `{ "url": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StartUrl {
    Plain(String),
    Entry { url: String },
}

impl StartUrl {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(url) => url,
            Self::Entry { url } => url,
        }
    }
}

/// Proxy settings handed to the fetcher.
///
/// Only the proxy URLs are interpreted; any other keys are kept as given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyConfiguration {
    #[serde(default, rename = "proxyUrls", alias = "proxy_urls")]
    pub proxy_urls: Vec<String>,
    #[serde(default, rename = "proxyUrl", alias = "proxy_url")]
    pub proxy_url: Option<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl ProxyConfiguration {
    /// The proxy every request goes through, if any.
    pub fn primary_proxy(&self) -> Option<&str> {
        self.proxy_urls
            .iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .or_else(|| self.proxy_url.as_deref().map(str::trim).filter(|s| !s.is_empty()))
    }
}

/// What to crawl.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlInput {
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// `None` means unbounded.
    #[serde(
        default = "default_results_wanted",
        alias = "resultsWanted",
        deserialize_with = "lenient_results_wanted"
    )]
    pub results_wanted: Option<usize>,
    #[serde(
        default = "default_max_pages",
        alias = "maxPages",
        deserialize_with = "lenient_max_pages"
    )]
    pub max_pages: u32,
    #[serde(default = "default_true", rename = "collectDetails", alias = "collect_details")]
    pub collect_details: bool,
    #[serde(default, rename = "startUrl", alias = "start_url")]
    pub start_url: Option<String>,
    #[serde(default, rename = "startUrls", alias = "start_urls")]
    pub start_urls: Vec<StartUrl>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "proxyConfiguration", alias = "proxy_configuration")]
    pub proxy_configuration: Option<ProxyConfiguration>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_results_wanted() -> Option<usize> {
    Some(DEFAULT_RESULTS_WANTED)
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_true() -> bool {
    true
}

impl Default for CrawlInput {
    fn default() -> Self {
        Self {
            category: default_category(),
            keyword: None,
            location: None,
            results_wanted: default_results_wanted(),
            max_pages: default_max_pages(),
            collect_details: true,
            start_url: None,
            start_urls: Vec::new(),
            url: None,
            proxy_configuration: None,
        }
    }
}

/// A number, a numeric string, or anything else.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl Lenient {
    fn as_number(&self) -> Option<f64> {
        let n = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            Self::Other(_) => None,
        };
        n.filter(|n| n.is_finite())
    }
}

fn lenient_results_wanted<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Lenient::deserialize(deserializer)?;
    Ok(value.as_number().map(|n| n.max(1.0) as usize))
}

fn lenient_max_pages<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Lenient::deserialize(deserializer)?;
    Ok(value
        .as_number()
        .map(|n| n.max(1.0) as u32)
        .unwrap_or(DEFAULT_MAX_PAGES))
}

impl CrawlInput {
    /// Parse a JSON input document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parse a TOML input document.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_configuration
            .as_ref()
            .and_then(ProxyConfiguration::primary_proxy)
    }

    /// Category slug, falling back to the default when blank.
    pub fn category_slug(&self) -> &str {
        let trimmed = self.category.trim();
        if trimmed.is_empty() {
            DEFAULT_CATEGORY
        } else {
            trimmed
        }
    }

    /// Listing URLs the crawl starts from.
    ///
    /// Explicit `startUrls`, `startUrl` and `url` are used together when any
    /// is given. Otherwise a keyword selects the search page and the
    /// category page is the last resort. URLs that are not absolute
    /// http(s) URLs are dropped with a warning.
    pub fn seed_urls(&self) -> Vec<String> {
        let mut candidates: Vec<String> = self
            .start_urls
            .iter()
            .map(|s| s.as_str().to_string())
            .chain(self.start_url.clone())
            .chain(self.url.clone())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if candidates.is_empty() {
            candidates.push(self.build_start_url());
        }

        let mut seeds: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match Url::parse(&candidate) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {
                    let url = url.to_string();
                    if !seeds.contains(&url) {
                        seeds.push(url);
                    }
                }
                _ => warn!("Ignoring invalid start URL: {}", candidate),
            }
        }
        seeds
    }

    fn build_start_url(&self) -> String {
        let keyword = self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty());
        let Some(keyword) = keyword else {
            return format!("{}/categories/{}", SITE_ROOT, self.category_slug());
        };

        let search = format!("{}/remote-jobs/search", SITE_ROOT);
        let Ok(mut url) = Url::parse(&search) else {
            return search;
        };
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("term", keyword);
            if let Some(location) = self.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
                query.append_pair("region", location);
            }
        }
        url.to_string()
    }
}

/// Load an input document, choosing the format by file extension.
pub fn load_input(path: &Path) -> Result<CrawlInput, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => CrawlInput::from_json(&raw),
        Some("toml") => CrawlInput::from_toml(&raw),
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Runtime knobs that are not part of the input document.
#[derive(Debug, Clone)]
pub struct CrawlerSettings {
    /// Maximum requests handled at once.
    pub concurrency: usize,
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    pub request_timeout: Duration,
    /// Pause before every request.
    pub request_delay: Duration,
    /// `None` for the crate's own agent, `"impersonate"` for a browser one.
    pub user_agent: Option<String>,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            request_delay: Duration::ZERO,
            user_agent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let input = CrawlInput::from_json("{}").unwrap();
        assert_eq!(input.category, DEFAULT_CATEGORY);
        assert_eq!(input.results_wanted, Some(DEFAULT_RESULTS_WANTED));
        assert_eq!(input.max_pages, DEFAULT_MAX_PAGES);
        assert!(input.collect_details);
        assert_eq!(
            input.seed_urls(),
            vec!["https://weworkremotely.com/categories/all-other-remote-jobs".to_string()]
        );
    }

    #[test]
    fn test_lenient_numbers() {
        let input =
            CrawlInput::from_json(r#"{"results_wanted": "25", "max_pages": 0}"#).unwrap();
        assert_eq!(input.results_wanted, Some(25));
        assert_eq!(input.max_pages, 1);

        let input =
            CrawlInput::from_json(r#"{"results_wanted": "lots", "max_pages": "many"}"#).unwrap();
        assert_eq!(input.results_wanted, None);
        assert_eq!(input.max_pages, DEFAULT_MAX_PAGES);

        let input = CrawlInput::from_json(r#"{"resultsWanted": -4}"#).unwrap();
        assert_eq!(input.results_wanted, Some(1));
    }

    #[test]
    fn test_camel_and_snake_keys() {
        let camel = CrawlInput::from_json(
            r#"{"collectDetails": false, "startUrl": "https://weworkremotely.com/categories/a"}"#,
        )
        .unwrap();
        let snake = CrawlInput::from_json(
            r#"{"collect_details": false, "start_url": "https://weworkremotely.com/categories/a"}"#,
        )
        .unwrap();
        assert!(!camel.collect_details);
        assert!(!snake.collect_details);
        assert_eq!(camel.seed_urls(), snake.seed_urls());
    }

    #[test]
    fn test_explicit_seeds_combined_and_validated() {
        let input = CrawlInput::from_json(
            r#"{
                "startUrls": ["https://weworkremotely.com/categories/a", {"url": "https://weworkremotely.com/categories/b"}, "nope"],
                "startUrl": "https://weworkremotely.com/categories/a",
                "url": "ftp://weworkremotely.com/x",
                "keyword": "ignored"
            }"#,
        )
        .unwrap();
        assert_eq!(
            input.seed_urls(),
            vec![
                "https://weworkremotely.com/categories/a".to_string(),
                "https://weworkremotely.com/categories/b".to_string(),
            ]
        );
    }

    #[test]
    fn test_keyword_builds_search_url() {
        let input = CrawlInput {
            keyword: Some(" rust dev ".to_string()),
            location: Some("Europe".to_string()),
            ..CrawlInput::default()
        };
        assert_eq!(
            input.seed_urls(),
            vec![
                "https://weworkremotely.com/remote-jobs/search?term=rust+dev&region=Europe"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_blank_category_uses_default() {
        let input = CrawlInput {
            category: "   ".to_string(),
            ..CrawlInput::default()
        };
        assert_eq!(input.category_slug(), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_proxy_configuration() {
        let input = CrawlInput::from_json(
            r#"{"proxyConfiguration": {"useApifyProxy": false, "proxyUrls": ["", "http://proxy:8000"]}}"#,
        )
        .unwrap();
        assert_eq!(input.proxy_url(), Some("http://proxy:8000"));

        let input = CrawlInput::from_json(
            r#"{"proxyConfiguration": {"proxy_url": "socks5://127.0.0.1:9050"}}"#,
        )
        .unwrap();
        assert_eq!(input.proxy_url(), Some("socks5://127.0.0.1:9050"));
    }

    #[test]
    fn test_toml_input() {
        let input = CrawlInput::from_toml(
            r#"
category = "remote-design-jobs"
results_wanted = 10
collect_details = false
start_urls = [{ url = "https://weworkremotely.com/categories/remote-design-jobs" }]
"#,
        )
        .unwrap();
        assert_eq!(input.results_wanted, Some(10));
        assert!(!input.collect_details);
        assert_eq!(input.seed_urls().len(), 1);
    }

    #[test]
    fn test_load_input_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("input.json");
        std::fs::write(&json, r#"{"category": "devops"}"#).unwrap();
        assert_eq!(load_input(&json).unwrap().category, "devops");

        let yaml = dir.path().join("input.yaml");
        std::fs::write(&yaml, "category: devops").unwrap();
        assert!(matches!(
            load_input(&yaml),
            Err(ConfigError::UnsupportedFormat(_))
        ));

        assert!(matches!(
            load_input(&dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }
}
