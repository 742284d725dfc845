//! Field extraction for job detail pages.
//!
//! Every field has an ordered chain of extractors. The chain stops at the
//! first extractor returning a non-blank value:
//! - embedded JSON-LD `JobPosting` data
//! - site-specific CSS selectors
//! - label/value regexes over header, sidebar and meta text
//! - a fixed default (location only)
//!
//! Extractors are plain functions of a parsed page. Nothing here does I/O
//! or holds state between pages.

mod company;
mod dates;
mod description;
mod fields;
mod job_type;
mod page;
mod structured;

use std::panic::{catch_unwind, AssertUnwindSafe};

use thiserror::Error;

use crate::models::JobRecord;
use crate::models::JobRecordBuilder;
use crate::utils::parse_salary;

pub use company::{clean_company, company_from_slug};
pub use description::Description;
pub use fields::DEFAULT_LOCATION;
pub use job_type::{choose_job_type, normalize_job_type};
pub use page::Page;
pub use structured::{extract_structured, parse_structured_block, StructuredJob};

/// Errors from running the pipeline over raw HTML.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Empty document: {0}")]
    EmptyDocument(String),

    #[error("Extraction panicked on {url}: {message}")]
    Panicked { url: String, message: String },
}

/// Inputs shared by every extractor for one page.
pub struct DetailContext<'a> {
    page: &'a Page,
    structured: Option<&'a StructuredJob>,
    category: Option<&'a str>,
}

type FieldExtractor = fn(&DetailContext<'_>) -> Option<String>;

const TITLE_CHAIN: &[FieldExtractor] = &[fields::title_from_structured, fields::title_from_headings];

const COMPANY_CHAIN: &[FieldExtractor] = &[
    company::from_structured,
    company::from_selectors,
    company::from_profile_slug,
    company::from_title_pattern,
    company::from_header_greeting,
];

const CATEGORY_CHAIN: &[FieldExtractor] = &[fields::category_from_selectors, fields::category_from_input];

const LOCATION_CHAIN: &[FieldExtractor] = &[
    fields::location_from_structured,
    fields::location_from_selectors,
    fields::location_from_header,
    fields::location_default,
];

const JOB_TYPE_CHAIN: &[FieldExtractor] = &[
    job_type::from_structured,
    job_type::from_tags,
    job_type::from_header_label,
];

const DATE_CHAIN: &[FieldExtractor] = &[
    dates::from_structured,
    dates::from_time_element,
    dates::from_header,
    dates::from_meta,
    dates::from_sidebar,
    dates::from_page_text,
];

const SALARY_CHAIN: &[FieldExtractor] = &[
    fields::salary_from_structured,
    fields::salary_from_selectors,
    fields::salary_from_labels,
];

/// Run `chain` in order and return the first non-blank value.
fn first_non_empty(chain: &[FieldExtractor], ctx: &DetailContext<'_>) -> Option<String> {
    chain.iter().find_map(|extract| {
        extract(ctx)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Build a record from a parsed detail page.
///
/// `category` is the configured crawl category, used when the page does not
/// name one.
pub fn extract_job(page: &Page, category: Option<&str>) -> JobRecord {
    let structured = extract_structured(page.document());
    let ctx = DetailContext {
        page,
        structured: structured.as_ref(),
        category,
    };

    let description = description::extract_description(&ctx);
    let salary_text = first_non_empty(SALARY_CHAIN, &ctx);
    let job_type = first_non_empty(JOB_TYPE_CHAIN, &ctx)
        .as_deref()
        .and_then(normalize_job_type);
    let (description_html, description_text) = match description {
        Some(d) => (Some(d.html), Some(d.text)),
        None => (None, None),
    };

    JobRecordBuilder::new()
        .title(first_non_empty(TITLE_CHAIN, &ctx))
        .company(first_non_empty(COMPANY_CHAIN, &ctx))
        .category(first_non_empty(CATEGORY_CHAIN, &ctx))
        .location(first_non_empty(LOCATION_CHAIN, &ctx))
        .job_type(job_type)
        .date_posted(first_non_empty(DATE_CHAIN, &ctx))
        .description(description_html, description_text)
        .salary(parse_salary(salary_text.as_deref()))
        .build(page.url())
}

/// Parse `html` and extract a record, turning a panic anywhere in the
/// pipeline into an error for this page alone.
pub fn extract_job_from_html(
    url: &str,
    html: &str,
    category: Option<&str>,
) -> Result<JobRecord, ExtractError> {
    if html.trim().is_empty() {
        return Err(ExtractError::EmptyDocument(url.to_string()));
    }

    catch_unwind(AssertUnwindSafe(|| {
        let page = Page::parse(url, html);
        extract_job(&page, category)
    }))
    .map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        ExtractError::Panicked {
            url: url.to_string(),
            message,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SalaryInterval, SOURCE_TAG};

    const URL: &str = "https://weworkremotely.com/remote-jobs/acme-senior-rust-engineer";

    const LEGACY_LAYOUT: &str = r#"<!DOCTYPE html>
<html><head>
  <title>Acme: Senior Rust Engineer | We Work Remotely</title>
  <meta property="og:title" content="Senior Rust Engineer at Acme">
</head><body>
  <header><nav>Browse jobs</nav></header>
  <div class="listing-header-container">
    <h2>Posted <time datetime="2025-03-04T10:00:00Z">Mar 4</time></h2>
    <h1>Senior Rust Engineer</h1>
    <a href="/categories/remote-back-end-programming-jobs">Back-End Programming</a>
    <span class="listing-tag">Full-Time</span>
    <span class="listing-tag">Anywhere in the World</span>
    <span class="region">Region: USA Only</span>
  </div>
  <div class="company-card"><h2>Acme</h2><a href="/company/acme">View company profile</a></div>
  <div id="job-listing-show-container">
    <div><p>Build a <strong>crawler</strong>.</p><script>track()</script></div>
    <div class="apply-section"><a href="/apply">Apply now</a></div>
  </div>
  <div class="salary">$90,000 - $120,000 USD</div>
</body></html>"#;

    const JSON_LD_LAYOUT: &str = r#"<html><head>
<script type="application/ld+json">{
  "@context": "https://schema.org",
  "@type": "JobPosting",
  "title": "Staff Designer",
  "hiringOrganization": {"@type": "Organization", "name": "Globex"},
  "datePosted": "2025-02-01",
  "description": "&lt;p&gt;Design &lt;b&gt;things&lt;/b&gt;&lt;/p&gt;",
  "employmentType": "CONTRACTOR",
  "jobLocation": {"address": {"addressCountry": "Canada"}},
  "baseSalary": {"currency": "CAD", "value": {"minValue": 50, "maxValue": 70, "unitText": "HOUR"}}
}</script></head>
<body><h1>Ignored heading</h1></body></html>"#;

    #[test]
    fn test_legacy_layout_fallbacks() {
        let job = extract_job_from_html(URL, LEGACY_LAYOUT, Some("all-other-remote-jobs")).unwrap();

        assert_eq!(job.title.as_deref(), Some("Senior Rust Engineer"));
        assert_eq!(job.company.as_deref(), Some("Acme"));
        assert_eq!(job.category.as_deref(), Some("Back-End Programming"));
        assert_eq!(job.location.as_deref(), Some("USA Only"));
        assert_eq!(job.job_type.as_deref(), Some("Full-Time"));
        assert_eq!(job.date_posted.as_deref(), Some("2025-03-04T10:00:00Z"));
        assert_eq!(job.description_html.as_deref(), Some("<p>Build a <strong>crawler</strong>.</p>"));
        assert_eq!(job.description_text.as_deref(), Some("Build a crawler."));
        assert_eq!(job.salary_text.as_deref(), Some("$90,000 - $120,000 USD"));
        assert_eq!(job.salary_min, Some(90000.0));
        assert_eq!(job.salary_max, Some(120000.0));
        assert_eq!(job.salary_currency.as_deref(), Some("USD"));
        assert_eq!(job.salary_interval, Some(SalaryInterval::Year));
        assert_eq!(job.url, URL);
        assert_eq!(job.source, SOURCE_TAG);
    }

    #[test]
    fn test_structured_data_is_authoritative() {
        let job = extract_job_from_html(URL, JSON_LD_LAYOUT, None).unwrap();

        assert_eq!(job.title.as_deref(), Some("Staff Designer"));
        assert_eq!(job.company.as_deref(), Some("Globex"));
        assert_eq!(job.date_posted.as_deref(), Some("2025-02-01"));
        assert_eq!(job.location.as_deref(), Some("Canada"));
        assert_eq!(job.job_type.as_deref(), Some("CONTRACTOR"));
        assert_eq!(job.description_html.as_deref(), Some("<p>Design <b>things</b></p>"));
        assert_eq!(job.salary_text.as_deref(), Some("CAD 50 - 70 per hour"));
        assert_eq!(job.salary_min, Some(50.0));
        assert_eq!(job.salary_max, Some(70.0));
        assert_eq!(job.salary_currency.as_deref(), Some("CAD"));
        assert_eq!(job.salary_interval, Some(SalaryInterval::Hour));
        assert_eq!(job.category, None);
    }

    #[test]
    fn test_sparse_page_uses_defaults() {
        let html = "<html><head><title>Ops Lead at Initech | WWR</title></head>\
                    <body><p>Small print</p></body></html>";
        let job = extract_job_from_html(URL, html, Some("devops")).unwrap();

        assert_eq!(job.title, None);
        assert_eq!(job.company.as_deref(), Some("Initech"));
        assert_eq!(job.category.as_deref(), Some("devops"));
        assert_eq!(job.location.as_deref(), Some(DEFAULT_LOCATION));
        assert_eq!(job.job_type, None);
        assert_eq!(job.date_posted, None);
        assert_eq!(job.salary_text, None);
        assert_eq!(job.salary_min, None);
        assert_eq!(job.description_text.as_deref(), Some("Small print"));
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let err = extract_job_from_html(URL, "   ", None).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyDocument(_)));
    }

    #[test]
    fn test_first_non_empty_skips_blank_results() {
        fn blank(_: &DetailContext<'_>) -> Option<String> {
            Some("   ".to_string())
        }
        fn none(_: &DetailContext<'_>) -> Option<String> {
            None
        }
        fn value(_: &DetailContext<'_>) -> Option<String> {
            Some(" found ".to_string())
        }
        fn unreachable_extractor(_: &DetailContext<'_>) -> Option<String> {
            panic!("chain must stop at the first value")
        }

        let page = Page::parse("u", "<html></html>");
        let ctx = DetailContext {
            page: &page,
            structured: None,
            category: None,
        };
        let chain: &[FieldExtractor] = &[blank, none, value, unreachable_extractor];
        assert_eq!(first_non_empty(chain, &ctx).as_deref(), Some("found"));
    }
}
