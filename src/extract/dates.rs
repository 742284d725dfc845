//! Posting date extraction.
//!
//! Dates are kept as the phrase the page shows ("3 days ago",
//! "2025-03-01T10:00:00Z"); nothing here parses them into calendar values.

use std::sync::LazyLock;

use regex::Regex;

use super::fields::HEADER_BLOCK;
use super::DetailContext;

const SIDEBAR_ITEMS: &[&str] = &[
    ".lis-container__job__sidebar__job-about__list li",
    ".job-about li",
    ".sidebar li",
];

static POSTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\bposted\s+(?:on\s+)?(\S[^\n]*?(?:\s+ago)?)\s*(?:\bapply\b|$)").unwrap()
});
static POSTED_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*posted(?:\s+on)?\s*:?\s*").unwrap());
static LOOSE_POSTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bposted\s*(?:on\s*)?:?\s*(\d+\s+(?:minute|hour|day|week|month|year)s?\s+ago|[A-Z][a-z]{2,8}\.?\s+\d{1,2},?\s+\d{4}|\d{4}-\d{2}-\d{2})",
    )
    .unwrap()
});

pub(super) fn from_structured(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.structured?.date_posted.clone()
}

/// `<time datetime>` wins over the element's text.
pub(super) fn from_time_element(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.page
        .first_attr(&["time[datetime]"], "datetime")
        .or_else(|| ctx.page.first_text(&["time"]))
}

pub(super) fn from_header(ctx: &DetailContext<'_>) -> Option<String> {
    let header = ctx.page.region_text(HEADER_BLOCK);
    capture_posted(&header)
}

pub(super) fn from_meta(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.page.meta_content(&["article:published_time", "date"])
}

pub(super) fn from_sidebar(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.page
        .select_all(SIDEBAR_ITEMS)
        .into_iter()
        .map(crate::utils::element_plain_text)
        .find(|item| item.to_lowercase().contains("posted"))
        .map(|item| POSTED_LABEL.replace(&item, "").trim().to_string())
}

/// Best-effort scan of the whole page; may pick up unrelated text.
pub(super) fn from_page_text(ctx: &DetailContext<'_>) -> Option<String> {
    let body = ctx.page.body_text();
    LOOSE_POSTED
        .captures(&body)
        .map(|caps| caps[1].trim().to_string())
}

fn capture_posted(text: &str) -> Option<String> {
    POSTED
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|phrase| !phrase.is_empty())
}
