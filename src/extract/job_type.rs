//! Employment type extraction.

use std::sync::LazyLock;

use regex::Regex;

use super::fields::HEADER_BLOCK;
use super::DetailContext;
use crate::utils::element_plain_text;

/// Tag-like elements that may carry the employment type among other labels.
const TAG_SELECTORS: &[&str] = &[
    ".listing-tag",
    ".job-type",
    "[class*=\"job-type\"]",
    ".lis-container__header__hero__company-info__tags li",
    ".lis-container__job__sidebar__job-about__list__item span.box",
];

const SEPARATOR: &str = ", ";

static JOB_TYPE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:full[\s_-]?time|part[\s_-]?time|contract(?:or)?|freelance|temporary|intern(?:ship)?|permanent|gig|project)\b",
    )
    .unwrap()
});
static JOB_TYPE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)job\s+type\s*:?\s*(full[\s-]?time|part[\s-]?time|contract|freelance)").unwrap()
});
static DELIMITERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,/|;•·]").unwrap());

pub(super) fn from_structured(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.structured?.job_type.clone()
}

/// Gather every tag-like label and keep the ones naming an employment type.
///
/// When no label matches a known type, all labels are kept.
pub(super) fn from_tags(ctx: &DetailContext<'_>) -> Option<String> {
    let mut candidates: Vec<String> = Vec::new();
    for text in ctx
        .page
        .select_all(TAG_SELECTORS)
        .into_iter()
        .map(element_plain_text)
    {
        if !text.is_empty() && !contains_ignore_case(&candidates, &text) {
            candidates.push(text);
        }
    }
    choose_job_type(&candidates)
}

pub(super) fn from_header_label(ctx: &DetailContext<'_>) -> Option<String> {
    let header = ctx.page.region_text(HEADER_BLOCK);
    JOB_TYPE_LABEL
        .captures(&header)
        .map(|caps| caps[1].trim().to_string())
}

/// Prefer keyword matches; fall back to every candidate.
pub fn choose_job_type(candidates: &[String]) -> Option<String> {
    if candidates.is_empty() {
        return None;
    }
    let matching: Vec<&str> = candidates
        .iter()
        .filter(|c| JOB_TYPE_KEYWORD.is_match(c))
        .map(String::as_str)
        .collect();
    if matching.is_empty() {
        Some(candidates.join(SEPARATOR))
    } else {
        Some(matching.join(SEPARATOR))
    }
}

/// Re-split a job type on common delimiters and keep only the parts that
/// name an employment type.
///
/// Input with no recognizable part is returned trimmed as-is.
pub fn normalize_job_type(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let mut parts: Vec<String> = Vec::new();
    for part in DELIMITERS.split(raw).map(str::trim) {
        if !part.is_empty() && JOB_TYPE_KEYWORD.is_match(part) && !contains_ignore_case(&parts, part) {
            parts.push(part.to_string());
        }
    }
    if parts.is_empty() {
        Some(raw.to_string())
    } else {
        Some(parts.join(SEPARATOR))
    }
}

fn contains_ignore_case(items: &[String], needle: &str) -> bool {
    items.iter().any(|item| item.eq_ignore_ascii_case(needle))
}
