//! Company name extraction and cleanup.

use std::sync::LazyLock;

use regex::Regex;

use super::fields::HEADER_BLOCK;
use super::DetailContext;
use crate::utils::{collapse_whitespace, decode_entities, element_plain_text};

/// Cap applied to cleaned names.
const MAX_COMPANY_LEN: usize = 120;
/// Heuristic candidates longer than this are page noise, not names.
const MAX_HEURISTIC_LEN: usize = 80;

const COMPANY_SELECTORS: &[&str] = &[
    ".lis-container__header__hero__company-info__description h2",
    ".company-card h2",
    ".company-card h3",
    ".company h2",
    ".company h3",
    "a[href*=\"/company/\"]",
];

const COMPANY_LINK: &[&str] = &["a[href*=\"/company/\"]"];

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)|\{[^}]*\}").unwrap());
static QUERY_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\butm_[a-z]+=\S*|\?\S*").unwrap());
static TRAILING_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s|,;:\-–—]+$").unwrap());
static PROFILE_LINK_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:view|see)\b.*\b(?:profile|jobs)$|^company profile$|^more jobs").unwrap()
});
static AT_COMPANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bat\s+(.+?)\s*(?:\||–|—|\s-\s|$)").unwrap());
static WE_ARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bwe(?:'|’)re\s+([^!.\n]{2,100}?)\s*!").unwrap());

/// Normalize a raw company string.
///
/// Decodes entities, drops bracketed asides and URL query/UTM fragments,
/// collapses whitespace and caps the length.
pub fn clean_company(raw: &str) -> Option<String> {
    let decoded = decode_entities(raw);
    let without_brackets = BRACKETED.replace_all(&decoded, " ");
    let without_query = QUERY_NOISE.replace_all(&without_brackets, " ");
    let collapsed = collapse_whitespace(&without_query);
    let trimmed = TRAILING_PUNCT.replace(&collapsed, "");
    let capped: String = trimmed.chars().take(MAX_COMPANY_LEN).collect();
    let capped = capped.trim();
    if capped.is_empty() {
        None
    } else {
        Some(capped.to_string())
    }
}

/// Turn a profile slug like `acme-corp_inc` into `Acme Corp Inc`.
pub fn company_from_slug(slug: &str) -> Option<String> {
    let decoded = urlencoding::decode(slug)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| slug.to_string());
    let words: Vec<String> = decoded
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

pub(super) fn from_structured(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.structured?.company.as_deref().and_then(clean_company)
}

pub(super) fn from_selectors(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.page
        .select_all(COMPANY_SELECTORS)
        .into_iter()
        .map(element_plain_text)
        .filter(|text| !PROFILE_LINK_TEXT.is_match(text))
        .find_map(|text| clean_company(&text))
}

pub(super) fn from_profile_slug(ctx: &DetailContext<'_>) -> Option<String> {
    let href = ctx.page.first_attr(COMPANY_LINK, "href")?;
    let path = href.split(['?', '#']).next().unwrap_or_default();
    let slug = path.split("/company/").nth(1)?.split('/').next()?;
    company_from_slug(slug).filter(|name| within_heuristic_limit(name))
}

pub(super) fn from_title_pattern(ctx: &DetailContext<'_>) -> Option<String> {
    let candidates = [
        ctx.page.meta_content(&["og:title", "twitter:title"]),
        ctx.page.title_text(),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(|title| {
            AT_COMPANY
                .captures(&title)
                .and_then(|caps| clean_company(&caps[1]))
        })
        .find(|name| within_heuristic_limit(name))
}

pub(super) fn from_header_greeting(ctx: &DetailContext<'_>) -> Option<String> {
    let header = ctx.page.region_text(HEADER_BLOCK);
    WE_ARE
        .captures(&header)
        .and_then(|caps| clean_company(&caps[1]))
        .filter(|name| within_heuristic_limit(name))
}

fn within_heuristic_limit(name: &str) -> bool {
    name.chars().count() <= MAX_HEURISTIC_LEN
}
