//! Title, location, category and salary-text extractors.

use std::sync::LazyLock;

use regex::Regex;

use super::DetailContext;

/// Location used when nothing on the page names one.
pub const DEFAULT_LOCATION: &str = "Anywhere in the World";

const TITLE_SELECTORS: &[&str] = &[
    "h1.listing-header",
    ".listing-header h1",
    ".lis-container__header__hero__company-info__title",
    "h1",
];

const LOCATION_SELECTORS: &[&str] = &[
    ".lis-container__job__sidebar__job-about__list__item--location span",
    ".region",
    ".location",
    "[class*=\"region\"]",
];

const CATEGORY_SELECTORS: &[&str] = &[
    ".listing-header-container a[href*=\"/categories/\"]",
    ".lis-container__header a[href*=\"/categories/\"]",
    "[class*=\"category\"]",
];

const SALARY_SELECTORS: &[&str] = &[
    ".compensation",
    ".salary",
    "[class*=\"salary\"]",
    "[class*=\"compensation\"]",
];

pub(super) const HEADER_BLOCK: &[&str] = &[
    ".listing-header-container",
    ".lis-container__header",
    ".job-info",
];

const SALARY_REGION: &[&str] = &[
    ".listing-header-container",
    ".lis-container__header",
    ".job-info",
    "#job-details",
];

static LOCATION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*(?:region|location)\s*:?\s*(\S[^\n]*)$").unwrap());
static LEADING_LOCATION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:region|location)\s*:?\s*").unwrap());
static SALARY_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\b(?:salary|pay|compensation)\b\s*:?\s*([^\n]*\d[^\n]*)").unwrap()
});

pub(super) fn title_from_structured(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.structured?.title.clone()
}

pub(super) fn title_from_headings(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.page.first_text(TITLE_SELECTORS)
}

pub(super) fn location_from_structured(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.structured?.location.clone()
}

pub(super) fn location_from_selectors(ctx: &DetailContext<'_>) -> Option<String> {
    let text = ctx.page.first_text(LOCATION_SELECTORS)?;
    let stripped = LEADING_LOCATION_LABEL.replace(&text, "");
    Some(stripped.trim().to_string())
}

pub(super) fn location_from_header(ctx: &DetailContext<'_>) -> Option<String> {
    let header = ctx.page.region_text(HEADER_BLOCK);
    LOCATION_LABEL
        .captures(&header)
        .map(|caps| caps[1].trim().to_string())
}

pub(super) fn location_default(_ctx: &DetailContext<'_>) -> Option<String> {
    Some(DEFAULT_LOCATION.to_string())
}

pub(super) fn category_from_selectors(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.page.first_text(CATEGORY_SELECTORS)
}

pub(super) fn category_from_input(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.category.map(str::to_string)
}

pub(super) fn salary_from_structured(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.structured?.salary_text.clone()
}

pub(super) fn salary_from_selectors(ctx: &DetailContext<'_>) -> Option<String> {
    ctx.page.first_text(SALARY_SELECTORS)
}

pub(super) fn salary_from_labels(ctx: &DetailContext<'_>) -> Option<String> {
    let region = ctx.page.region_text(SALARY_REGION);
    SALARY_LABEL
        .captures(&region)
        .map(|caps| caps[1].trim().to_string())
}
