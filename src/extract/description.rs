//! Description extraction using the longest-container rule.

use std::sync::LazyLock;

use scraper::Selector;

use super::DetailContext;
use crate::utils::{decode_encoded_markup, sanitize, sanitize_element, to_plain_text};

/// Candidate description containers, most specific first.
const CONTAINERS: &[&str] = &[
    "#job-listing-show-container",
    "#job-details",
    ".listing-container",
    ".lis-container__job__content__description",
    "[class*=\"job-description\"]",
    ".job-details",
    "article",
];

/// Page chrome that sits inside some containers and is never description.
static CONTAINER_CHROME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        ".listing-header-container, .apply-section, .related-jobs, .lis-container__header, .lis-container__job__sidebar",
    )
    .unwrap()
});
static BODY_CHROME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("header, nav, footer, aside, .apply-section, .related-jobs, #footer").unwrap()
});
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// Sanitized description markup paired with its plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub html: String,
    pub text: String,
}

impl Description {
    fn from_html(html: String) -> Option<Self> {
        let text = to_plain_text(&html);
        if text.is_empty() {
            None
        } else {
            Some(Self { html, text })
        }
    }
}

pub(super) fn extract_description(ctx: &DetailContext<'_>) -> Option<Description> {
    from_structured(ctx)
        .or_else(|| best_container(ctx))
        .or_else(|| from_body(ctx))
}

fn from_structured(ctx: &DetailContext<'_>) -> Option<Description> {
    let raw = ctx.structured?.description_html.as_deref()?;
    sanitize(&decode_encoded_markup(raw)).and_then(Description::from_html)
}

/// Among every matching container, keep the one with the most text.
///
/// Ties go to the container found first.
fn best_container(ctx: &DetailContext<'_>) -> Option<Description> {
    let mut best: Option<Description> = None;
    for element in ctx.page.select_all(CONTAINERS) {
        let Some(candidate) =
            sanitize_element(element, Some(&CONTAINER_CHROME)).and_then(Description::from_html)
        else {
            continue;
        };
        let longer = best
            .as_ref()
            .map_or(true, |current| candidate.text.len() > current.text.len());
        if longer {
            best = Some(candidate);
        }
    }
    best
}

fn from_body(ctx: &DetailContext<'_>) -> Option<Description> {
    let body = ctx.page.document().select(&BODY).next()?;
    sanitize_element(body, Some(&BODY_CHROME)).and_then(Description::from_html)
}
