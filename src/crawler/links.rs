//! Job link discovery and pagination on listing pages.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

static JOB_ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/remote-jobs/"]"#).unwrap());

/// Listing-namespace paths that are not job postings.
const NON_JOB_SLUGS: &[&str] = &["search", "new"];

/// Absolute URLs of job detail pages linked from a listing page.
///
/// Only `/remote-jobs/<slug>` paths count; deeper paths (company profiles and
/// the like) are ignored. Hrefs that fail to resolve against `base_url` are
/// dropped. Query strings, fragments and a trailing slash are removed so
/// tracking variants of one posting compare equal. Order is first
/// appearance in the document, without duplicates.
pub fn find_job_links(document: &Html, base_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in document.select(&JOB_ANCHORS) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(mut resolved) = base.join(href.trim()) else {
            continue;
        };
        if !is_job_detail_path(resolved.path()) {
            continue;
        }
        resolved.set_fragment(None);
        resolved.set_query(None);
        let path = resolved.path().trim_end_matches('/').to_string();
        resolved.set_path(&path);
        let resolved = resolved.to_string();
        if seen.insert(resolved.clone()) {
            links.push(resolved);
        }
    }
    links
}

/// Whether `path` is exactly `/remote-jobs/<slug>`.
pub fn is_job_detail_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix("/remote-jobs/") else {
        return false;
    };
    let slug = rest.strip_suffix('/').unwrap_or(rest);
    !slug.is_empty() && !slug.contains('/') && !NON_JOB_SLUGS.contains(&slug)
}

/// URL of the listing page after `current_page`, with `page` set in the
/// query string. Other query parameters are kept.
///
/// Returns `None` if `current_url` is not an absolute URL.
pub fn find_next_page(current_url: &str, current_page: u32) -> Option<String> {
    let mut url = Url::parse(current_url).ok()?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let next = current_page.saturating_add(1).to_string();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("page", &next);
    Some(url.to_string())
}
