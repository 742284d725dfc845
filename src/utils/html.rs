//! HTML sanitizing and text normalization.
//!
//! Sanitizing renders a parsed fragment back out, keeping only a small
//! allow-list of formatting tags. Non-content elements are dropped together
//! with their contents; every other element is unwrapped so its children
//! take its place.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Tags kept in sanitized output.
const ALLOWED_TAGS: &[&str] = &["p", "br", "strong", "b", "em", "i", "ul", "ol", "li", "a"];

/// Tags removed outright, contents included.
const REMOVED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "frame", "frameset", "object", "embed",
    "applet", "form", "input", "button", "select", "option", "optgroup", "textarea", "label",
    "fieldset", "head", "meta", "link", "title", "base",
];

/// Tags whose text never counts as content.
const TEXT_SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "iframe", "frame"];

/// Tags that separate words when flattened to text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

static AROUND_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\f]*\n\s*").unwrap());
static REPEATED_BLANKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Decode HTML entities (`&amp;`, `&#8217;`, ...).
pub fn decode_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, " ").trim().to_string()
}

/// Reduce arbitrary HTML to the allow-listed subset.
///
/// Returns `None` when nothing is left. Sanitizing sanitized output is a
/// no-op. Entity-encoded markup must go through [`decode_encoded_markup`]
/// first; escaped text in the input stays escaped text.
pub fn sanitize(html: &str) -> Option<String> {
    let trimmed = html.trim();
    if trimmed.is_empty() {
        return None;
    }

    let fragment = Html::parse_fragment(trimmed);
    let mut out = String::with_capacity(trimmed.len());
    render_children(fragment.root_element(), None, &mut Vec::new(), &mut out);
    finish(out)
}

/// Decode markup that arrived entity-encoded (`&lt;p&gt;...`).
///
/// Input that already contains a tag is returned unchanged.
pub fn decode_encoded_markup(s: &str) -> Cow<'_, str> {
    let encoded =
        !s.contains('<') && (s.contains("&lt;") || s.contains("&#60;") || s.contains("&#x3c;"));
    if encoded {
        Cow::Owned(decode_entities(s))
    } else {
        Cow::Borrowed(s)
    }
}

/// Sanitize the contents of an already-parsed element.
///
/// Descendants matching `prune` are dropped along with their contents.
pub fn sanitize_element(element: ElementRef<'_>, prune: Option<&Selector>) -> Option<String> {
    let mut out = String::new();
    render_children(element, prune, &mut Vec::new(), &mut out);
    finish(out)
}

/// Flatten HTML to whitespace-normalized plain text.
pub fn to_plain_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(html);
    element_plain_text(fragment.root_element())
}

/// Plain text of an element subtree, whitespace-normalized.
pub fn element_plain_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    collapse_whitespace(&out)
}

fn is_script_href(href: &str) -> bool {
    href.trim_start()
        .get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
}

fn finish(out: String) -> Option<String> {
    let out = AROUND_NEWLINE.replace_all(&out, "\n");
    let out = REPEATED_BLANKS.replace_all(&out, " ");
    let out = out.trim();
    if out.is_empty() {
        None
    } else {
        Some(out.to_string())
    }
}

/// Whether emitting `name` inside the `open` allowed tags would be split
/// apart when the output is parsed again.
///
/// Unwrapping table cells and other scoping elements can leave `a` inside
/// `a`, block content inside `p`, or `li` directly inside `li`.
fn breaks_nesting(name: &str, open: &[&str]) -> bool {
    match name {
        "a" => open.contains(&"a"),
        "p" | "ul" | "ol" => open.contains(&"p"),
        "li" => {
            open.contains(&"p")
                || open
                    .iter()
                    .rev()
                    .take_while(|tag| !matches!(**tag, "ul" | "ol"))
                    .any(|tag| *tag == "li")
        }
        _ => false,
    }
}

fn render_children<'a>(
    element: ElementRef<'a>,
    prune: Option<&Selector>,
    open: &mut Vec<&'a str>,
    out: &mut String,
) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&html_escape::encode_text(&**text)),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if REMOVED_TAGS.contains(&name) || prune.is_some_and(|p| p.matches(&child)) {
                    continue;
                }
                if !ALLOWED_TAGS.contains(&name) || breaks_nesting(name, open) {
                    render_children(child, prune, open, out);
                    continue;
                }

                out.push('<');
                out.push_str(name);
                if name == "a" {
                    if let Some(href) = child.value().attr("href").filter(|h| !is_script_href(h)) {
                        out.push_str(" href=\"");
                        out.push_str(&html_escape::encode_double_quoted_attribute(href));
                        out.push('"');
                    }
                }
                out.push('>');

                if name != "br" {
                    open.push(name);
                    render_children(child, prune, open, out);
                    open.pop();
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
            _ => {}
        }
    }
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if TEXT_SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push(' ');
                }
                collect_text(child, out);
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}
