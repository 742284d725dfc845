//! Parsed page wrapper with selector helpers.

use scraper::{ElementRef, Html, Selector};

use crate::utils::{collapse_whitespace, element_plain_text};

/// A fetched page parsed into a document tree.
///
/// `Html` is not `Send`, so a `Page` lives inside one synchronous handler
/// call and is never held across an await point.
pub struct Page {
    url: String,
    document: Html,
}

impl Page {
    pub fn parse(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            document: Html::parse_document(html),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    /// Every element matching any of `selectors`, in selector order.
    ///
    /// Selectors that fail to parse are skipped.
    pub fn select_all<'a>(&'a self, selectors: &[&str]) -> Vec<ElementRef<'a>> {
        let mut found = Vec::new();
        for selector_str in selectors {
            let selector = match Selector::parse(selector_str) {
                Ok(s) => s,
                Err(_) => continue,
            };
            found.extend(self.document.select(&selector));
        }
        found
    }

    /// Text of the first element, in selector order, whose trimmed text is
    /// not empty.
    pub fn first_text(&self, selectors: &[&str]) -> Option<String> {
        self.select_all(selectors)
            .into_iter()
            .map(element_plain_text)
            .find(|text| !text.is_empty())
    }

    /// First non-empty value of `attr` on elements matching `selectors`.
    pub fn first_attr(&self, selectors: &[&str], attr: &str) -> Option<String> {
        self.select_all(selectors)
            .into_iter()
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Text of every element matching `selectors`, one text node per line.
    ///
    /// Line structure is kept so label/value regexes can anchor on line ends.
    pub fn region_text(&self, selectors: &[&str]) -> String {
        self.select_all(selectors)
            .into_iter()
            .map(element_lines)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Line-oriented text of the whole body.
    pub fn body_text(&self) -> String {
        self.region_text(&["body"])
    }

    /// Content of a `<meta>` tag looked up by `property` or `name`.
    pub fn meta_content(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| {
            let selectors = [
                format!("meta[property=\"{key}\"]"),
                format!("meta[name=\"{key}\"]"),
            ];
            let selectors: Vec<&str> = selectors.iter().map(String::as_str).collect();
            self.first_attr(&selectors, "content")
        })
    }

    /// Text of the document `<title>`.
    pub fn title_text(&self) -> Option<String> {
        self.first_text(&["head > title", "title"])
    }
}

fn element_lines(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
