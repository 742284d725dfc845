//! JSON-LD `JobPosting` extraction.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::utils::{collapse_whitespace, decode_entities};

static LD_JSON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// Fields read from the first `JobPosting` block on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredJob {
    pub title: Option<String>,
    pub company: Option<String>,
    pub date_posted: Option<String>,
    /// Raw description markup, possibly entity-encoded.
    pub description_html: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub salary_text: Option<String>,
}

/// Scan every JSON-LD block and return the first job posting found.
///
/// Malformed blocks are skipped; later postings are never considered.
pub fn extract_structured(document: &Html) -> Option<StructuredJob> {
    document.select(&LD_JSON).find_map(|script| {
        let raw: String = script.text().collect();
        parse_structured_block(&raw)
    })
}

/// Parse one JSON-LD block, tolerating a single object, an array, or an
/// `@graph` container.
pub fn parse_structured_block(raw: &str) -> Option<StructuredJob> {
    let value: Value = match serde_json::from_str(raw.trim()) {
        Ok(v) => v,
        Err(e) => {
            debug!("Ignoring malformed JSON-LD block: {}", e);
            return None;
        }
    };

    let mut entries = Vec::new();
    flatten_entries(&value, &mut entries);
    entries
        .into_iter()
        .find(|entry| is_job_posting(entry))
        .map(job_from_entry)
}

fn flatten_entries<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_entries(item, out);
            }
        }
        Value::Object(map) => {
            out.push(value);
            if let Some(graph) = map.get("@graph") {
                flatten_entries(graph, out);
            }
        }
        _ => {}
    }
}

fn is_job_posting(entry: &Value) -> bool {
    let declared = entry.get("@type").or_else(|| entry.get("type"));
    match declared {
        Some(Value::String(t)) => t == "JobPosting",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("JobPosting")),
        _ => false,
    }
}

fn job_from_entry(entry: &Value) -> StructuredJob {
    StructuredJob {
        title: string_field(entry, "title").or_else(|| string_field(entry, "name")),
        company: entry.get("hiringOrganization").and_then(named_value),
        date_posted: string_field(entry, "datePosted"),
        description_html: entry
            .get("description")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        location: location_of(entry),
        job_type: entry.get("employmentType").and_then(employment_type),
        salary_text: entry.get("baseSalary").and_then(salary_text),
    }
}

fn clean(s: &str) -> Option<String> {
    let cleaned = collapse_whitespace(&decode_entities(s));
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn string_field(entry: &Value, key: &str) -> Option<String> {
    entry.get(key).and_then(Value::as_str).and_then(clean)
}

/// A string, or an object's `name`.
fn named_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => clean(s),
        Value::Object(_) => string_field(value, "name"),
        Value::Array(items) => items.iter().find_map(named_value),
        _ => None,
    }
}

fn first_entry(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.first(),
        Value::Null => None,
        other => Some(other),
    }
}

fn location_of(entry: &Value) -> Option<String> {
    let from_address = entry
        .get("jobLocation")
        .and_then(first_entry)
        .and_then(|loc| loc.get("address"))
        .and_then(|address| match address {
            Value::String(s) => clean(s),
            _ => ["addressLocality", "addressRegion", "addressCountry"]
                .iter()
                .find_map(|key| address.get(*key).and_then(named_value)),
        });

    from_address.or_else(|| {
        let requirements = entry.get("applicantLocationRequirements")?;
        let names: Vec<String> = match requirements {
            Value::Array(items) => items.iter().filter_map(named_value).collect(),
            other => named_value(other).into_iter().collect(),
        };
        if names.is_empty() {
            None
        } else {
            Some(names.join(", "))
        }
    })
}

fn employment_type(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => clean(s),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(Value::as_str).filter_map(clean).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    }
}

/// Render a number without a trailing `.0` when it is whole.
fn amount(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i.to_string());
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 {
                Some(format!("{}", f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Value::String(s) => clean(s),
        _ => None,
    }
}

fn salary_text(base: &Value) -> Option<String> {
    let Value::Object(_) = base else {
        return amount(base);
    };

    let value = base.get("value");
    let range = value.and_then(|v| {
        let min = v.get("minValue").and_then(amount);
        let max = v.get("maxValue").and_then(amount);
        match (min, max) {
            (Some(min), Some(max)) => Some(format!("{min} - {max}")),
            (Some(single), None) | (None, Some(single)) => Some(single),
            (None, None) => v.get("value").and_then(amount),
        }
    });
    let figure = range.or_else(|| value.and_then(amount))?;

    let mut text = match string_field(base, "currency") {
        Some(currency) => format!("{currency} {figure}"),
        None => figure,
    };

    let unit = value
        .and_then(|v| string_field(v, "unitText"))
        .or_else(|| string_field(base, "unitText"));
    if let Some(unit) = unit {
        text.push_str(" per ");
        text.push_str(&unit.to_lowercase());
    }

    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_single_posting() {
        let raw = r#"{
            "@context": "https://schema.org",
            "@type": "JobPosting",
            "title": "Senior Rust Engineer",
            "hiringOrganization": {"@type": "Organization", "name": "Acme &amp; Co"},
            "datePosted": "2025-03-01",
            "description": "&lt;p&gt;Build things&lt;/p&gt;",
            "jobLocation": {"address": {"addressRegion": "Anywhere", "addressCountry": "US"}},
            "employmentType": ["FULL_TIME", "CONTRACTOR"],
            "baseSalary": {
                "@type": "MonetaryAmount",
                "currency": "USD",
                "value": {"@type": "QuantitativeValue", "minValue": 90000, "maxValue": 120000.0, "unitText": "YEAR"}
            }
        }"#;
        let job = parse_structured_block(raw).unwrap();

        assert_eq!(job.title.as_deref(), Some("Senior Rust Engineer"));
        assert_eq!(job.company.as_deref(), Some("Acme & Co"));
        assert_eq!(job.date_posted.as_deref(), Some("2025-03-01"));
        assert_eq!(
            job.description_html.as_deref(),
            Some("&lt;p&gt;Build things&lt;/p&gt;")
        );
        assert_eq!(job.location.as_deref(), Some("Anywhere"));
        assert_eq!(job.job_type.as_deref(), Some("FULL_TIME, CONTRACTOR"));
        assert_eq!(
            job.salary_text.as_deref(),
            Some("USD 90000 - 120000 per year")
        );
    }

    #[test]
    fn test_array_and_type_list() {
        let raw = r#"[
            {"@type": "BreadcrumbList"},
            {"@type": ["Thing", "JobPosting"], "name": "Designer", "hiringOrganization": "Studio"}
        ]"#;
        let job = parse_structured_block(raw).unwrap();
        assert_eq!(job.title.as_deref(), Some("Designer"));
        assert_eq!(job.company.as_deref(), Some("Studio"));
    }

    #[test]
    fn test_graph_container() {
        let raw = r#"{"@graph": [{"@type": "WebPage"}, {"@type": "JobPosting", "title": "QA"}]}"#;
        assert_eq!(
            parse_structured_block(raw).unwrap().title.as_deref(),
            Some("QA")
        );
    }

    #[test]
    fn test_non_job_and_malformed_blocks() {
        assert_eq!(parse_structured_block(r#"{"@type": "Organization"}"#), None);
        assert_eq!(parse_structured_block("{not json"), None);
        assert_eq!(parse_structured_block(""), None);
    }

    #[test]
    fn test_salary_single_value_without_currency() {
        let raw = r#"{"@type": "JobPosting", "baseSalary": {"value": {"value": 75000}}}"#;
        assert_eq!(
            parse_structured_block(raw).unwrap().salary_text.as_deref(),
            Some("75000")
        );

        let raw = r#"{"@type": "JobPosting", "baseSalary": {"currency": "EUR", "value": 5000}}"#;
        assert_eq!(
            parse_structured_block(raw).unwrap().salary_text.as_deref(),
            Some("EUR 5000")
        );

        let raw = r#"{"@type": "JobPosting", "baseSalary": "$100k"}"#;
        assert_eq!(
            parse_structured_block(raw).unwrap().salary_text.as_deref(),
            Some("$100k")
        );
    }

    #[test]
    fn test_location_falls_back_to_applicant_requirements() {
        let raw = r#"{"@type": "JobPosting", "jobLocationType": "TELECOMMUTE",
            "applicantLocationRequirements": [{"@type": "Country", "name": "USA"}, {"@type": "Country", "name": "Canada"}]}"#;
        assert_eq!(
            parse_structured_block(raw).unwrap().location.as_deref(),
            Some("USA, Canada")
        );

        let raw = r#"{"@type": "JobPosting", "jobLocation": [{"address": {"addressCountry": {"name": "Germany"}}}]}"#;
        assert_eq!(
            parse_structured_block(raw).unwrap().location.as_deref(),
            Some("Germany")
        );
    }

    #[test]
    fn test_first_matching_block_wins() {
        let html = r#"<html><head>
            <script type="application/ld+json">{ broken</script>
            <script type="application/ld+json">{"@type": "Organization", "name": "X"}</script>
            <script type="application/ld+json">{"@type": "JobPosting", "title": "First"}</script>
            <script type="application/ld+json">{"@type": "JobPosting", "title": "Second"}</script>
            </head><body></body></html>"#;
        let document = Html::parse_document(html);
        let job = extract_structured(&document).unwrap();
        assert_eq!(job.title.as_deref(), Some("First"));
    }
}
