//! Job posting records emitted by the crawler.

use serde::{Deserialize, Serialize};

use super::salary::{SalaryInfo, SalaryInterval};

/// Fixed origin tag written on every output record.
pub const SOURCE_TAG: &str = "weworkremotely.com";

/// Normalized job posting extracted from a detail page.
///
/// Built once through [`JobRecordBuilder`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: Option<String>,
    pub company: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub date_posted: Option<String>,
    pub description_html: Option<String>,
    pub description_text: Option<String>,
    pub salary_text: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_currency: Option<String>,
    pub salary_interval: Option<SalaryInterval>,
    pub url: String,
    pub source: String,
}

/// Record pushed in link-only mode, when detail pages are never visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub url: String,
    pub source: String,
}

impl LinkRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: SOURCE_TAG.to_string(),
        }
    }
}

/// Anything the crawler hands to a sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputRecord {
    Job(JobRecord),
    Link(LinkRecord),
}

impl OutputRecord {
    pub fn url(&self) -> &str {
        match self {
            Self::Job(job) => &job.url,
            Self::Link(link) => &link.url,
        }
    }

    pub fn as_job(&self) -> Option<&JobRecord> {
        match self {
            Self::Job(job) => Some(job),
            Self::Link(_) => None,
        }
    }
}

/// Accumulates field values from several extraction passes.
///
/// Setters ignore empty or whitespace-only values so an earlier, better
/// source is never overwritten by a blank later one.
#[derive(Debug, Clone, Default)]
pub struct JobRecordBuilder {
    title: Option<String>,
    company: Option<String>,
    category: Option<String>,
    location: Option<String>,
    job_type: Option<String>,
    date_posted: Option<String>,
    description_html: Option<String>,
    description_text: Option<String>,
    salary: SalaryInfo,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl JobRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, value: Option<String>) -> Self {
        self.title = non_empty(value);
        self
    }

    pub fn company(mut self, value: Option<String>) -> Self {
        self.company = non_empty(value);
        self
    }

    pub fn category(mut self, value: Option<String>) -> Self {
        self.category = non_empty(value);
        self
    }

    pub fn location(mut self, value: Option<String>) -> Self {
        self.location = non_empty(value);
        self
    }

    pub fn job_type(mut self, value: Option<String>) -> Self {
        self.job_type = non_empty(value);
        self
    }

    pub fn date_posted(mut self, value: Option<String>) -> Self {
        self.date_posted = non_empty(value);
        self
    }

    pub fn description(mut self, html: Option<String>, text: Option<String>) -> Self {
        self.description_html = non_empty(html);
        self.description_text = non_empty(text);
        self
    }

    pub fn salary(mut self, salary: SalaryInfo) -> Self {
        self.salary = salary;
        self
    }

    /// Finalize into an immutable record for `url`.
    pub fn build(self, url: impl Into<String>) -> JobRecord {
        JobRecord {
            title: self.title,
            company: self.company,
            category: self.category,
            location: self.location,
            job_type: self.job_type,
            date_posted: self.date_posted,
            description_html: self.description_html,
            description_text: self.description_text,
            salary_text: self.salary.text,
            salary_min: self.salary.min,
            salary_max: self.salary.max,
            salary_currency: self.salary.currency,
            salary_interval: self.salary.interval,
            url: url.into(),
            source: SOURCE_TAG.to_string(),
        }
    }
}
