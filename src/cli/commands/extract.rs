//! Offline extraction commands.

use std::path::Path;

use anyhow::Context;

use jobacquire::extract::extract_job_from_html;
use jobacquire::utils::parse_salary;

pub fn cmd_extract(file: &Path, url: &str, category: Option<&str>) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let job = extract_job_from_html(url, &html, category)?;
    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}

pub fn cmd_salary(text: &str) -> anyhow::Result<()> {
    let salary = parse_salary(Some(text));
    println!("{}", serde_json::to_string_pretty(&salary)?);
    Ok(())
}
