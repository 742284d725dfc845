//! User agent selection.

pub const USER_AGENT: &str = concat!("jobacquire/", env!("CARGO_PKG_VERSION"), " (job listing crawler)");

/// Browser user agents used in impersonate mode.
pub const IMPERSONATE_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:140.0) Gecko/20100101 Firefox/140.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:140.0) Gecko/20100101 Firefox/140.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.5 Safari/605.1.15",
];

/// Pick a browser agent; varies between runs.
fn browser_user_agent() -> &'static str {
    let index = chrono::Utc::now().timestamp_subsec_nanos() as usize % IMPERSONATE_USER_AGENTS.len();
    IMPERSONATE_USER_AGENTS[index]
}

/// Resolve the configured user agent.
/// - `None` or blank: the crate's own agent
/// - `"impersonate"`: a real browser agent
/// - anything else: used verbatim
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        None | Some("") => USER_AGENT.to_string(),
        Some(value) if value.eq_ignore_ascii_case("impersonate") => {
            browser_user_agent().to_string()
        }
        Some(custom) => custom.to_string(),
    }
}
