//! Salary text parsing.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{SalaryInfo, SalaryInterval};

/// Minimum amount treated as an annual figure when no interval is stated.
const ANNUAL_INFERENCE_THRESHOLD: f64 = 1000.0;

/// A code may run straight into the amount, as in `USD80,000`.
static CURRENCY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(USD|EUR|GBP|CAD|AUD|CHF|JPY)(?:\b|\d)").unwrap());

/// Symbol to ISO code, checked after explicit codes.
const CURRENCY_SYMBOLS: &[(char, &str)] = &[('€', "EUR"), ('£', "GBP"), ('¥', "JPY"), ('$', "USD")];

/// Interval cues in priority order; the first matching interval wins.
static INTERVAL_PATTERNS: LazyLock<Vec<(Regex, SalaryInterval)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)\b(?:per|a|an)\s+(?:year|yr|annum)\b|/\s*(?:year|yr)\b|\byearly\b|\bannual(?:ly)?\b").unwrap(),
            SalaryInterval::Year,
        ),
        (
            Regex::new(r"(?i)\b(?:per|a)\s+month\b|/\s*(?:month|mo)\b|\bmonthly\b").unwrap(),
            SalaryInterval::Month,
        ),
        (
            Regex::new(r"(?i)\b(?:per|a)\s+week\b|/\s*(?:week|wk)\b|\bweekly\b").unwrap(),
            SalaryInterval::Week,
        ),
        (
            Regex::new(r"(?i)\b(?:per|a)\s+day\b|/\s*day\b|\bdaily\b").unwrap(),
            SalaryInterval::Day,
        ),
        (
            Regex::new(r"(?i)\b(?:per|an?)\s+(?:hour|hr)\b|/\s*(?:hour|hr)\b|\bhourly\b").unwrap(),
            SalaryInterval::Hour,
        ),
    ]
});

/// Digit groups with optional separators and an optional `k` multiplier.
static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)*)(\s?[kK]\b)?").unwrap());

/// Dotted thousands such as `80.000` (no decimals).
static DOTTED_THOUSANDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(?:\.\d{3})+$").unwrap());

/// Parse free-form salary text.
///
/// Currency comes from an explicit code, else a symbol. The first interval
/// cue in year/month/week/day/hour order wins; without one, a minimum above
/// 1000 is assumed annual. This guess misfires for monthly figures in
/// low-valued currencies. Only the first two amounts are considered.
pub fn parse_salary(text: Option<&str>) -> SalaryInfo {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return SalaryInfo::default();
    };

    let amounts = parse_amounts(text);
    let (min, max) = match amounts.as_slice() {
        [] => (None, None),
        [only] => (Some(*only), Some(*only)),
        [a, b, ..] => (Some(a.min(*b)), Some(a.max(*b))),
    };

    let interval = detect_interval(text).or_else(|| {
        min.filter(|m| *m > ANNUAL_INFERENCE_THRESHOLD)
            .map(|_| SalaryInterval::Year)
    });

    SalaryInfo {
        text: Some(text.to_string()),
        min,
        max,
        currency: detect_currency(text),
        interval,
    }
}

/// Detect the ISO currency code for a salary string.
pub fn detect_currency(text: &str) -> Option<String> {
    if let Some(caps) = CURRENCY_CODE.captures(text) {
        return Some(caps[1].to_uppercase());
    }
    CURRENCY_SYMBOLS
        .iter()
        .find(|(symbol, _)| text.contains(*symbol))
        .map(|(_, code)| code.to_string())
}

/// Detect the pay period cue, if any.
pub fn detect_interval(text: &str) -> Option<SalaryInterval> {
    INTERVAL_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, interval)| *interval)
}

fn parse_amounts(text: &str) -> Vec<f64> {
    AMOUNT
        .captures_iter(text)
        .filter_map(|caps| {
            let raw = caps.get(1)?.as_str();
            let mut value = parse_number(raw)?;
            if caps.get(2).is_some() {
                value *= 1000.0;
            }
            Some(value)
        })
        .collect()
}

fn parse_number(raw: &str) -> Option<f64> {
    let without_commas = raw.replace(',', "");
    let normalized = if DOTTED_THOUSANDS.is_match(raw) {
        without_commas.replace('.', "")
    } else {
        without_commas
    };
    // More than one remaining dot is not a number we understand.
    if normalized.matches('.').count() > 1 {
        return None;
    }
    normalized.parse().ok()
}
