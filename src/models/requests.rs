//! Request DTOs for the HTTP surface
//!
//! Query-string shapes and input validation shared by the handlers.

use serde::Deserialize;

use crate::models::ChartRange;

/// Longest accepted symbol or keyword string
const MAX_INPUT_LEN: usize = 64;

/// Query for symbol search (`?keywords=`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keywords: String,
}

impl SearchQuery {
    /// Returns the trimmed keywords, or an error message if unusable.
    pub fn validate(&self) -> Result<&str, String> {
        validate_input("Keywords", &self.keywords)
    }
}

/// Query for daily charts (`?range=`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub range: Option<String>,
}

impl RangeQuery {
    /// Requested range; absent or unknown values mean one month.
    pub fn chart_range(&self) -> ChartRange {
        self.range
            .as_deref()
            .map(ChartRange::parse)
            .unwrap_or_default()
    }
}

/// Validates a ticker symbol path segment, returning it upper-cased.
pub fn validate_symbol(symbol: &str) -> Result<String, String> {
    validate_input("Symbol", symbol).map(str::to_ascii_uppercase)
}

fn validate_input<'a>(label: &str, value: &'a str) -> Result<&'a str, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{} cannot be empty", label));
    }
    if value.len() > MAX_INPUT_LEN {
        return Err(format!(
            "{} exceeds maximum length of {} characters",
            label, MAX_INPUT_LEN
        ));
    }
    Ok(value)
}
