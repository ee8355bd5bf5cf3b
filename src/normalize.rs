//! Extraction and normalization of the model's free-form output.
//!
//! The model is asked for a JSON array but answers in free text, often wrapped
//! in prose or a fenced code block. This module is the only place that sees that
//! raw text: [`parse_articles`] pulls the array out and [`normalize`] turns each
//! loosely-typed record into an [`Article`], substituting defaults for anything
//! missing or malformed instead of rejecting the record.

use crate::error::FetchError;
use crate::models::{Article, Category, Language, Region, Sentiment};
use crate::utils::{looks_truncated, truncate_for_log};
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

/// Placeholder for a record without a source name.
pub const DEFAULT_SOURCE: &str = "News Source";
/// Placeholder anchor for a record without a URL.
pub const DEFAULT_URL: &str = "#";

// First '[' through the last ']', across newlines.
static ARRAY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*\]").expect("valid regex"));

/// Locate the bracket-delimited array literal in `text`.
pub fn extract_array(text: &str) -> Result<&str, FetchError> {
    ARRAY_PATTERN
        .find(text)
        .map(|m| m.as_str())
        .ok_or(FetchError::MissingArray)
}

/// Extract and parse the array of raw records from model output.
///
/// # Errors
///
/// - [`FetchError::MissingArray`] when no `[...]` span exists
/// - [`FetchError::Parse`] when the span is not valid JSON or not an array
pub fn parse_articles(text: &str) -> Result<Vec<Value>, FetchError> {
    let raw = extract_array(text)?;
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => {
            debug!(count = items.len(), "Extracted raw records");
            Ok(items)
        }
        Ok(other) => Err(FetchError::Parse(format!(
            "expected a JSON array, found {}",
            json_kind(&other)
        ))),
        Err(e) => {
            if looks_truncated(&e) {
                warn!(error = %e, "Model output ends mid-array; response looks truncated");
            } else {
                warn!(
                    error = %e,
                    response_preview = %truncate_for_log(raw, 300),
                    "Model returned non-conforming JSON"
                );
            }
            Err(FetchError::Parse(e.to_string()))
        }
    }
}

/// Number of records that are JSON objects.
///
/// Zero for a non-empty batch usually means the regex matched something other
/// than the article array, such as a `[1]` citation marker in prose.
pub fn object_record_count(raw_items: &[Value]) -> usize {
    raw_items.iter().filter(|item| item.is_object()).count()
}

/// Normalize raw records into articles for one filter triple.
///
/// Every record yields exactly one article, in input order. Missing or
/// malformed fields get defaults instead of rejecting the record.
///
/// # Arguments
///
/// * `raw_items` - Records returned by [`parse_articles`]
/// * `category`, `language`, `region` - The filter triple the records were fetched for
/// * `now` - Supplies the display timestamp and the time component of each id
///
/// # Returns
///
/// One [`Article`] per record, with ids unique within the batch.
pub fn normalize(
    raw_items: &[Value],
    category: Category,
    language: &Language,
    region: &Region,
    now: DateTime<Local>,
) -> Vec<Article> {
    let millis = now.timestamp_millis();
    let timestamp = now.format("%H:%M:%S").to_string();

    raw_items
        .iter()
        .enumerate()
        .map(|(index, item)| Article {
            id: format!("{}-{}-{}-{}-{}", category, region.code, language.code, index, millis),
            title: item.get("title").map(text_of).unwrap_or_default(),
            summary: summary_of(item.get("summary")),
            sentiment: Sentiment::from_label(item.get("sentiment").and_then(Value::as_str)),
            category,
            source: non_empty_or(item.get("source"), DEFAULT_SOURCE),
            url: non_empty_or(item.get("url"), DEFAULT_URL),
            timestamp: timestamp.clone(),
        })
        .collect()
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn summary_of(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(points)) => points.iter().map(text_of).collect(),
        _ => Vec::new(),
    }
}

fn non_empty_or(value: Option<&Value>, default: &str) -> String {
    let text = value.map(text_of).unwrap_or_default();
    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
