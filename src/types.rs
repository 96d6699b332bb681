//! Result records returned by the Omnisearch HTTP service.
//!
//! The service is an external collaborator, so every field is decoded
//! leniently: a missing or mistyped field falls back to its empty value
//! instead of rejecting the whole record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single matched note, as received from `GET /search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResult {
    #[serde(deserialize_with = "lenient_string")]
    pub vault: String,
    #[serde(deserialize_with = "lenient_string")]
    pub path: String,
    #[serde(deserialize_with = "lenient_string")]
    pub basename: String,
    /// Untrusted excerpt text; may carry encoded markup.
    #[serde(deserialize_with = "lenient_string")]
    pub excerpt: String,
    #[serde(deserialize_with = "lenient_score")]
    pub score: f64,
    #[serde(deserialize_with = "lenient_words")]
    pub found_words: Vec<String>,
    /// Opaque match records; only their count is displayed.
    #[serde(deserialize_with = "lenient_array")]
    pub matches: Vec<Value>,
}

impl SearchResult {
    /// Shorthand used by tests and callers that only care about ranking.
    pub fn with_score(score: f64) -> Self {
        Self {
            score,
            ..Self::default()
        }
    }
}

/// Interpret any JSON value as a relevance score.
///
/// Numbers are taken as-is, numeric strings are parsed, and everything else
/// (including non-finite results) counts as zero.
pub fn score_from_value(value: &Value) -> f64 {
    let score = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if score.is_finite() { score } else { 0.0 }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Value::deserialize(deserializer).map(|v| score_from_value(&v))
}

fn lenient_words<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_array<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}
