//! HTTP client for the Omnisearch plugin's local search endpoint.

use crate::error::SearchError;
use crate::render::encode_component;
use crate::types::SearchResult;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

/// Client for `GET http://localhost:<port>/search?q=<query>`.
#[derive(Debug, Clone)]
pub struct OmnisearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl OmnisearchClient {
    /// Client for the service on `localhost:<port>`.
    pub fn new(port: u16) -> Result<Self, SearchError> {
        Self::with_base_url(format!("http://localhost:{}", port))
    }

    /// Client for an arbitrary base URL (no trailing slash needed).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SearchError> {
        // The service is always local; system proxy settings must not reroute it.
        let http = reqwest::Client::builder().no_proxy().build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// The full request URL for `query`.
    pub fn search_url(&self, query: &str) -> String {
        format!("{}/search?q={}", self.base_url, encode_component(query))
    }

    /// Query the service.
    ///
    /// Unreachable services and non-success statuses are errors. A response
    /// body that cannot be understood is treated as an empty result set.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let url = self.search_url(query);
        tracing::debug!(%url, "Querying Omnisearch");

        let response = self
            .http
            .get(&url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }

        let body = response.text().await?;
        Ok(parse_results(&body))
    }
}

/// Parse a service response body, recovering from anything malformed.
///
/// A body that is not a JSON array yields no results; array entries that are
/// not objects are skipped.
pub fn parse_results(body: &str) -> Vec<SearchResult> {
    let items = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "Expected a JSON array of results");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!("Malformed search response: {}", e);
            return Vec::new();
        }
    };

    let total = items.len();
    let results: Vec<SearchResult> = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if results.len() < total {
        tracing::warn!(skipped = total - results.len(), "Skipped malformed result entries");
    }
    results
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("cat", "http://localhost:51361/search?q=cat")]
    #[case("two words", "http://localhost:51361/search?q=two%20words")]
    #[case("a&b=c", "http://localhost:51361/search?q=a%26b%3Dc")]
    fn search_url_encodes_query(#[case] query: &str, #[case] expected: &str) {
        let client = OmnisearchClient::new(51361).unwrap();
        check!(client.search_url(query) == expected);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OmnisearchClient::with_base_url("http://127.0.0.1:9/").unwrap();
        check!(client.search_url("x") == "http://127.0.0.1:9/search?q=x");
    }

    #[test]
    fn parses_result_array() {
        let body = r#"[{"basename":"a","score":2},{"basename":"b","score":"1"}]"#;
        let results = parse_results(body);
        check!(results.len() == 2);
        check!(results[0].basename == "a");
        check!(results[1].score == 1.0);
    }

    #[rstest]
    #[case("")]
    #[case("not json")]
    #[case("{\"error\": \"oops\"}")]
    #[case("null")]
    #[case("[1, 2")]
    fn malformed_bodies_are_empty(#[case] body: &str) {
        check!(parse_results(body).is_empty());
    }

    #[test]
    fn non_object_entries_are_skipped() {
        let results = parse_results(r#"[{"basename":"ok"}, 42, "text", null, []]"#);
        check!(results.len() == 1);
        check!(results[0].basename == "ok");
    }
}
