//! HTML fragments for the results panel.
//!
//! Only the excerpt, after decode → sanitize → highlight, is inserted as
//! markup. Every other service-provided string is escaped for the context
//! it lands in.

use crate::decode::decode;
use crate::highlight::TermMatcher;
use crate::markup::{AllowList, serialize};
use crate::sanitize::sanitize_tree;
use crate::types::SearchResult;
use askama::Html as HtmlEscaper;
use askama::{MarkupDisplay, Template};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

type SafeMarkup = MarkupDisplay<HtmlEscaper, String>;

/// Characters left unescaped by ECMAScript `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const LOADING_FRAGMENT: &str = "Loading...";

pub const NO_RESULTS_FRAGMENT: &str = "<div class='omni-no-results'>No results found</div>";

pub const TRANSPORT_ERROR_FRAGMENT: &str = "Error: Obsidian is not running or the Omnisearch server is not enabled.\n<br /><a href=\"obsidian://open\">Open Obsidian</a>.";

#[derive(Template)]
#[template(
    source = r#"<div class="omni-result"><a href="{{ uri }}"><h3 class="omni-h3-title"><span>{{ basename }}</span></h3></a><div class="omni-metadata-row"><cite title="{{ path }}">{{ path }}</cite><span class="omni-metrics">({{ matches }} matches, score {{ score }})</span></div><div class="omnisearch-excerpt-container">{{ excerpt|safe }}</div></div>"#,
    ext = "html"
)]
struct ResultCard<'a> {
    uri: String,
    basename: &'a str,
    path: &'a str,
    matches: usize,
    score: String,
    /// Already sanitized and highlighted; inserted without escaping.
    excerpt: SafeMarkup,
}

/// Percent-encode a URI component the way `encodeURIComponent` does.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// The `obsidian://` URI that opens `path` in `vault`.
pub fn open_uri(vault: &str, path: &str) -> String {
    format!(
        "obsidian://open?vault={}&file={}",
        encode_component(vault),
        encode_component(path)
    )
}

/// Format a score with two decimals like ECMAScript `toFixed(2)`.
///
/// Exact ties round away from zero (`0.125` gives `0.13`) and negative
/// zero prints as `0.00`. Every other value formats as `{:.2}` does.
pub fn format_score(score: f64) -> String {
    if score == 0.0 {
        return "0.00".to_string();
    }
    // A two-decimal tie is an odd multiple of 1/8; scaling by 8 is exact.
    let eighths = score.abs() * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 && eighths < 2f64.powi(50) {
        let hundredths = (eighths as u64 * 25 + 1) / 2;
        let sign = if score < 0.0 { "-" } else { "" };
        return format!("{sign}{}.{:02}", hundredths / 100, hundredths % 100);
    }
    format!("{:.2}", score)
}

/// Run the excerpt through the full content-safety pipeline.
///
/// Decoding always precedes sanitization, and highlighting always follows
/// it on the same tree, so the markup is parsed once.
pub fn excerpt_html<S: AsRef<str>>(excerpt: &str, words: &[S]) -> String {
    let nodes = sanitize_tree(&decode(excerpt), AllowList::standard());
    match TermMatcher::new(words) {
        Some(matcher) => serialize(&matcher.mark_nodes(nodes)),
        None => serialize(&nodes),
    }
}

/// Render one result card.
///
/// Basename, path and URI go through the template's HTML escaping; only the
/// excerpt pipeline output is inserted as markup.
pub fn render_result(result: &SearchResult) -> String {
    let card = ResultCard {
        uri: open_uri(&result.vault, &result.path),
        basename: &result.basename,
        path: &result.path,
        matches: result.matches.len(),
        score: format_score(result.score),
        excerpt: MarkupDisplay::new_safe(
            excerpt_html(&result.excerpt, &result.found_words),
            HtmlEscaper,
        ),
    };
    card.render().unwrap_or_else(|e| {
        tracing::error!(path = %result.path, "Failed to render result card: {}", e);
        String::new()
    })
}

/// Render a processed result set, or the "no results" fragment when empty.
pub fn render_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS_FRAGMENT.to_string();
    }
    results.iter().map(render_result).collect()
}
