//! Search-term highlighting over sanitized markup.
//!
//! Terms are matched only against text nodes of the sanitized tree, so a
//! term can never land inside a tag, an attribute, or a character
//! reference. The input is re-sanitized before matching, which is a no-op
//! for sanitizer output and keeps the trust boundary intact for anything
//! else.

use crate::markup::{AllowList, MarkupNode, serialize};
use crate::sanitize::sanitize_tree;
use ahash::AHashSet;
use regex::Regex;

/// A compiled whole-word, case-insensitive matcher for a set of terms.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    regex: Regex,
}

impl TermMatcher {
    /// Build a matcher, or `None` when there is nothing to match.
    ///
    /// Terms are deduplicated and ordered longest first so that a term which
    /// is a prefix of another ("cat" / "category") never claims part of the
    /// longer word.
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Option<Self> {
        let mut seen = AHashSet::new();
        let mut unique: Vec<&str> = terms
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| !t.trim().is_empty())
            .filter(|t| seen.insert(*t))
            .collect();
        if unique.is_empty() {
            return None;
        }
        unique.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));

        let alternation = unique
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        match Regex::new(&format!(r"(?i)\b(?:{alternation})\b")) {
            Ok(regex) => Some(Self { regex }),
            Err(e) => {
                tracing::warn!(terms = unique.len(), "Skipping highlight, matcher failed to build: {}", e);
                None
            }
        }
    }

    /// Split `text` into plain runs and highlight markers.
    fn mark_text(&self, text: &str, out: &mut Vec<MarkupNode>) {
        let mut last = 0;
        for found in self.regex.find_iter(text) {
            if found.start() > last {
                out.push(MarkupNode::text(&text[last..found.start()]));
            }
            out.push(MarkupNode::highlight(found.as_str()));
            last = found.end();
        }
        if last < text.len() {
            out.push(MarkupNode::text(&text[last..]));
        }
    }

    /// Highlight every text node of a sanitized tree, leaving its elements in place.
    pub fn mark_nodes(&self, nodes: Vec<MarkupNode>) -> Vec<MarkupNode> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                MarkupNode::Text(text) => self.mark_text(&text, &mut out),
                // Already highlighted; don't nest markers.
                MarkupNode::Element(element) if element.is_highlight() => {
                    out.push(MarkupNode::Element(element));
                }
                MarkupNode::Element(element) => {
                    let tag = element.tag().to_string();
                    let children = self.mark_nodes(element.into_children());
                    out.push(MarkupNode::element(&tag, children));
                }
            }
        }
        out
    }
}

/// Wrap every whole-word, case-insensitive occurrence of `terms` in `markup`
/// with a highlight marker.
///
/// `markup` is expected to be sanitizer output. With no usable terms the
/// input is returned unchanged.
///
/// # Examples
///
/// ```
/// use omnisearch_inject::highlight;
///
/// assert_eq!(
///     highlight("The cat sat on the catalog", &["cat"]),
///     r#"The <mark class="omnisearch-mark">cat</mark> sat on the catalog"#,
/// );
/// ```
pub fn highlight<S: AsRef<str>>(markup: &str, terms: &[S]) -> String {
    highlight_with(markup, terms, AllowList::standard())
}

/// [`highlight`] for markup sanitized under `allow` instead of the standard list.
///
/// The re-parse keeps exactly the elements `allow` admits, so output of
/// [`crate::sanitize`] with the same list keeps its structure.
pub fn highlight_with<S: AsRef<str>>(markup: &str, terms: &[S], allow: &AllowList) -> String {
    let Some(matcher) = TermMatcher::new(terms) else {
        return markup.to_string();
    };
    let nodes = sanitize_tree(markup, allow);
    serialize(&matcher.mark_nodes(nodes))
}
