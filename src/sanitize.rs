//! Allow-list sanitization of decoded excerpt markup.
//!
//! The input is parsed leniently into a real HTML tree and a brand-new
//! output tree is rebuilt from it. Nothing from a source element except its
//! tag name is ever read, so no attribute (handlers, links, styles) can
//! reach the output regardless of how the input is crafted.
//!
//! Disallowed elements are unwrapped: the wrapper disappears and its
//! children are spliced into the parent. Elements whose content is never
//! document text (`script`, `style`, ...) are dropped together with that
//! content.

use crate::markup::{AllowList, MarkupNode, push_text, serialize};
use scraper::{ElementRef, Html, Node};
use std::ops::ControlFlow;

/// Maximum element nesting visited before sanitization stops.
pub const MAX_DEPTH: usize = 64;

/// Longest markup handed to the parser, in bytes; longer input is cut first.
///
/// Excerpts are a few hundred bytes. Parsing deep unclosed nesting is
/// superlinear, so the nesting limit alone does not bound the work.
pub const MAX_INPUT_BYTES: usize = 16 * 1024;

/// Elements parsed as raw text or inert templates; their text is not excerpt content.
const OPAQUE_TAGS: &[&str] = &[
    "script", "style", "template", "iframe", "noembed", "noframes", "noscript", "xmp",
];

/// Sanitize `markup` against `allow`, returning serialized HTML.
///
/// Never fails: malformed markup yields whatever the lenient parser
/// recovers, and nesting deeper than [`MAX_DEPTH`] truncates the output at
/// the point the limit was hit.
///
/// # Examples
///
/// ```
/// use omnisearch_inject::{AllowList, sanitize};
///
/// let clean = sanitize(r#"<b onclick="x()">hi</b><div>there</div>"#, AllowList::standard());
/// assert_eq!(clean, "<b>hi</b>there");
/// ```
pub fn sanitize(markup: &str, allow: &AllowList) -> String {
    serialize(&sanitize_tree(markup, allow))
}

/// Sanitize `markup` into an output tree without serializing it.
pub fn sanitize_tree(markup: &str, allow: &AllowList) -> Vec<MarkupNode> {
    let fragment = Html::parse_fragment(truncate_input(markup));
    if !fragment.errors.is_empty() {
        tracing::trace!(errors = fragment.errors.len(), "Recovered from malformed excerpt markup");
    }

    let mut output = Vec::new();
    if copy_children(fragment.root_element(), &mut output, allow, 0).is_break() {
        tracing::debug!(max_depth = MAX_DEPTH, "Excerpt nesting limit reached, output truncated");
    }
    output
}

/// Rebuild the children of `source` into `dest`.
///
/// `depth` is the nesting level of `source`'s children. Breaks as soon as
/// an element would exceed [`MAX_DEPTH`]; everything built up to that point
/// is kept.
fn copy_children(
    source: ElementRef<'_>,
    dest: &mut Vec<MarkupNode>,
    allow: &AllowList,
    depth: usize,
) -> ControlFlow<()> {
    for child in source.children() {
        match child.value() {
            Node::Text(text) => push_text(dest, text),
            Node::Element(element) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                if depth >= MAX_DEPTH {
                    return ControlFlow::Break(());
                }

                let tag = element.name();
                if allow.contains(tag) {
                    let mut children = Vec::new();
                    let flow = copy_children(child, &mut children, allow, depth + 1);
                    dest.push(MarkupNode::element(tag, children));
                    if flow.is_break() {
                        return flow;
                    }
                } else if !is_opaque(tag) {
                    let flow = copy_children(child, dest, allow, depth + 1);
                    if flow.is_break() {
                        return flow;
                    }
                }
            }
            // Comments, doctypes and processing instructions carry no excerpt text.
            _ => {}
        }
    }
    ControlFlow::Continue(())
}

/// Cut `markup` to at most [`MAX_INPUT_BYTES`], on a character boundary.
fn truncate_input(markup: &str) -> &str {
    if markup.len() <= MAX_INPUT_BYTES {
        return markup;
    }
    let mut end = MAX_INPUT_BYTES;
    while !markup.is_char_boundary(end) {
        end -= 1;
    }
    tracing::debug!(len = markup.len(), kept = end, "Excerpt markup too long, truncated");
    &markup[..end]
}

fn is_opaque(tag: &str) -> bool {
    OPAQUE_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}
