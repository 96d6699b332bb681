//! Output markup tree, the tag allow-list, and serialization.
//!
//! [`MarkupNode`] trees are only ever built by the sanitizer and the
//! highlighter. Elements carry a tag name and children, never attributes;
//! the single exception is the fixed highlight class, which is derived from
//! the tag name at construction time rather than copied from any input.

use ahash::AHashSet;
use std::sync::LazyLock;

/// Tags kept by the standard allow-list.
pub const DEFAULT_ALLOWED_TAGS: [&str; 8] = ["BR", "MARK", "B", "I", "U", "EM", "STRONG", "CODE"];

/// The tag used to mark highlighted search terms.
pub const HIGHLIGHT_TAG: &str = "mark";

/// The only attribute value that can appear in sanitized output, as
/// `class="omnisearch-mark"` on [`HIGHLIGHT_TAG`] elements.
pub const HIGHLIGHT_CLASS: &str = "omnisearch-mark";

/// Elements that never have children in serialized HTML.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

static STANDARD: LazyLock<AllowList> = LazyLock::new(AllowList::default);

/// Case-insensitive set of tag names that survive sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    /// Upper-cased tag names
    tags: AHashSet<String>,
}

impl AllowList {
    /// Build an allow-list from arbitrary tag names; case is ignored.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(|t| t.as_ref().trim().to_ascii_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// The process-wide excerpt allow-list ([`DEFAULT_ALLOWED_TAGS`]).
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(&tag.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_TAGS)
    }
}

/// A node of a sanitized markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// Raw character data, escaped on serialization.
    Text(String),
    Element(ElementNode),
}

/// An element with no attributes other than the derived highlight class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    tag: String,
    children: Vec<MarkupNode>,
}

impl ElementNode {
    /// Create an element; the tag name is normalised to lowercase.
    pub fn new(tag: &str, children: Vec<MarkupNode>) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            children,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn into_children(self) -> Vec<MarkupNode> {
        self.children
    }

    /// The class token this element is serialized with, if any.
    pub fn class(&self) -> Option<&'static str> {
        self.is_highlight().then_some(HIGHLIGHT_CLASS)
    }

    pub fn is_highlight(&self) -> bool {
        self.tag == HIGHLIGHT_TAG
    }

    fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }
}

impl MarkupNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn element(tag: &str, children: Vec<Self>) -> Self {
        Self::Element(ElementNode::new(tag, children))
    }

    /// A highlight marker wrapping `text`.
    pub fn highlight(text: impl Into<String>) -> Self {
        Self::element(HIGHLIGHT_TAG, vec![Self::text(text)])
    }
}

/// Append text to `nodes`, merging with a trailing text node.
///
/// Splicing dropped wrappers leaves neighbouring text runs; merging them
/// keeps words that were split by a removed tag matchable as one run.
pub fn push_text(nodes: &mut Vec<MarkupNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(MarkupNode::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(MarkupNode::text(text));
    }
}

/// Serialize a node list to HTML.
pub fn serialize(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    write_nodes(&mut out, nodes);
    out
}

fn write_nodes(out: &mut String, nodes: &[MarkupNode]) {
    for node in nodes {
        match node {
            MarkupNode::Text(text) => escape_text_into(out, text),
            MarkupNode::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                if let Some(class) = element.class() {
                    out.push_str(" class=\"");
                    out.push_str(class);
                    out.push('"');
                }
                out.push('>');
                if element.is_void() {
                    continue;
                }
                write_nodes(out, &element.children);
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

/// Escape character data the way an HTML serializer does for text nodes.
fn escape_text_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}
