//! Excerpt decoding.
//!
//! Excerpts arrive with their markup encoded as character references
//! (`&lt;b&gt;`) and occasionally as literal `\uXXXX` escape sequences.
//! Decoding turns both into literal characters in a single pass; nothing
//! is interpreted as markup here. The result must go through
//! [`crate::sanitize`] before it is displayed.

use regex::{Captures, Regex};
use scraper::Html;
use std::fmt::Write as _;
use std::sync::LazyLock;

/// A `\uXXXX` escape, optionally followed by a second one forming a surrogate pair.
static UNICODE_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\u([0-9a-fA-F]{4})(?:\\u([0-9a-fA-F]{4}))?")
        .expect("unicode escape pattern is valid")
});

const HIGH_SURROGATES: std::ops::RangeInclusive<u32> = 0xD800..=0xDBFF;
const LOW_SURROGATES: std::ops::RangeInclusive<u32> = 0xDC00..=0xDFFF;

/// Decode character references and `\uXXXX` escapes into literal text.
///
/// The input is parsed once as the contents of a `<textarea>` (an RCDATA
/// element), so references are expanded but no tags are recognised and no
/// content is executed. Escape sequences are rewritten to numeric character
/// references beforehand so that both encodings are expanded by that same
/// single pass: `\u0026lt;` decodes to `&lt;`, not to `<`.
///
/// # Examples
///
/// ```
/// use omnisearch_inject::decode;
///
/// assert_eq!(decode("&lt;b&gt;bold&lt;/b&gt; \\u0026 more"), "<b>bold</b> & more");
/// assert_eq!(decode("&amp;lt;"), "&lt;");
/// ```
pub fn decode(raw: &str) -> String {
    let escaped = UNICODE_ESCAPE.replace_all(raw, |caps: &Captures<'_>| {
        let first = hex_unit(&caps[1]);
        let second = caps.get(2).map(|m| hex_unit(m.as_str()));
        let mut out = String::new();
        match second {
            Some(low) if HIGH_SURROGATES.contains(&first) && LOW_SURROGATES.contains(&low) => {
                let combined = 0x10000 + ((first - 0xD800) << 10) + (low - 0xDC00);
                push_reference(&mut out, combined);
            }
            Some(other) => {
                push_reference(&mut out, first);
                push_reference(&mut out, other);
            }
            None => push_reference(&mut out, first),
        }
        out
    });

    // `<` is literal inside RCDATA anyway; escaping it keeps a stray
    // `</textarea>` in the payload from closing the wrapper early.
    let rcdata = escaped.replace('<', "&lt;");

    // The parser drops one newline directly after `<textarea>`, so supply it.
    let wrapped = format!("<textarea>\n{rcdata}</textarea>");
    Html::parse_fragment(&wrapped).root_element().text().collect()
}

fn hex_unit(digits: &str) -> u32 {
    u32::from_str_radix(digits, 16).unwrap_or(0xFFFD)
}

/// Append a numeric character reference, replacing unpaired surrogates.
fn push_reference(out: &mut String, code_point: u32) {
    let code_point = if HIGH_SURROGATES.contains(&code_point) || LOW_SURROGATES.contains(&code_point)
    {
        0xFFFD
    } else {
        code_point
    };
    let _ = write!(out, "&#x{:X};", code_point);
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("plain text", "plain text")]
    #[case("&lt;mark&gt;hit&lt;/mark&gt;", "<mark>hit</mark>")]
    #[case("caf&eacute; &amp; cr&#232;me", "café & crème")]
    #[case("&#x3C;br&#x3E;", "<br>")]
    #[case(r"<b>bold</b>", "<b>bold</b>")]
    #[case(r"smile \uD83D\uDE00", "smile \u{1F600}")]
    #[case(r"lone \uD83D here", "lone \u{FFFD} here")]
    #[case(r"\u0041\u0042", "AB")]
    #[case("5 &lt 6", "5 < 6")]
    #[case("AT&T & co", "AT&T & co")]
    fn decodes_references_and_escapes(#[case] raw: &str, #[case] expected: &str) {
        check!(decode(raw) == expected);
    }

    #[test]
    fn literal_markup_passes_through_untouched() {
        check!(decode("<b>already</b> literal") == "<b>already</b> literal");
    }

    #[rstest]
    #[case("&amp;lt;script&amp;gt;", "&lt;script&gt;")]
    #[case(r"\u0026lt;script\u0026gt;", "&lt;script&gt;")]
    #[case("&#38;#60;", "&#60;")]
    fn decodes_exactly_once(#[case] raw: &str, #[case] expected: &str) {
        check!(decode(raw) == expected);
    }

    #[test]
    fn textarea_close_tag_cannot_escape_wrapper() {
        let raw = "a</textarea><script>alert(1)</script>b";
        check!(decode(raw) == raw);
    }

    #[test]
    fn leading_newline_is_preserved() {
        check!(decode("\nfirst line") == "\nfirst line");
    }

    #[test]
    fn empty_input() {
        check!(decode("").is_empty());
    }
}
