//! Item normalization
//!
//! Converts raw Hacker News items into [`Node`]s, deriving the subject and
//! body the records are written with.

use std::num::IntErrorKind;

use crate::models::{HnItem, HnNode, Node, DELETED};

/// Subjects taken from body text are cut to this many characters
pub const SUBJECT_MAX_CHARS: usize = 80;

/// Normalize a raw item into a node
pub fn normalize_item(item: HnItem) -> Node {
    let subject = derive_subject(&item);
    let body = derive_body(&item);
    Node::HackerNews(HnNode::new(item, subject, body))
}

/// Title if present, else the head of the text on a single line
fn derive_subject(item: &HnItem) -> String {
    if item.deleted {
        return DELETED.to_string();
    }

    let subject = if item.title.is_empty() {
        item.text
            .chars()
            .take(SUBJECT_MAX_CHARS)
            .collect::<String>()
            .replace('\n', " ")
    } else {
        item.title.clone()
    };

    html_unescape(&subject)
}

/// Text if present, else the story URL
fn derive_body(item: &HnItem) -> String {
    let body = if item.text.is_empty() {
        &item.url
    } else {
        &item.text
    };

    html_unescape(body).replace("<p>", "\n\n")
}

/// Decode HTML character references
///
/// Handles the named entities Hacker News emits plus decimal and hex
/// numeric references. Anything unrecognised is left verbatim.
pub fn html_unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        match rest.find(';').and_then(|end| {
            decode_entity(&rest[1..end]).map(|decoded| (decoded, end))
        }) {
            Some((decoded, end)) => {
                out.push(decoded);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Code points 0x80..=0x9F as windows-1252 reads them
const WINDOWS_1252: [char; 32] = [
    '\u{20ac}', '\u{81}', '\u{201a}', '\u{192}', '\u{201e}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2c6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8d}', '\u{17d}', '\u{8f}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201c}', '\u{201d}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2dc}', '\u{2122}', '\u{161}', '\u{203a}', '\u{153}', '\u{9d}', '\u{17e}', '\u{178}',
];

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        return decode_numeric(num);
    }

    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "copy" => '\u{a9}',
        "euro" => '\u{20ac}',
        _ => return None,
    };
    Some(c)
}

/// Numeric reference, with the HTML5 fixups for unusable code points
fn decode_numeric(num: &str) -> Option<char> {
    let (digits, radix) = match num.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (num, 10),
    };
    if digits.starts_with('+') {
        return None;
    }
    let code = match u32::from_str_radix(digits, radix) {
        Ok(code) => code,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => u32::MAX,
        Err(_) => return None,
    };

    let c = match code {
        0x80..=0x9f => WINDOWS_1252[(code - 0x80) as usize],
        _ => char::from_u32(code)
            .filter(|&c| c != '\0')
            .unwrap_or(char::REPLACEMENT_CHARACTER),
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, text: &str, url: &str) -> HnItem {
        HnItem {
            id: 1,
            kind: "comment".to_string(),
            title: title.to_string(),
            text: text.to_string(),
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_subject_prefers_title() {
        let node = normalize_item(item("Show HN: &quot;x&quot;", "ignored", ""));
        assert_eq!(node.subject(), "Show HN: \"x\"");
    }

    #[test]
    fn test_subject_truncated_by_chars() {
        let text = "<p>hello world>".repeat(10);
        let node = normalize_item(item("", &text, ""));

        let expected: String = text.chars().take(80).collect();
        assert_eq!(node.subject(), expected);
        assert_eq!(node.subject().chars().count(), 80);
    }

    #[test]
    fn test_subject_counts_code_points_not_bytes() {
        let text = "é".repeat(100);
        let node = normalize_item(item("", &text, ""));
        assert_eq!(node.subject(), "é".repeat(80));
    }

    #[test]
    fn test_subject_collapses_newlines() {
        let node = normalize_item(item("", "line one\nline two", ""));
        assert_eq!(node.subject(), "line one line two");
    }

    #[test]
    fn test_body_paragraphs() {
        let node = normalize_item(item("", "first<p>second &amp; third", ""));
        assert_eq!(node.body(), "first\n\nsecond & third");
    }

    #[test]
    fn test_body_falls_back_to_url() {
        let node = normalize_item(item("Link", "", "https://example.com/a?b=1&amp;c=2"));
        assert_eq!(node.body(), "https://example.com/a?b=1&c=2");
    }

    #[test]
    fn test_escaped_paragraph_markup_becomes_break() {
        // unescaping happens first, so an escaped <p> also becomes a break
        let node = normalize_item(item("", "a&lt;p&gt;b", ""));
        assert_eq!(node.body(), "a\n\nb");
    }

    #[test]
    fn test_html_unescape_numeric() {
        assert_eq!(html_unescape("it&#x27;s a&#x2F;b &#39;q&#39;"), "it's a/b 'q'");
    }

    #[test]
    fn test_html_unescape_unusable_code_points() {
        assert_eq!(html_unescape("a&#0;b"), "a\u{fffd}b");
        assert_eq!(html_unescape("&#xD800;&#xdfff;"), "\u{fffd}\u{fffd}");
        assert_eq!(html_unescape("&#x110000;&#99999999999;"), "\u{fffd}\u{fffd}");
    }

    #[test]
    fn test_html_unescape_windows_1252_range() {
        assert_eq!(html_unescape("&#x80;5 &#150; &#x9F;"), "\u{20ac}5 \u{2013} \u{178}");
        assert_eq!(html_unescape("&#x81;"), "\u{81}");
    }

    #[test]
    fn test_html_unescape_leaves_unknown() {
        assert_eq!(html_unescape("AT&T &bogus; & done"), "AT&T &bogus; & done");
    }
}
