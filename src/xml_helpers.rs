//! Shared XML attribute parsing utilities for XLSX parsing.
//!
//! All functions handle entity unescaping and UTF-8 conversion safely and
//! return `None` rather than failing on malformed values.

use quick_xml::events::BytesStart;

/// Extract a string attribute value by key, with entities unescaped.
///
/// Returns `None` if the attribute is missing or malformed.
pub fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Extract a string attribute by local name (ignoring namespace prefix).
pub fn attr_string_local(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Extract a `usize` attribute value by key.
pub fn attr_usize(e: &BytesStart, key: &[u8]) -> Option<usize> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

/// Extract a `u32` attribute value by key.
pub fn attr_u32(e: &BytesStart, key: &[u8]) -> Option<u32> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

/// Extract a `u8` attribute value by key.
pub fn attr_u8(e: &BytesStart, key: &[u8]) -> Option<u8> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

/// Extract an `f64` attribute value by key.
pub fn attr_f64(e: &BytesStart, key: &[u8]) -> Option<f64> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

/// Extract a boolean attribute value by key.
///
/// Returns `None` if missing. Recognizes `"1"`, `"true"` as true; anything else as false.
pub fn attr_bool(e: &BytesStart, key: &[u8]) -> Option<bool> {
    attr_string(e, key).map(|s| matches!(s.as_str(), "1" | "true"))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    fn make_start(xml: &str) -> BytesStart<'_> {
        // Strip < and > / /> to get just the tag content
        let content = xml
            .trim_start_matches('<')
            .trim_end_matches('>')
            .trim_end_matches('/')
            .trim_end();
        BytesStart::from_content(content, content.find(' ').unwrap_or(content.len()))
    }

    #[test]
    fn test_attr_string() {
        let e = make_start(r#"<sheet name="P&amp;L" />"#);
        assert_eq!(attr_string(&e, b"name"), Some("P&L".to_string()));
        assert_eq!(attr_string(&e, b"missing"), None);
    }

    #[test]
    fn test_attr_string_local() {
        let e = make_start(r#"<sheet r:id="rId3" />"#);
        assert_eq!(attr_string_local(&e, b"id"), Some("rId3".to_string()));
        assert_eq!(attr_string(&e, b"id"), None);
    }

    #[test]
    fn test_numeric_attrs() {
        let e = make_start(r#"<row r="42" outlineLevel="2" ht="20.5" s="x" />"#);
        assert_eq!(attr_usize(&e, b"r"), Some(42));
        assert_eq!(attr_u8(&e, b"outlineLevel"), Some(2));
        assert_eq!(attr_f64(&e, b"ht"), Some(20.5));
        assert_eq!(attr_u32(&e, b"s"), None);
    }

    #[test]
    fn test_attr_bool() {
        let e = make_start(r#"<row a="1" b="0" c="true" d="false" />"#);
        assert_eq!(attr_bool(&e, b"a"), Some(true));
        assert_eq!(attr_bool(&e, b"b"), Some(false));
        assert_eq!(attr_bool(&e, b"c"), Some(true));
        assert_eq!(attr_bool(&e, b"d"), Some(false));
        assert_eq!(attr_bool(&e, b"missing"), None);
    }
}
