//! XML entity handling
//!
//! Decoding covers the five predefined entities and numeric character
//! references. Anything else is left in the text untouched. Both directions
//! return `Cow` so the common case of plain text does not allocate.

use memchr::memchr;
use std::borrow::Cow;

/// Decode entity and character references in text or attribute content
#[inline]
pub fn decode_text(input: &str) -> Cow<'_, str> {
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

fn decode_entities(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        result.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = memchr(b';', rest.as_bytes())
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                result.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Decode a single reference body (the part between `&` and `;`)
fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => decode_numeric_entity(entity.strip_prefix('#')?),
    }
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let hex = entity
        .strip_prefix('x')
        .or_else(|| entity.strip_prefix('X'));
    let codepoint = match hex {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.parse::<u32>().ok()?,
    };
    if !is_valid_xml_char(codepoint) {
        return None;
    }
    char::from_u32(codepoint)
}

/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}

/// Escape the five XML-reserved characters for text output
pub fn encode_text(input: &str) -> Cow<'_, str> {
    encode(input, false)
}

/// Escape for attribute output: the five reserved characters plus tab,
/// newline and carriage return, which a parser would otherwise normalize
/// to spaces
pub fn encode_attribute(input: &str) -> Cow<'_, str> {
    encode(input, true)
}

fn encode(input: &str, attribute: bool) -> Cow<'_, str> {
    let needs_escape = |b: u8| {
        matches!(b, b'<' | b'>' | b'&' | b'"' | b'\'')
            || (attribute && matches!(b, b'\t' | b'\n' | b'\r'))
    };
    if !input.bytes().any(needs_escape) {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            '\t' if attribute => result.push_str("&#9;"),
            '\n' if attribute => result.push_str("&#10;"),
            '\r' if attribute => result.push_str("&#13;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities() {
        let result = decode_text("Hello, World!");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_basic_entities() {
        let result = decode_text("&lt;hello&gt; &amp; &quot;world&quot; &apos;x&apos;");
        assert_eq!(result, "<hello> & \"world\" 'x'");
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode_text("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode_text("&#x1F600;"), "😀");
    }

    #[test]
    fn test_unknown_and_broken_references_kept() {
        assert_eq!(decode_text("&unknown;"), "&unknown;");
        assert_eq!(decode_text("a & b"), "a & b");
        assert_eq!(decode_text("&#0;"), "&#0;");
        assert_eq!(decode_text("&#xZZ;"), "&#xZZ;");
    }

    #[test]
    fn test_encode_text() {
        let result = encode_text("<hello> & \"world\" 'x'");
        assert_eq!(result, "&lt;hello&gt; &amp; &quot;world&quot; &apos;x&apos;");
        assert!(matches!(encode_text("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_encode_attribute_keeps_whitespace_as_references() {
        assert_eq!(encode_attribute("x\ty\nz\r"), "x&#9;y&#10;z&#13;");
        assert_eq!(encode_attribute("a<b"), "a&lt;b");
        assert_eq!(encode_text("x\ty\n"), "x\ty\n");
        assert!(matches!(encode_attribute("plain value"), Cow::Borrowed(_)));
        assert_eq!(decode_text(&encode_attribute("x\ty\nz")), "x\ty\nz");
    }

    #[test]
    fn test_encode_then_decode() {
        let original = "if a < b && c > \"d\" then 'e'";
        assert_eq!(decode_text(&encode_text(original)), original);
    }
}
