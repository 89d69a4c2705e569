//! Push tokenizer with SaxHandler trait
//!
//! Walks the input once and reports structural events to a [`SaxHandler`].
//! The tokenizer is non-validating but checks well-formedness: the first
//! fatal problem is reported through [`SaxHandler::parse_error`] and scanning
//! stops there, so handlers always see a prefix of the event sequence of a
//! well-formed document.
//!
//! ```text
//! bytes ---> Tokenizer ---> SaxHandler (TreeBuilder, EventCollector, ...)
//! ```

use std::borrow::Cow;

use super::entities::decode_text;
use super::scanner::{is_name_start_char, is_xml_whitespace, Scanner};
use crate::error::{ParseError, ParseErrorKind};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// An attribute as reported by the tokenizer, value already decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute<'a> {
    pub name: &'a str,
    pub value: Cow<'a, str>,
}

/// Receiver of tokenizer events
///
/// Text and attribute values arrive entity-decoded. A self-closing tag is
/// reported as `start_element` immediately followed by `end_element`.
pub trait SaxHandler {
    /// Called once before any other event
    fn start_document(&mut self) {}

    fn start_element(&mut self, name: &str, attributes: &[RawAttribute<'_>]);

    /// Character data inside an element. A single text run may arrive in
    /// several calls.
    fn characters(&mut self, text: &str);

    /// Raw content of a CDATA section (excluding `<![CDATA[` and `]]>`)
    fn cdata(&mut self, data: &[u8]);

    fn end_element(&mut self, name: &str);

    /// Called once after the last element when the document was well-formed
    fn end_document(&mut self) {}

    /// Called at most once; no events follow it
    fn parse_error(&mut self, error: &ParseError);

    fn comment(&mut self, _text: &str) {}

    fn processing_instruction(&mut self, _target: &str, _data: Option<&str>) {}
}

/// Single-pass tokenizer over a byte buffer
pub struct Tokenizer<'a> {
    text: &'a str,
    scanner: Scanner<'a>,
    /// Bytes skipped before `text` (a UTF-8 BOM)
    base: usize,
    /// Offset of the first invalid UTF-8 byte, relative to `text`
    utf8_error: Option<usize>,
    /// Names of the currently open elements
    open: Vec<&'a str>,
    seen_root: bool,
    /// Reusable attribute buffer to avoid per-element allocations
    attrs_buf: Vec<RawAttribute<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let (base, body) = match input.strip_prefix(UTF8_BOM) {
            Some(rest) => (UTF8_BOM.len(), rest),
            None => (0, input),
        };

        // Tokenize the longest valid prefix; reaching its end reports the
        // encoding error instead of a truncation error.
        let (text, utf8_error) = match std::str::from_utf8(body) {
            Ok(text) => (text, None),
            Err(e) => {
                let valid = e.valid_up_to();
                let text = std::str::from_utf8(&body[..valid]).unwrap_or_default();
                (text, Some(valid))
            }
        };

        Self {
            text,
            scanner: Scanner::new(text.as_bytes()),
            base,
            utf8_error,
            open: Vec::with_capacity(16),
            seen_root: false,
            attrs_buf: Vec::with_capacity(8), // Most elements have < 8 attrs
        }
    }

    /// Tokenize the whole input, reporting events to `handler`
    ///
    /// The returned error has already been passed to
    /// [`SaxHandler::parse_error`]; callers may ignore it.
    pub fn run<H: SaxHandler>(mut self, handler: &mut H) -> Result<(), ParseError> {
        handler.start_document();
        match self.scan(handler) {
            Ok(()) => {
                handler.end_document();
                Ok(())
            }
            Err(error) => {
                handler.parse_error(&error);
                Err(error)
            }
        }
    }

    fn scan<H: SaxHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        while let Some(b) = self.scanner.peek() {
            if b == b'<' {
                self.scan_markup(handler)?;
            } else {
                self.scan_text(handler)?;
            }
        }

        let end = self.scanner.len();
        if let Some(name) = self.open.last() {
            return Err(self.fail(ParseErrorKind::PrematureEnd((*name).to_string()), end));
        }
        if !self.seen_root {
            return Err(self.fail(ParseErrorKind::NoRootElement, end));
        }
        if let Some(bad) = self.utf8_error {
            return Err(self.fail(ParseErrorKind::InvalidUtf8, bad));
        }
        Ok(())
    }

    /// Build an error for `offset` in `text`. Hitting the end of a truncated
    /// (invalid UTF-8) input is reported as the encoding error.
    fn fail(&self, kind: ParseErrorKind, offset: usize) -> ParseError {
        let (kind, offset) = match self.utf8_error {
            Some(bad) if offset >= self.scanner.len() => (ParseErrorKind::InvalidUtf8, bad),
            _ => (kind, offset),
        };
        let (line, column) = self.scanner.location(offset);
        ParseError {
            kind,
            offset: self.base + offset,
            line,
            column,
        }
    }

    /// Error for content that appears outside the root element
    fn outside_root(&self, offset: usize) -> ParseError {
        let kind = if self.seen_root {
            ParseErrorKind::ExtraContent
        } else {
            ParseErrorKind::ContentOutsideRoot
        };
        self.fail(kind, offset)
    }

    fn scan_text<H: SaxHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();
        let end = self.scanner.find_byte(b'<').unwrap_or(self.scanner.len());
        self.scanner.set_position(end);

        let raw = &self.text[start..end];
        if self.open.is_empty() {
            // Only whitespace may surround the root element
            return match raw.bytes().position(|b| !is_xml_whitespace(b)) {
                Some(i) => Err(self.outside_root(start + i)),
                None => Ok(()),
            };
        }

        handler.characters(&decode_text(raw));
        Ok(())
    }

    fn scan_markup<H: SaxHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();

        match self.scanner.peek_at(1) {
            Some(b'/') => self.scan_end_tag(handler),
            Some(b'?') => self.scan_pi(handler),
            Some(b'!') => {
                if self.scanner.starts_with(b"<!--") {
                    self.scan_comment(handler)
                } else if self.scanner.starts_with(b"<![CDATA[") {
                    self.scan_cdata(handler)
                } else if self.scanner.starts_with(b"<!DOCTYPE") {
                    self.skip_doctype()
                } else {
                    Err(self.fail(ParseErrorKind::MalformedMarkup, start))
                }
            }
            Some(c) if is_name_start_char(c) => self.scan_start_tag(handler),
            Some(_) => Err(self.fail(ParseErrorKind::MalformedStartTag, start)),
            None => Err(self.fail(ParseErrorKind::Unterminated("start tag"), start)),
        }
    }

    fn scan_start_tag<H: SaxHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();
        if self.open.is_empty() && self.seen_root {
            return Err(self.fail(ParseErrorKind::ExtraContent, start));
        }

        self.scanner.advance(1); // '<'
        let name_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return Err(self.fail(ParseErrorKind::MalformedStartTag, start));
        }
        let name = &self.text[name_start..self.scanner.position()];

        self.attrs_buf.clear();
        let is_empty = loop {
            let separated = self.scanner.skip_whitespace() > 0;
            match self.scanner.peek() {
                Some(b'>') => {
                    self.scanner.advance(1);
                    break false;
                }
                Some(b'/') => {
                    if self.scanner.peek_at(1) != Some(b'>') {
                        return Err(self.fail(ParseErrorKind::MalformedStartTag, start));
                    }
                    self.scanner.advance(2);
                    break true;
                }
                Some(c) if is_name_start_char(c) && separated => {
                    let attribute = self.scan_attribute(start)?;
                    self.attrs_buf.push(attribute);
                }
                Some(_) => return Err(self.fail(ParseErrorKind::MalformedStartTag, start)),
                None => return Err(self.fail(ParseErrorKind::Unterminated("start tag"), start)),
            }
        };

        self.seen_root = true;
        handler.start_element(name, &self.attrs_buf);
        if is_empty {
            handler.end_element(name);
        } else {
            self.open.push(name);
        }
        Ok(())
    }

    /// Scan `name = "value"` at the cursor. `tag_start` is used for
    /// truncation errors.
    fn scan_attribute(&mut self, tag_start: usize) -> Result<RawAttribute<'a>, ParseError> {
        let attr_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return Err(self.fail(ParseErrorKind::MalformedAttribute, attr_start));
        }
        let name = &self.text[attr_start..self.scanner.position()];

        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(b'=') {
            return Err(self.fail(ParseErrorKind::MalformedAttribute, attr_start));
        }
        self.scanner.advance(1);
        self.scanner.skip_whitespace();

        let quote = match self.scanner.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(self.fail(ParseErrorKind::MalformedAttribute, attr_start)),
            None => return Err(self.fail(ParseErrorKind::Unterminated("start tag"), tag_start)),
        };
        self.scanner.advance(1);

        let value_start = self.scanner.position();
        let Some(value_end) = self.scanner.find_byte(quote) else {
            return Err(self.fail(ParseErrorKind::Unterminated("start tag"), tag_start));
        };
        self.scanner.set_position(value_end + 1);

        let raw = &self.text[value_start..value_end];
        if raw.contains('<') {
            return Err(self.fail(ParseErrorKind::MalformedAttribute, attr_start));
        }

        Ok(RawAttribute {
            name,
            value: normalize_attribute_value(raw),
        })
    }

    fn scan_end_tag<H: SaxHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();
        self.scanner.advance(2); // "</"

        let name_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return Err(self.fail(ParseErrorKind::MalformedEndTag, start));
        }
        let name = &self.text[name_start..self.scanner.position()];

        self.scanner.skip_whitespace();
        match self.scanner.peek() {
            Some(b'>') => self.scanner.advance(1),
            Some(_) => return Err(self.fail(ParseErrorKind::MalformedEndTag, start)),
            None => return Err(self.fail(ParseErrorKind::Unterminated("end tag"), start)),
        }

        match self.open.pop() {
            Some(open) if open == name => {}
            Some(open) => {
                let kind = ParseErrorKind::TagMismatch {
                    open: open.to_string(),
                    close: name.to_string(),
                };
                return Err(self.fail(kind, start));
            }
            None => {
                return Err(self.fail(ParseErrorKind::UnexpectedEndTag(name.to_string()), start));
            }
        }

        handler.end_element(name);
        Ok(())
    }

    fn scan_comment<H: SaxHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();
        self.scanner.advance(4); // "<!--"

        let content_start = self.scanner.position();
        let Some(end) = self.scanner.find_sequence(b"-->") else {
            return Err(self.fail(ParseErrorKind::Unterminated("comment"), start));
        };
        self.scanner.set_position(end + 3);

        handler.comment(&self.text[content_start..end]);
        Ok(())
    }

    fn scan_cdata<H: SaxHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();
        if self.open.is_empty() {
            return Err(self.outside_root(start));
        }
        self.scanner.advance(9); // "<![CDATA["

        let content_start = self.scanner.position();
        let Some(end) = self.scanner.find_sequence(b"]]>") else {
            return Err(self.fail(ParseErrorKind::Unterminated("CDATA section"), start));
        };
        self.scanner.set_position(end + 3);

        handler.cdata(self.scanner.slice(content_start, end));
        Ok(())
    }

    /// Processing instructions, including the XML declaration which is
    /// consumed silently
    fn scan_pi<H: SaxHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();
        self.scanner.advance(2); // "<?"

        let target_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return Err(self.fail(ParseErrorKind::MalformedMarkup, start));
        }
        let target = &self.text[target_start..self.scanner.position()];

        let Some(end) = self.scanner.find_sequence(b"?>") else {
            return Err(self.fail(ParseErrorKind::Unterminated("processing instruction"), start));
        };
        let data = self.text[self.scanner.position()..end].trim_matches(|c: char| {
            c.is_ascii() && is_xml_whitespace(c as u8)
        });
        self.scanner.set_position(end + 2);

        if !target.eq_ignore_ascii_case("xml") {
            handler.processing_instruction(target, (!data.is_empty()).then_some(data));
        }
        Ok(())
    }

    /// Skip a DOCTYPE declaration, including any internal subset
    fn skip_doctype(&mut self) -> Result<(), ParseError> {
        let start = self.scanner.position();
        if self.seen_root {
            return Err(self.fail(ParseErrorKind::ExtraContent, start));
        }
        self.scanner.advance(9); // "<!DOCTYPE"

        let mut depth = 0usize;
        let mut quote: Option<u8> = None;
        while let Some(c) = self.scanner.peek() {
            self.scanner.advance(1);
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(c),
                (None, b'[') => depth += 1,
                (None, b']') => depth = depth.saturating_sub(1),
                (None, b'>') if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.fail(ParseErrorKind::Unterminated("DOCTYPE"), start))
    }
}

/// Attribute value normalization: literal tab, newline and carriage return
/// become spaces, then references are decoded
fn normalize_attribute_value(raw: &str) -> Cow<'_, str> {
    if raw.contains(['\t', '\n', '\r']) {
        let spaced: String = raw
            .chars()
            .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
            .collect();
        Cow::Owned(decode_text(&spaced).into_owned())
    } else {
        decode_text(raw)
    }
}
