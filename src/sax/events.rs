//! SAX Event Types
//!
//! Owned copies of the events a [`Tokenizer`](crate::core::Tokenizer)
//! reports, for recording and replaying event sequences.

use std::borrow::Cow;

use crate::core::tokenizer::{RawAttribute, SaxHandler};
use crate::error::ParseError;

/// A SAX parsing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    DocumentStart,

    /// Start of an element
    ElementStart {
        name: String,
        /// Attributes as (name, value) pairs, values decoded
        attributes: Vec<(String, String)>,
    },

    /// Decoded character data
    Characters(String),

    /// Raw CDATA section content
    CData(Vec<u8>),

    /// End of an element
    ElementEnd { name: String },

    DocumentEnd,

    /// Fatal tokenizer error; nothing follows it
    ParseError(ParseError),

    Comment(String),

    ProcessingInstruction {
        target: String,
        data: Option<String>,
    },
}

impl XmlEvent {
    /// Check if this is a start element event
    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, XmlEvent::ElementStart { .. })
    }

    /// Check if this is an end element event
    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, XmlEvent::ElementEnd { .. })
    }

    /// Element name for start and end events
    pub fn element_name(&self) -> Option<&str> {
        match self {
            XmlEvent::ElementStart { name, .. } | XmlEvent::ElementEnd { name } => Some(name),
            _ => None,
        }
    }

    /// Deliver this event to a handler, as the tokenizer would have
    pub fn replay<H: SaxHandler + ?Sized>(&self, handler: &mut H) {
        match self {
            XmlEvent::DocumentStart => handler.start_document(),
            XmlEvent::ElementStart { name, attributes } => {
                let attrs: Vec<RawAttribute<'_>> = attributes
                    .iter()
                    .map(|(key, value)| RawAttribute {
                        name: key.as_str(),
                        value: Cow::Borrowed(value.as_str()),
                    })
                    .collect();
                handler.start_element(name, &attrs);
            }
            XmlEvent::Characters(text) => handler.characters(text),
            XmlEvent::CData(data) => handler.cdata(data),
            XmlEvent::ElementEnd { name } => handler.end_element(name),
            XmlEvent::DocumentEnd => handler.end_document(),
            XmlEvent::ParseError(error) => handler.parse_error(error),
            XmlEvent::Comment(text) => handler.comment(text),
            XmlEvent::ProcessingInstruction { target, data } => {
                handler.processing_instruction(target, data.as_deref())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_name() {
        let start = XmlEvent::ElementStart {
            name: "a".into(),
            attributes: vec![],
        };
        assert!(start.is_start_element());
        assert_eq!(start.element_name(), Some("a"));
        assert_eq!(XmlEvent::Characters("x".into()).element_name(), None);
        assert!(XmlEvent::ElementEnd { name: "a".into() }.is_end_element());
    }
}
