//! Error types
//!
//! Parsing never fails outright: tokenizer problems are recorded as
//! [`ParseError`] diagnostics next to whatever tree was built. Tree
//! construction mistakes are returned as [`TreeError`].

use crate::dom::NodeId;
use thiserror::Error;

/// What went wrong while tokenizing a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("document contains no root element")]
    NoRootElement,
    #[error("text content not allowed outside the root element")]
    ContentOutsideRoot,
    #[error("extra content at the end of the document")]
    ExtraContent,
    #[error("malformed start tag")]
    MalformedStartTag,
    #[error("malformed attribute")]
    MalformedAttribute,
    #[error("malformed end tag")]
    MalformedEndTag,
    #[error("malformed markup declaration")]
    MalformedMarkup,
    #[error("tag mismatch: <{open}> closed with </{close}>")]
    TagMismatch { open: String, close: String },
    #[error("unexpected end tag </{0}>")]
    UnexpectedEndTag(String),
    #[error("unterminated {0}")]
    Unterminated(&'static str),
    #[error("premature end of data, <{0}> is still open")]
    PrematureEnd(String),
}

impl ParseErrorKind {
    /// Short stable identifier, used when handing diagnostics to the host
    pub fn code(&self) -> &'static str {
        match self {
            ParseErrorKind::InvalidUtf8 => "invalid_utf8",
            ParseErrorKind::NoRootElement => "no_root_element",
            ParseErrorKind::ContentOutsideRoot => "content_outside_root",
            ParseErrorKind::ExtraContent => "extra_content",
            ParseErrorKind::MalformedStartTag => "malformed_start_tag",
            ParseErrorKind::MalformedAttribute => "malformed_attribute",
            ParseErrorKind::MalformedEndTag => "malformed_end_tag",
            ParseErrorKind::MalformedMarkup => "malformed_markup",
            ParseErrorKind::TagMismatch { .. } => "tag_mismatch",
            ParseErrorKind::UnexpectedEndTag(_) => "unexpected_end_tag",
            ParseErrorKind::Unterminated(_) => "unterminated",
            ParseErrorKind::PrematureEnd(_) => "premature_end",
        }
    }
}

/// A fatal tokenizer error with its position in the input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset into the input
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in bytes
    pub column: usize,
}

/// Errors from building or linking tree nodes by hand
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} does not exist in this tree")]
    UnknownNode(NodeId),
    #[error("node {child} is already attached to node {parent}")]
    AlreadyAttached { child: NodeId, parent: NodeId },
    #[error("attaching node {child} under node {parent} would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },
    #[error("element name must not be empty")]
    EmptyName,
}
