//! Tree Builder
//!
//! Reduces a SAX event sequence to an [`XmlTree`]. Implements the SaxHandler
//! trait for use with the Tokenizer, and can also replay recorded
//! [`XmlEvent`]s from any other source.
//!
//! The builder is a small state machine: `root` is the first element ever
//! started, `cursor` is the innermost open element. End events are trusted
//! to match (the tokenizer checks that) and simply pop one level.

use super::document::{attach, push_element, XmlTree};
use super::node::{NodeId, XmlElement};
use crate::core::tokenizer::{RawAttribute, SaxHandler, Tokenizer};
use crate::error::ParseError;
use crate::options::ParseOptions;
use crate::sax::XmlEvent;

/// Result of a parse: the best tree available plus what went wrong
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Root of the tree, or `None` when no element was ever started
    pub tree: Option<XmlTree>,
    /// Tokenizer errors, in the order they were reported
    pub errors: Vec<ParseError>,
}

/// Builder state for reducing events into an XmlTree
#[derive(Debug)]
pub struct TreeBuilder {
    options: ParseOptions,
    nodes: Vec<XmlElement>,
    root: Option<NodeId>,
    cursor: Option<NodeId>,
    /// Open depth inside an element dropped for having an empty name
    skipped: usize,
    errors: Vec<ParseError>,
}

impl TreeBuilder {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            nodes: Vec::with_capacity(64),
            root: None,
            cursor: None,
            skipped: 0,
            errors: Vec::new(),
        }
    }

    /// Feed one recorded event
    pub fn apply(&mut self, event: &XmlEvent) {
        event.replay(self);
    }

    /// Reduce a whole recorded event sequence
    pub fn from_events<'e, I>(events: I, options: ParseOptions) -> ParseOutcome
    where
        I: IntoIterator<Item = &'e XmlEvent>,
    {
        let mut builder = Self::new(options);
        for event in events {
            builder.apply(event);
        }
        builder.finish()
    }

    /// Innermost open element, if any
    pub fn cursor(&self) -> Option<NodeId> {
        self.cursor
    }

    /// Finish building and return the tree assembled so far
    pub fn finish(self) -> ParseOutcome {
        let tree = self
            .root
            .map(|root| XmlTree::from_parts(self.nodes, root));
        log::debug!(
            "tree built: {} elements, {} errors",
            tree.as_ref().map_or(0, XmlTree::node_count),
            self.errors.len()
        );
        ParseOutcome {
            tree,
            errors: self.errors,
        }
    }

    fn cursor_mut(&mut self) -> Option<&mut XmlElement> {
        let id = self.cursor?;
        self.nodes.get_mut(id as usize)
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

impl SaxHandler for TreeBuilder {
    fn start_document(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.cursor = None;
        self.skipped = 0;
        self.errors.clear();
    }

    fn start_element(&mut self, name: &str, attributes: &[RawAttribute<'_>]) {
        // Elements need a name; an unnamed one is dropped with its content
        if self.skipped > 0 || name.is_empty() {
            if self.skipped == 0 {
                log::warn!("dropping element with an empty name");
            }
            self.skipped += 1;
            return;
        }
        let mut element = XmlElement::new(name.to_string());
        for attribute in attributes {
            element.set_attribute(attribute.name, &attribute.value);
        }
        let id = push_element(&mut self.nodes, element);

        if self.root.is_none() {
            self.root = Some(id);
        }
        if let Some(parent) = self.cursor {
            attach(&mut self.nodes, parent, id);
        }
        self.cursor = Some(id);
    }

    fn characters(&mut self, text: &str) {
        if self.skipped > 0 {
            return;
        }
        if let Some(element) = self.cursor_mut() {
            element.append_text(text);
        }
    }

    fn cdata(&mut self, data: &[u8]) {
        if self.skipped > 0 {
            return;
        }
        if let Some(element) = self.cursor_mut() {
            element.append_cdata(data);
        }
    }

    fn end_element(&mut self, _name: &str) {
        if self.skipped > 0 {
            self.skipped -= 1;
            return;
        }
        let auto_trim = self.options.auto_trim_text;
        let Some(element) = self.cursor_mut() else {
            return;
        };
        if auto_trim {
            element.trim_text();
        }
        self.cursor = element.parent();
    }

    fn parse_error(&mut self, error: &ParseError) {
        log::warn!("XML parse error: {} (offset {})", error, error.offset);
        self.errors.push(error.clone());
    }
}

/// Parse a document into a tree
///
/// Never fails: empty input or input without any element gives `None`, a
/// malformed document gives the tree built up to the first error.
pub fn parse_document(input: &[u8], options: &ParseOptions) -> Option<XmlTree> {
    parse_document_with_diagnostics(input, options).tree
}

/// Parse a document into a tree, also returning the tokenizer's errors
pub fn parse_document_with_diagnostics(input: &[u8], options: &ParseOptions) -> ParseOutcome {
    if input.is_empty() {
        return ParseOutcome::default();
    }

    log::debug!("parsing {} bytes (auto_trim_text={})", input.len(), options.auto_trim_text);
    let mut builder = TreeBuilder::new(*options);
    let _ = Tokenizer::new(input).run(&mut builder);
    builder.finish()
}

impl XmlTree {
    /// Parse with default options (text trimming on)
    pub fn parse(input: &[u8]) -> Option<Self> {
        parse_document(input, &ParseOptions::default())
    }

    pub fn parse_with_options(input: &[u8], options: &ParseOptions) -> Option<Self> {
        parse_document(input, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use crate::sax::parse_events;

    fn start(name: &str) -> XmlEvent {
        XmlEvent::ElementStart {
            name: name.into(),
            attributes: vec![],
        }
    }

    fn end(name: &str) -> XmlEvent {
        XmlEvent::ElementEnd { name: name.into() }
    }

    #[test]
    fn test_end_to_end_example() {
        let tree = XmlTree::parse(b"<root><a x=\"1\">hi</a></root>").unwrap();
        let root = tree.root();
        assert_eq!(tree.name(root), Some("root"));
        assert_eq!(tree.children(root).len(), 1);

        let a = tree.first_child_named(root, "a").unwrap();
        assert_eq!(tree.attribute(a, "x"), Some("1"));
        assert_eq!(tree.text(a), Some("hi"));
        assert_eq!(tree.parent(a), Some(root));
    }

    #[test]
    fn test_empty_input() {
        assert!(XmlTree::parse(b"").is_none());
        let outcome = parse_document_with_diagnostics(b"", &ParseOptions::default());
        assert!(outcome.tree.is_none());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_not_xml_is_absent() {
        let outcome = parse_document_with_diagnostics(b"not xml", &ParseOptions::default());
        assert!(outcome.tree.is_none());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].kind, ParseErrorKind::ContentOutsideRoot);
    }

    #[test]
    fn test_auto_trim() {
        let input = b"<a>  hello  </a>";
        let trimmed = parse_document(input, &ParseOptions::new(true)).unwrap();
        assert_eq!(trimmed.text(trimmed.root()), Some("hello"));

        let verbatim = parse_document(input, &ParseOptions::new(false)).unwrap();
        assert_eq!(verbatim.text(verbatim.root()), Some("  hello  "));
        let via_tree = XmlTree::parse_with_options(input, &ParseOptions::new(false)).unwrap();
        assert_eq!(via_tree, verbatim);
    }

    #[test]
    fn test_whitespace_between_children_trims_away() {
        let tree = XmlTree::parse(b"<a>\n  <b>x</b>\n  <c/>\n</a>").unwrap();
        assert_eq!(tree.text(tree.root()), None);

        let raw = parse_document(b"<a>\n  <b>x</b>\n</a>", &ParseOptions::new(false)).unwrap();
        assert_eq!(raw.text(raw.root()), Some("\n  \n"));
    }

    #[test]
    fn test_text_runs_concatenate_before_trim() {
        let tree = XmlTree::parse(b"<a> one <b/> two </a>").unwrap();
        assert_eq!(tree.text(tree.root()), Some("one  two"));
    }

    #[test]
    fn test_cdata_concatenation() {
        let tree = XmlTree::parse(b"<a><![CDATA[one]]><![CDATA[two]]></a>").unwrap();
        assert_eq!(tree.cdata(tree.root()), Some(b"onetwo" as &[u8]));
        assert_eq!(tree.text(tree.root()), None);
    }

    #[test]
    fn test_partial_tree_on_error() {
        let outcome =
            parse_document_with_diagnostics(b"<root><a>hi</a><b>oops</root>", &ParseOptions::default());
        let tree = outcome.tree.expect("partial tree");
        assert_eq!(tree.children(tree.root()).len(), 2);
        assert_eq!(tree.text_of(tree.root(), "a"), Some("hi"));
        // <b> never closed, so its text was never finalized
        assert_eq!(tree.text_of(tree.root(), "b"), Some("oops"));
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_replay_matches_direct_parse() {
        let input = b"<r k='v'><x>1</x><![CDATA[raw]]><y/></r>";
        let events = parse_events(input);
        let replayed = TreeBuilder::from_events(&events, ParseOptions::default());
        let direct = XmlTree::parse(input).unwrap();
        assert_eq!(replayed.tree, Some(direct));
    }

    #[test]
    fn test_reducer_tolerates_stray_events() {
        let events = vec![
            XmlEvent::DocumentStart,
            XmlEvent::Characters("before".into()),
            XmlEvent::CData(b"stray".to_vec()),
            end("nothing"),
            start("a"),
            XmlEvent::Characters("x".into()),
            end("mismatched-name"),
            XmlEvent::DocumentEnd,
        ];
        let outcome = TreeBuilder::from_events(&events, ParseOptions::default());
        let tree = outcome.tree.unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.name(tree.root()), Some("a"));
        assert_eq!(tree.text(tree.root()), Some("x"));
        assert_eq!(tree.cdata(tree.root()), None);
    }

    #[test]
    fn test_document_start_resets() {
        let mut builder = TreeBuilder::default();
        builder.apply(&XmlEvent::DocumentStart);
        builder.apply(&start("first"));
        builder.apply(&XmlEvent::DocumentStart);
        builder.apply(&start("second"));
        builder.apply(&end("second"));
        assert_eq!(builder.cursor(), None);

        let tree = builder.finish().tree.unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.name(tree.root()), Some("second"));
    }

    #[test]
    fn test_first_element_is_root() {
        let events = vec![start("a"), end("a"), start("b"), start("c"), end("c"), end("b")];
        let tree = TreeBuilder::from_events(&events, ParseOptions::default())
            .tree
            .unwrap();
        assert_eq!(tree.name(tree.root()), Some("a"));
        assert!(tree.children(tree.root()).is_empty());
        // The later top-level element stays detached from the root
        assert_eq!(tree.root_of(2), Some(1));
    }

    #[test]
    fn test_unnamed_element_dropped_with_content() {
        let events = vec![
            start("root"),
            start(""),
            XmlEvent::Characters("lost".into()),
            start("inner"),
            end("inner"),
            end(""),
            XmlEvent::Characters("kept".into()),
            start("b"),
            end("b"),
            end("root"),
        ];
        let tree = TreeBuilder::from_events(&events, ParseOptions::default())
            .tree
            .unwrap();
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.text(tree.root()), Some("kept"));
        let children = tree.children(tree.root());
        assert_eq!(children.len(), 1);
        assert_eq!(tree.name(children[0]), Some("b"));
        assert!(!tree.to_xml().contains("</>"));
    }

    #[test]
    fn test_unnamed_first_element_is_not_root() {
        let events = vec![start(""), end(""), start("a"), end("a")];
        let tree = TreeBuilder::from_events(&events, ParseOptions::default())
            .tree
            .unwrap();
        assert_eq!(tree.name(tree.root()), Some("a"));
    }

    #[test]
    fn test_duplicate_attributes_last_wins() {
        let events = vec![XmlEvent::ElementStart {
            name: "a".into(),
            attributes: vec![("k".into(), "1".into()), ("k".into(), "2".into())],
        }];
        let tree = TreeBuilder::from_events(&events, ParseOptions::default())
            .tree
            .unwrap();
        assert_eq!(tree.root_element().attributes().len(), 1);
        assert_eq!(tree.attribute(tree.root(), "k"), Some("2"));
    }
}
