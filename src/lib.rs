//! TreeXML - XML documents as element trees
//!
//! Parses a document into a tree of elements (name, attributes, text, CDATA,
//! children) and serializes trees back to XML text.
//!
//! Layers:
//! - core: byte scanner, entity handling and the SAX tokenizer
//! - dom: arena element tree, event reducer and serializer
//! - sax: owned event recording and replay
//! - strategy: parallel batch parsing
//!
//! The NIFs at the bottom of this file expose the same operations to Elixir.

use rustler::{Binary, Env, Term};

pub mod core;
pub mod dom;
pub mod error;
pub mod options;
mod resource;
pub mod sax;
pub mod strategy;
mod term;

pub use dom::{
    parse_document, parse_document_with_diagnostics, NodeId, ParseOutcome, TreeBuilder,
    XmlElement, XmlTree,
};
pub use error::{ParseError, ParseErrorKind, TreeError};
pub use options::{ParseOptions, SerializeOptions};
pub use sax::XmlEvent;

use resource::{DocumentRef, DocumentResource};
use term::{errors_to_term, events_to_term, str_to_binary, tree_to_term};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Parsing
// ============================================================================

/// Parse XML into a tree (returns ResourceArc, or nil when there is no root)
#[rustler::nif]
fn parse(input: Binary, auto_trim: bool) -> Option<DocumentRef> {
    let tree = parse_document(input.as_slice(), &ParseOptions::new(auto_trim));
    DocumentResource::wrap(tree)
}

/// Parse XML and return the list of SAX events
#[rustler::nif]
fn parse_events<'a>(env: Env<'a>, input: Binary<'a>) -> Term<'a> {
    let events = sax::parse_events(input.as_slice());
    events_to_term(env, &events)
}

/// Parse a batch of documents in parallel
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_many(inputs: Vec<Binary>, auto_trim: bool) -> Vec<Option<DocumentRef>> {
    let slices: Vec<&[u8]> = inputs.iter().map(|input| input.as_slice()).collect();
    strategy::parse_documents(&slices, &ParseOptions::new(auto_trim))
        .into_iter()
        .map(DocumentResource::wrap)
        .collect()
}

/// Tokenizer diagnostics for a document, empty when it is well-formed
#[rustler::nif]
fn parse_errors<'a>(env: Env<'a>, input: Binary<'a>) -> Term<'a> {
    let outcome = parse_document_with_diagnostics(input.as_slice(), &ParseOptions::default());
    errors_to_term(env, &outcome.errors)
}

// ============================================================================
// Document Access
// ============================================================================

/// Get the root element as nested `{:element, ...}` tuples
#[rustler::nif]
fn get_root<'a>(env: Env<'a>, doc_ref: DocumentRef) -> Term<'a> {
    let tree = &doc_ref.tree;
    tree_to_term(env, tree, tree.root())
}

#[rustler::nif]
fn root_name<'a>(env: Env<'a>, doc_ref: DocumentRef) -> Term<'a> {
    str_to_binary(env, doc_ref.tree.root_element().name())
}

/// Serialize the whole document, optionally indented
#[rustler::nif]
fn serialize<'a>(env: Env<'a>, doc_ref: DocumentRef, use_whitespace: bool) -> Term<'a> {
    let tree = &doc_ref.tree;
    let xml = tree.serialize(tree.root(), &SerializeOptions::new(0, use_whitespace));
    str_to_binary(env, &xml)
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.TreeXML.Native");
