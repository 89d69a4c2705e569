//! DOM Module - Arena-based Element Tree
//!
//! Elements live in a flat arena owned by [`XmlTree`] and are addressed by
//! [`NodeId`] (u32) indices; the parent back-reference is just an index, so
//! the tree has no reference cycles.
//!
//! - `node`: the element record (name, attributes, text, CDATA, children)
//! - `document`: the arena, construction and lookup
//! - `builder`: reduces SAX events into a tree
//! - `serialize`: renders a subtree back to XML text

pub mod builder;
pub mod document;
pub mod node;
pub mod serialize;

pub use builder::{parse_document, parse_document_with_diagnostics, ParseOutcome, TreeBuilder};
pub use document::{DescendantIter, XmlTree};
pub use node::{NodeId, XmlElement};
pub use serialize::XML_DECLARATION;
