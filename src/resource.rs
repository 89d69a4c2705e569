//! ResourceArc Wrappers
//!
//! Parsed trees handed to the host as opaque references.

use crate::dom::XmlTree;
use rustler::ResourceArc;

/// A fully built tree stored in a ResourceArc
///
/// The tree is never mutated after parsing, so reads need no lock.
pub struct DocumentResource {
    pub tree: XmlTree,
}

impl DocumentResource {
    pub fn new(tree: XmlTree) -> Self {
        DocumentResource { tree }
    }

    /// Wrap a parse result, `None` stays `None`
    pub fn wrap(tree: Option<XmlTree>) -> Option<DocumentRef> {
        tree.map(|tree| ResourceArc::new(Self::new(tree)))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for DocumentResource {}

/// Type alias for document ResourceArc
pub type DocumentRef = ResourceArc<DocumentResource>;
