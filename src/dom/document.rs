//! XML Tree - Arena-based element tree
//!
//! All elements of a tree live in one `Vec` and are addressed by [`NodeId`]:
//! - parent -> children is the owning direction
//! - the parent link is a plain index, so there are no reference cycles
//! - dropping the tree releases every node at once

use super::node::{NodeId, XmlElement};
use crate::error::TreeError;

/// An element tree stored in arena format
///
/// A tree always has a root element. Elements created with
/// [`create_element`](XmlTree::create_element) stay detached until they are
/// attached with [`add_child`](XmlTree::add_child).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTree {
    nodes: Vec<XmlElement>,
    root: NodeId,
}

impl XmlTree {
    /// Create a tree holding a single root element
    pub fn new(name: &str) -> Result<Self, TreeError> {
        Self::with_attributes(name, std::iter::empty::<(&str, &str)>())
    }

    /// Create a tree whose root element carries `attributes`
    pub fn with_attributes<I, K, V>(name: &str, attributes: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut tree = XmlTree {
            nodes: Vec::with_capacity(16),
            root: 0,
        };
        tree.root = tree.create_element_with_attributes(name, attributes)?;
        Ok(tree)
    }

    /// Assemble a tree from a finished arena. `root` must index into `nodes`.
    pub(crate) fn from_parts(nodes: Vec<XmlElement>, root: NodeId) -> Self {
        debug_assert!((root as usize) < nodes.len());
        XmlTree { nodes, root }
    }

    /// Root element ID
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Root element
    pub fn root_element(&self) -> &XmlElement {
        &self.nodes[self.root as usize]
    }

    /// Number of elements in the arena, detached ones included
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&XmlElement> {
        self.nodes.get(id as usize)
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut XmlElement, TreeError> {
        self.nodes
            .get_mut(id as usize)
            .ok_or(TreeError::UnknownNode(id))
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(XmlElement::name)
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.attribute(name)
    }

    /// Attributes of `id` (empty for unknown IDs)
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        self.get(id).map(XmlElement::attributes).unwrap_or(&[])
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.text()
    }

    pub fn cdata(&self, id: NodeId) -> Option<&[u8]> {
        self.get(id)?.cdata()
    }

    /// Child IDs in document order (empty for unknown IDs)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(XmlElement::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Allocate a detached element
    pub fn create_element(&mut self, name: &str) -> Result<NodeId, TreeError> {
        self.create_element_with_attributes(name, std::iter::empty::<(&str, &str)>())
    }

    /// Allocate a detached element with attributes. Repeated keys keep the
    /// last value.
    pub fn create_element_with_attributes<I, K, V>(
        &mut self,
        name: &str,
        attributes: I,
    ) -> Result<NodeId, TreeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if name.is_empty() {
            return Err(TreeError::EmptyName);
        }
        let mut element = XmlElement::new(name.to_string());
        for (key, value) in attributes {
            element.set_attribute(key.as_ref(), value.as_ref());
        }
        Ok(push_element(&mut self.nodes, element))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), TreeError> {
        self.get_mut(id)?.set_attribute(name, value);
        Ok(())
    }

    /// Append character data to an element's text
    pub fn append_text(&mut self, id: NodeId, text: &str) -> Result<(), TreeError> {
        self.get_mut(id)?.append_text(text);
        Ok(())
    }

    /// Append bytes to an element's CDATA payload
    pub fn append_cdata(&mut self, id: NodeId, data: &[u8]) -> Result<(), TreeError> {
        self.get_mut(id)?.append_cdata(data);
        Ok(())
    }

    /// Append `child` to `parent`'s children and point `child` back at it
    ///
    /// A node is attached at most once, and never below itself, so
    /// [`root_of`](XmlTree::root_of) always terminates.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.get(parent).ok_or(TreeError::UnknownNode(parent))?;
        let child_node = self.get(child).ok_or(TreeError::UnknownNode(child))?;

        if let Some(existing) = child_node.parent() {
            return Err(TreeError::AlreadyAttached {
                child,
                parent: existing,
            });
        }
        // A childless node can only be its own ancestor
        let cycle = if child_node.has_children() {
            self.is_ancestor_or_self(child, parent)
        } else {
            child == parent
        };
        if cycle {
            return Err(TreeError::Cycle { child, parent });
        }

        attach(&mut self.nodes, parent, child);
        Ok(())
    }

    /// Whether `ancestor` is `node` or lies on its parent chain
    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Direct children named `name`, in document order
    pub fn children_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.name(child) == Some(name))
            .collect()
    }

    /// First direct child named `name`
    pub fn first_child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.name(child) == Some(name))
    }

    /// Text of the first child named `name`
    pub fn text_of(&self, id: NodeId, name: &str) -> Option<&str> {
        self.text(self.first_child_named(id, name)?)
    }

    /// CDATA of the first child named `name`
    pub fn cdata_of(&self, id: NodeId, name: &str) -> Option<&[u8]> {
        self.cdata(self.first_child_named(id, name)?)
    }

    /// Attributes of the first child named `name`
    pub fn attributes_of(&self, id: NodeId, name: &str) -> Option<&[(String, String)]> {
        let child = self.first_child_named(id, name)?;
        self.get(child).map(XmlElement::attributes)
    }

    /// Topmost ancestor of `id` (itself when detached or the root)
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get(id).map(|_| id)?;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// Iterate over all descendants of a node in document order
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        let stack = self.children(id).iter().rev().copied().collect();
        DescendantIter { tree: self, stack }
    }

    /// Compare the subtree at `id` with the subtree at `other_id` in `other`:
    /// names, attributes (order-insensitive), text, CDATA and child order
    pub fn subtree_eq(&self, id: NodeId, other: &XmlTree, other_id: NodeId) -> bool {
        let mut pending = vec![(id, other_id)];
        while let Some((x, y)) = pending.pop() {
            let (Some(a), Some(b)) = (self.get(x), other.get(y)) else {
                return false;
            };
            if !same_element(a, b) {
                return false;
            }
            pending.extend(a.children().iter().copied().zip(b.children().iter().copied()));
        }
        true
    }
}

/// Node-local equality; children are compared by count only
fn same_element(a: &XmlElement, b: &XmlElement) -> bool {
    let same_attributes = a.attributes().len() == b.attributes().len()
        && a
            .attributes()
            .iter()
            .all(|(key, value)| b.attribute(key) == Some(value.as_str()));

    a.name() == b.name()
        && same_attributes
        && a.text() == b.text()
        && a.cdata() == b.cdata()
        && a.children().len() == b.children().len()
}

/// Push an element into an arena and return its ID
pub(crate) fn push_element(nodes: &mut Vec<XmlElement>, element: XmlElement) -> NodeId {
    let id = nodes.len() as NodeId;
    nodes.push(element);
    id
}

/// Link `child` under `parent` without checks. Callers guarantee both IDs
/// exist and `child` is a fresh, detached node.
pub(crate) fn attach(nodes: &mut [XmlElement], parent: NodeId, child: NodeId) {
    nodes[child as usize].set_parent(parent);
    nodes[parent as usize].push_child(child);
}

/// Pre-order iterator over descendant IDs
pub struct DescendantIter<'a> {
    tree: &'a XmlTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DescendantIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (XmlTree, NodeId, NodeId, NodeId) {
        let mut tree = XmlTree::new("root").unwrap();
        let a1 = tree.create_element_with_attributes("a", [("x", "1")]).unwrap();
        let b = tree.create_element("b").unwrap();
        let a2 = tree.create_element_with_attributes("a", [("x", "2")]).unwrap();
        let root = tree.root();
        tree.add_child(root, a1).unwrap();
        tree.add_child(root, b).unwrap();
        tree.add_child(root, a2).unwrap();
        tree.append_text(a1, "first").unwrap();
        tree.append_cdata(b, b"payload").unwrap();
        (tree, a1, b, a2)
    }

    #[test]
    fn test_add_child_links_both_ways() {
        let (tree, a1, b, a2) = sample();
        assert_eq!(tree.children(tree.root()), &[a1, b, a2]);
        assert_eq!(tree.parent(a1), Some(tree.root()));
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_children_named() {
        let (tree, a1, _, a2) = sample();
        assert_eq!(tree.children_named(tree.root(), "a"), vec![a1, a2]);
        assert!(tree.children_named(tree.root(), "missing").is_empty());
        assert_eq!(tree.first_child_named(tree.root(), "a"), Some(a1));
        assert_eq!(tree.first_child_named(tree.root(), "missing"), None);
    }

    #[test]
    fn test_convenience_accessors() {
        let (tree, _, _, _) = sample();
        let root = tree.root();
        assert_eq!(tree.text_of(root, "a"), Some("first"));
        assert_eq!(tree.cdata_of(root, "b"), Some(b"payload" as &[u8]));
        assert_eq!(
            tree.attributes_of(root, "a"),
            Some(&[("x".to_string(), "1".to_string())][..])
        );
        assert_eq!(tree.text_of(root, "b"), None);
        assert!(tree.attributes(root).is_empty());
        assert!(tree.attributes(42).is_empty());
        assert_eq!(tree.attributes_of(root, "missing"), None);
    }

    #[test]
    fn test_root_of() {
        let (mut tree, a1, _, _) = sample();
        let deep = tree.create_element("deep").unwrap();
        tree.add_child(a1, deep).unwrap();
        assert_eq!(tree.root_of(deep), Some(tree.root()));
        assert_eq!(tree.root_of(tree.root()), Some(tree.root()));

        let detached = tree.create_element("loose").unwrap();
        assert_eq!(tree.root_of(detached), Some(detached));
        assert_eq!(tree.root_of(999), None);
    }

    #[test]
    fn test_add_child_rejects_reattach() {
        let (mut tree, a1, b, _) = sample();
        assert_eq!(
            tree.add_child(b, a1),
            Err(TreeError::AlreadyAttached {
                child: a1,
                parent: tree.root()
            })
        );
        assert_eq!(tree.parent(a1), Some(tree.root()));
        assert!(tree.children(b).is_empty());
    }

    #[test]
    fn test_add_child_rejects_cycles() {
        let mut tree = XmlTree::new("root").unwrap();
        let loose = tree.create_element("loose").unwrap();
        let inner = tree.create_element("inner").unwrap();
        tree.add_child(loose, inner).unwrap();

        assert_eq!(
            tree.add_child(loose, loose),
            Err(TreeError::Cycle {
                child: loose,
                parent: loose
            })
        );
        assert_eq!(
            tree.add_child(inner, loose),
            Err(TreeError::Cycle {
                child: loose,
                parent: inner
            })
        );
    }

    #[test]
    fn test_unknown_and_empty_names() {
        let mut tree = XmlTree::new("root").unwrap();
        assert_eq!(tree.add_child(0, 7), Err(TreeError::UnknownNode(7)));
        assert_eq!(tree.create_element(""), Err(TreeError::EmptyName));
        assert!(XmlTree::new("").is_err());
    }

    #[test]
    fn test_descendants() {
        let (mut tree, a1, b, a2) = sample();
        let c = tree.create_element("c").unwrap();
        tree.add_child(a1, c).unwrap();
        let order: Vec<_> = tree.descendants(tree.root()).collect();
        assert_eq!(order, vec![a1, c, b, a2]);
    }

    #[test]
    fn test_subtree_eq_on_deep_chain() {
        let mut tree = XmlTree::new("a").unwrap();
        let mut parent = tree.root();
        for _ in 0..100_000 {
            let child = tree.create_element("a").unwrap();
            tree.add_child(parent, child).unwrap();
            parent = child;
        }
        tree.append_text(parent, "leaf").unwrap();

        let mut other = tree.clone();
        assert!(tree.subtree_eq(tree.root(), &other, other.root()));
        other.append_text(parent, "!").unwrap();
        assert!(!tree.subtree_eq(tree.root(), &other, other.root()));
        assert_eq!(tree.root_of(parent), Some(tree.root()));
    }

    #[test]
    fn test_subtree_eq_ignores_arena_order() {
        let (tree, _, _, _) = sample();

        let mut other = XmlTree::new("root").unwrap();
        let a2 = other.create_element_with_attributes("a", [("x", "2")]).unwrap();
        let b = other.create_element("b").unwrap();
        let a1 = other.create_element_with_attributes("a", [("x", "1")]).unwrap();
        let root = other.root();
        other.add_child(root, a1).unwrap();
        other.add_child(root, b).unwrap();
        other.add_child(root, a2).unwrap();
        other.append_text(a1, "first").unwrap();
        other.append_cdata(b, b"payload").unwrap();

        assert!(tree.subtree_eq(tree.root(), &other, other.root()));
        other.append_text(a2, "extra").unwrap();
        assert!(!tree.subtree_eq(tree.root(), &other, other.root()));
    }
}
