//! Element node representation
//!
//! Nodes live in the [`XmlTree`](super::XmlTree) arena and refer to each
//! other by [`NodeId`]. Children own nothing themselves; the parent index is
//! only used to walk upwards.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// One XML element with its attributes, text, CDATA payload and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    /// Unique keys, kept in first-insertion order
    attributes: Vec<(String, String)>,
    text: Option<String>,
    cdata: Option<Vec<u8>>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl XmlElement {
    pub(crate) fn new(name: String) -> Self {
        XmlElement {
            name,
            attributes: Vec::new(),
            text: None,
            cdata: None,
            children: Vec::new(),
            parent: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes as (name, value) pairs
    #[inline]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[inline]
    pub fn cdata(&self) -> Option<&[u8]> {
        self.cdata.as_deref()
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Set an attribute; an existing key keeps its position and takes the
    /// new value
    pub(crate) fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => {
                existing.clear();
                existing.push_str(value);
            }
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    /// Append character data. Empty runs leave absent text absent.
    pub(crate) fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.text.get_or_insert_with(String::new).push_str(text);
    }

    pub(crate) fn append_cdata(&mut self, data: &[u8]) {
        self.cdata.get_or_insert_with(Vec::new).extend_from_slice(data);
    }

    /// Trim the accumulated text in place; whitespace-only text becomes absent
    pub(crate) fn trim_text(&mut self) {
        let Some(text) = self.text.as_mut() else {
            return;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.text = None;
        } else if trimmed.len() != text.len() {
            *text = trimmed.to_string();
        }
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(crate) fn set_parent(&mut self, parent: NodeId) {
        self.parent = Some(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_last_write_wins() {
        let mut element = XmlElement::new("a".into());
        element.set_attribute("x", "1");
        element.set_attribute("y", "2");
        element.set_attribute("x", "3");
        assert_eq!(
            element.attributes(),
            &[("x".to_string(), "3".to_string()), ("y".to_string(), "2".to_string())]
        );
        assert_eq!(element.attribute("x"), Some("3"));
        assert_eq!(element.attribute("z"), None);
    }

    #[test]
    fn test_text_accumulates_in_order() {
        let mut element = XmlElement::new("a".into());
        assert_eq!(element.text(), None);
        element.append_text("");
        assert_eq!(element.text(), None);
        element.append_text("  hel");
        element.append_text("lo  ");
        assert_eq!(element.text(), Some("  hello  "));
        element.trim_text();
        assert_eq!(element.text(), Some("hello"));
    }

    #[test]
    fn test_whitespace_text_trims_to_absent() {
        let mut element = XmlElement::new("a".into());
        element.append_text("\n   \t");
        element.trim_text();
        assert_eq!(element.text(), None);
    }

    #[test]
    fn test_cdata_concatenates() {
        let mut element = XmlElement::new("a".into());
        element.append_cdata(b"first");
        element.append_cdata(b"second");
        assert_eq!(element.cdata(), Some(b"firstsecond" as &[u8]));
    }
}
