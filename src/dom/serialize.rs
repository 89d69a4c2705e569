//! XML Serialization
//!
//! Renders an element subtree back to text. Output rules:
//! - the XML declaration is written only at indent level 0
//! - an element with no children, no CDATA and no text is self-closed
//! - an element without children is written on one line; an element with
//!   children puts its text, CDATA and each child on their own lines
//! - indentation is one space per level with `use_whitespace`, none otherwise

use super::document::XmlTree;
use super::node::NodeId;
use crate::core::entities::{encode_attribute, encode_text};
use crate::options::SerializeOptions;
use std::fmt;

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

impl XmlTree {
    /// Serialize the subtree at `id`
    ///
    /// Unknown IDs produce an empty string.
    pub fn serialize(&self, id: NodeId, options: &SerializeOptions) -> String {
        let mut out = String::with_capacity(256);
        if self.get(id).is_some() {
            write_element(self, id, options.indent_level, options.use_whitespace, &mut out);
        }
        out
    }

    /// Whole document, compact form
    pub fn to_xml(&self) -> String {
        self.serialize(self.root(), &SerializeOptions::compact())
    }

    /// Whole document, one space of indentation per level
    pub fn to_xml_pretty(&self) -> String {
        self.serialize(self.root(), &SerializeOptions::pretty())
    }
}

impl fmt::Display for XmlTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}

/// Stack entries: entering an element, or writing its closing tag once its
/// children are done. The flag says whether a newline follows the element.
enum Step {
    Enter(NodeId, usize, bool),
    Close(NodeId, usize, bool),
}

/// Write the subtree at `id`. Uses an explicit stack so document depth is
/// not limited by the thread's stack.
fn write_element(tree: &XmlTree, id: NodeId, indent: usize, use_whitespace: bool, out: &mut String) {
    let spacer = if use_whitespace { " " } else { "" };
    let mut stack: Vec<Step> = Vec::with_capacity(64);
    stack.push(Step::Enter(id, indent, false));

    while let Some(step) = stack.pop() {
        match step {
            Step::Close(current, level, newline) => {
                let Some(element) = tree.get(current) else {
                    continue;
                };
                out.push_str(&spacer.repeat(level));
                push_end_tag(out, element.name(), newline);
            }
            Step::Enter(current, level, newline) => {
                let Some(element) = tree.get(current) else {
                    continue;
                };
                if level == 0 {
                    out.push_str(XML_DECLARATION);
                }
                let tab = spacer.repeat(level);
                let one_line = !element.has_children();

                out.push_str(&tab);
                out.push('<');
                out.push_str(element.name());
                for (key, value) in element.attributes() {
                    out.push(' ');
                    out.push_str(&encode_attribute(key));
                    out.push_str("=\"");
                    out.push_str(&encode_attribute(value));
                    out.push('"');
                }

                let text = element.text().map(encode_text).filter(|t| !t.is_empty());
                if one_line && element.cdata().is_none() && text.is_none() {
                    out.push_str("/>");
                    if newline {
                        out.push('\n');
                    }
                    continue;
                }

                out.push('>');
                if !one_line {
                    out.push('\n');
                }
                if let Some(text) = &text {
                    push_content(out, text, one_line, &tab, spacer);
                }
                if let Some(cdata) = element.cdata() {
                    push_content(out, &cdata_section(cdata), one_line, &tab, spacer);
                }

                if one_line {
                    push_end_tag(out, element.name(), newline);
                    continue;
                }

                // Closing tag first, so it is written after every child
                stack.push(Step::Close(current, level, newline));
                for &child in element.children().iter().rev() {
                    stack.push(Step::Enter(child, level + 1, true));
                }
            }
        }
    }
}

fn push_end_tag(out: &mut String, name: &str, newline: bool) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
    if newline {
        out.push('\n');
    }
}

/// Text or CDATA inside an element: inline for one-line elements, on its
/// own indented line otherwise
fn push_content(out: &mut String, content: &str, one_line: bool, tab: &str, spacer: &str) {
    if one_line {
        out.push_str(content);
        return;
    }
    out.push_str(tab);
    out.push_str(spacer);
    out.push_str(content);
    out.push('\n');
}

/// Wrap raw bytes in a CDATA section. An embedded `]]>` is split across two
/// adjacent sections, which a parser concatenates back.
fn cdata_section(data: &[u8]) -> String {
    let content = String::from_utf8_lossy(data);
    format!("<![CDATA[{}]]>", content.replace("]]>", "]]]]><![CDATA[>"))
}
