//! Parse and serialization settings

/// Options for building a tree from XML input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Trim leading/trailing whitespace from each element's text when the
    /// element closes. Text that is empty after trimming becomes absent.
    pub auto_trim_text: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            auto_trim_text: true,
        }
    }
}

impl ParseOptions {
    pub fn new(auto_trim_text: bool) -> Self {
        ParseOptions { auto_trim_text }
    }
}

/// Options for rendering a tree back to XML text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerializeOptions {
    /// Starting depth. The XML declaration is only written at depth 0.
    pub indent_level: usize,
    /// Indent nested elements with one space per level. Off by default,
    /// which keeps the compact output (newlines but no indentation).
    pub use_whitespace: bool,
}

impl SerializeOptions {
    pub fn new(indent_level: usize, use_whitespace: bool) -> Self {
        SerializeOptions {
            indent_level,
            use_whitespace,
        }
    }

    /// Compact output from depth 0
    pub fn compact() -> Self {
        Self::default()
    }

    /// Space-indented output from depth 0
    pub fn pretty() -> Self {
        SerializeOptions {
            indent_level: 0,
            use_whitespace: true,
        }
    }
}
