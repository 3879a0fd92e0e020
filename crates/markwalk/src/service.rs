//! Converter - the main entry point for tree to Markdown conversion.

use std::io::Write;

use log::debug;

use crate::node::Node;
use crate::options::Options;
use crate::rules::Rule;
use crate::walker::walk;
use crate::Result;

/// Converts node trees to Markdown with a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: Options,
}

impl Converter {
    /// Create a new Converter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a Converter with custom options
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }

    /// Convert a node tree to a Markdown string. Leading and trailing
    /// blank lines are removed.
    pub fn convert(&self, node: &Node) -> Result<String> {
        let mut buf = Vec::new();
        self.convert_to(node, &mut buf)?;
        let markdown = String::from_utf8(buf)?;
        debug!("converted tree to {} bytes of markdown", markdown.len());
        Ok(markdown.trim_matches('\n').to_string())
    }

    /// Stream the Markdown for a node tree into `out`
    pub fn convert_to<W: Write>(&self, node: &Node, out: &mut W) -> Result<()> {
        debug!(
            "converting <{}> with {} custom rules",
            if node.is_element() { node.tag.as_str() } else { "#document" },
            self.options.custom_rules.len()
        );
        walk(node, out, 0, &self.options)
    }

    /// Parse an HTML string and convert it. Elements nested deeper than
    /// `max_depth` are dropped while parsing.
    #[cfg(feature = "html")]
    pub fn convert_html(&self, html: &str) -> Result<String> {
        let node = crate::html::parse_html_with_max_depth(html, self.options.max_depth);
        self.convert(&node)
    }

    /// Add a custom rule
    pub fn add_rule(&mut self, tag: &str, rule: Rule) -> &mut Self {
        self.options.add_rule(tag, rule);
        self
    }

    /// Remove elements with this tag, children included
    pub fn remove(&mut self, tag: &str) -> &mut Self {
        self.options.remove(tag);
        self
    }

    /// Get the current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }
}
