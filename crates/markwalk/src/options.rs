//! Configuration for a conversion run

use indexmap::IndexMap;

use crate::rules::Rule;

/// Tags whose whole subtree is dropped unless a custom rule claims them
pub const DEFAULT_REMOVED_TAGS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Default bound on element nesting, for rendering and for HTML parsing
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Options for a conversion. Immutable while a conversion runs.
#[derive(Debug, Clone)]
pub struct Options {
    /// Collapse whitespace runs in text and trim it at block boundaries
    pub trim_space: bool,

    /// Per-tag overrides, checked before the built-in rules
    pub custom_rules: IndexMap<String, Rule>,

    /// Elements rendered as nothing, children included
    pub removed_tags: Vec<String>,

    /// Element nesting beyond this depth is not rendered
    pub max_depth: usize,

    /// Marker for unordered list items
    pub bullet_marker: char,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            trim_space: true,
            custom_rules: IndexMap::new(),
            removed_tags: DEFAULT_REMOVED_TAGS.iter().map(|t| t.to_string()).collect(),
            max_depth: DEFAULT_MAX_DEPTH,
            bullet_marker: '-',
        }
    }
}

impl Options {
    /// Register `rule` for `tag`, replacing any earlier rule for it
    pub fn add_rule(&mut self, tag: &str, rule: Rule) -> &mut Self {
        self.custom_rules.insert(tag.to_lowercase(), rule);
        self
    }

    /// Drop elements with `tag` from the output
    pub fn remove(&mut self, tag: &str) -> &mut Self {
        let tag = tag.to_lowercase();
        if !self.removed_tags.contains(&tag) {
            self.removed_tags.push(tag);
        }
        self
    }

    pub fn custom_rule(&self, tag: &str) -> Option<&Rule> {
        self.custom_rules.get(tag)
    }

    pub fn is_removed(&self, tag: &str) -> bool {
        self.removed_tags.iter().any(|t| t == tag)
    }
}
