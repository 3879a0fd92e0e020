//! Read-only queries over nodes: attributes, classes and ancestry.
//!
//! None of these fail. Missing attributes read as the empty string and a
//! node without ancestors is never the child of anything.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::{Node, NodeRef};

static LANGUAGE_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)language-(\S+)").expect("LANGUAGE_CLASS: hardcoded regex is valid")
});

/// Value of attribute `name`, or `""` when it is absent.
pub fn attr<'a>(node: &'a Node, name: &str) -> &'a str {
    node.attr(name).unwrap_or_default()
}

/// Whether `name` is one of the whitespace-separated tokens of the
/// node's `class` attribute.
pub fn has_class(node: &Node, name: &str) -> bool {
    attr(node, "class").split_whitespace().any(|c| c == name)
}

/// Whether any ancestor of `node` (not `node` itself) has tag `ancestor_tag`.
pub fn is_child_of(node: &NodeRef<'_>, ancestor_tag: &str) -> bool {
    node.ancestors()
        .any(|a| a.tag().eq_ignore_ascii_case(ancestor_tag))
}

/// Language named by a `language-<X>` class on the first `code` child of
/// `pre`, falling back to `pre` itself. Returns `""` when neither has one.
pub fn lang_from_class(pre: &Node) -> &str {
    pre.element_children()
        .find(|c| c.tag == "code")
        .and_then(|code| language_token(attr(code, "class")))
        .or_else(|| language_token(attr(pre, "class")))
        .unwrap_or_default()
}

fn language_token(class: &str) -> Option<&str> {
    LANGUAGE_CLASS
        .captures(class)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
