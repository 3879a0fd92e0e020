//! Rule resolution for element nodes.
//!
//! Lookup order for a tag: a custom rule registered on [`Options`], then
//! removal via `removed_tags`, then the built-in table. Tags matching none of
//! these are transparent and only their children are rendered.

mod builtin;
mod rule;

pub use rule::{RenderFn, Rule};

use crate::node::NodeRef;
use crate::options::Options;
use crate::walker::{RenderState, Walker};
use crate::Result;

/// A built-in rule
pub(crate) type BuiltinRule = fn(&NodeRef<'_>, &mut Walker<'_>, &RenderState) -> Result<()>;

/// What to do with an element
pub(crate) enum Resolved<'o> {
    Custom(&'o Rule),
    Removed,
    Builtin(BuiltinRule),
    Transparent,
}

pub(crate) fn resolve<'o>(options: &'o Options, tag: &str) -> Resolved<'o> {
    match options.custom_rule(tag) {
        Some(rule) => Resolved::Custom(rule),
        None => resolve_builtin(options, tag),
    }
}

/// Resolution with custom rules ignored
pub(crate) fn resolve_builtin<'o>(options: &'o Options, tag: &str) -> Resolved<'o> {
    if options.is_removed(tag) {
        return Resolved::Removed;
    }
    match builtin::rule_for(tag) {
        Some(rule) => Resolved::Builtin(rule),
        None => Resolved::Transparent,
    }
}

/// Whether `tag` has a built-in rule
pub fn has_builtin_rule(tag: &str) -> bool {
    builtin::rule_for(&tag.to_lowercase()).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_rule_wins() {
        let mut options = Options::default();
        options.add_rule("p", Rule::wrap("", ""));
        assert!(matches!(resolve(&options, "p"), Resolved::Custom(_)));
        assert!(matches!(resolve_builtin(&options, "p"), Resolved::Builtin(_)));
    }

    #[test]
    fn test_custom_rule_beats_removal() {
        let mut options = Options::default();
        options.add_rule("script", Rule::wrap("", ""));
        assert!(matches!(resolve(&options, "script"), Resolved::Custom(_)));
        assert!(matches!(resolve_builtin(&options, "script"), Resolved::Removed));
    }

    #[test]
    fn test_unknown_tag_is_transparent() {
        let options = Options::default();
        assert!(matches!(resolve(&options, "section"), Resolved::Transparent));
        assert!(matches!(resolve(&options, "span"), Resolved::Transparent));
    }

    #[test]
    fn test_has_builtin_rule() {
        for tag in ["h1", "H6", "p", "b", "strong", "em", "i", "a", "img", "ul", "ol", "li"] {
            assert!(has_builtin_rule(tag), "{tag}");
        }
        for tag in ["blockquote", "pre", "table", "code", "br", "hr"] {
            assert!(has_builtin_rule(tag), "{tag}");
        }
        assert!(!has_builtin_rule("div"));
        assert!(!has_builtin_rule("h7"));
    }
}
