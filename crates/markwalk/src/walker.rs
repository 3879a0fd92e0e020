//! The recursive traversal that drives a conversion.
//!
//! The [`Walker`] owns the output position: the current line prefix (quote
//! markers, list continuation indent), whether a blank line or a space is
//! still owed, and how deep the traversal is. Everything a rule needs to know
//! about its surroundings travels in a [`RenderState`], which is passed down
//! by reference and only ever replaced by a derived copy, so siblings never
//! see each other's changes.

use std::io::Write;

use log::{trace, warn};

use crate::node::{Node, NodeKind, NodeRef};
use crate::options::Options;
use crate::rules::{resolve, resolve_builtin, Resolved};
use crate::utilities::{collapse_whitespace, escape_markdown};
use crate::Result;

/// One enclosing list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFrame {
    pub ordered: bool,
    /// Number of the item being rendered, starting from the list's `start`
    pub number: usize,
}

impl ListFrame {
    /// Marker for the current item: `-` style bullet or `<n>.`
    pub fn marker(&self, bullet: char) -> String {
        if self.ordered {
            format!("{}.", self.number)
        } else {
            bullet.to_string()
        }
    }
}

/// Context threaded through the recursion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    /// Enclosing lists and blockquotes
    pub nesting_depth: usize,
    /// Depth the traversal started at. Lists are indented two columns per
    /// level of it, so a fragment can be rendered for a nested position.
    pub base_depth: usize,
    /// Enclosing lists, innermost last
    pub list_context: Vec<ListFrame>,
    /// Inside `pre`: text is written verbatim
    pub in_preformatted: bool,
}

impl RenderState {
    pub fn new(nesting_depth: usize) -> Self {
        Self {
            nesting_depth,
            base_depth: nesting_depth,
            ..Default::default()
        }
    }

    /// State for the items of a new list. `first` is the number of the first
    /// item.
    pub fn enter_list(&self, ordered: bool, first: usize) -> Self {
        let mut state = self.clone();
        state.nesting_depth += 1;
        state.list_context.push(ListFrame {
            ordered,
            number: first,
        });
        state
    }

    /// Move the innermost list on to its next item
    pub fn advance_item(&mut self) {
        if let Some(frame) = self.list_context.last_mut() {
            frame.number += 1;
        }
    }

    pub fn current_list(&self) -> Option<&ListFrame> {
        self.list_context.last()
    }

    pub fn quoted(&self) -> Self {
        let mut state = self.clone();
        state.nesting_depth += 1;
        state
    }

    pub fn preformatted(&self) -> Self {
        let mut state = self.clone();
        state.in_preformatted = true;
        state
    }
}

/// Render `node` into `out`.
///
/// `nesting_depth` is the depth the node is considered to sit at; top-level
/// conversions start at 0. Nothing is buffered beyond what block rules need
/// to decide on their own layout, and the sink is flushed on success.
pub fn walk(node: &Node, out: &mut dyn Write, nesting_depth: usize, options: &Options) -> Result<()> {
    let mut walker = Walker::new(out, options);
    walker.walk(&NodeRef::new(node), &RenderState::new(nesting_depth))?;
    walker.finish()
}

/// Output cursor and dispatcher for one conversion.
pub struct Walker<'w> {
    out: &'w mut dyn Write,
    options: &'w Options,

    prefix: String,
    pub(crate) list_indent: usize,

    at_line_start: bool,
    trailing_newlines: usize,
    wrote_any: bool,

    pending_blank: bool,
    pending_space: bool,
    /// Leading whitespace of the next text is dropped
    glue: bool,
    /// Set right after a list marker so the item's first block stays on the
    /// marker line
    pub(crate) block_glue: bool,

    depth: usize,
    truncated: bool,
}

impl<'w> Walker<'w> {
    pub fn new(out: &'w mut dyn Write, options: &'w Options) -> Self {
        Self {
            out,
            options,
            prefix: String::new(),
            list_indent: 0,
            at_line_start: true,
            trailing_newlines: 0,
            wrote_any: false,
            pending_blank: false,
            pending_space: false,
            glue: true,
            block_glue: false,
            depth: 0,
            truncated: false,
        }
    }

    pub fn options(&self) -> &'w Options {
        self.options
    }

    /// Render one node: text is escaped, comments vanish, elements go
    /// through rule resolution.
    pub fn walk(&mut self, node: &NodeRef<'_>, state: &RenderState) -> Result<()> {
        match node.kind() {
            NodeKind::Text => self.write_text(&node.node.text, state),
            NodeKind::Comment => Ok(()),
            NodeKind::Document => self.walk_children(node, state),
            NodeKind::Element => {
                if self.depth >= self.options.max_depth {
                    if !self.truncated {
                        warn!(
                            "element nesting exceeds {} levels, truncating <{}>",
                            self.options.max_depth,
                            node.tag()
                        );
                        self.truncated = true;
                    }
                    return Ok(());
                }

                self.depth += 1;
                let result = self.apply(resolve(self.options, node.tag()), node, state);
                self.depth -= 1;
                result
            }
        }
    }

    /// Render every child of `node` in document order
    pub fn walk_children(&mut self, node: &NodeRef<'_>, state: &RenderState) -> Result<()> {
        for child in node.children() {
            self.walk(&node.child(child), state)?;
        }
        Ok(())
    }

    /// Render `node` as if no custom rule existed for its tag. Custom rules
    /// still apply to its descendants.
    pub fn render_builtin(&mut self, node: &NodeRef<'_>, state: &RenderState) -> Result<()> {
        self.apply(resolve_builtin(self.options, node.tag()), node, state)
    }

    fn apply(&mut self, resolved: Resolved<'w>, node: &NodeRef<'_>, state: &RenderState) -> Result<()> {
        match resolved {
            Resolved::Custom(rule) => {
                trace!("custom rule for <{}>", node.tag());
                rule.render(node, self, state)
            }
            Resolved::Removed => Ok(()),
            Resolved::Builtin(rule) => rule(node, self, state),
            Resolved::Transparent => self.walk_children(node, state),
        }
    }

    /// Run `f` against a fresh walker writing into a buffer and return what
    /// it wrote. The buffer starts at a line start with no prefix.
    pub fn capture<F>(&mut self, f: F) -> Result<String>
    where
        F: FnOnce(&mut Walker<'_>) -> Result<()>,
    {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut inner = Walker::new(&mut buf, self.options);
            inner.depth = self.depth;
            inner.truncated = self.truncated;
            f(&mut inner)?;
            self.truncated = inner.truncated;
        }
        Ok(String::from_utf8(buf)?)
    }

    /// Write inline Markdown as-is, after any owed blank line or space.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        if s.is_empty() {
            return Ok(());
        }
        self.flush_pending()?;
        self.emit(s)?;
        self.glue = self.at_line_start;
        Ok(())
    }

    /// Write an opening delimiter; whitespace right after it is dropped.
    pub fn write_open(&mut self, s: &str) -> Result<()> {
        self.write_str(s)?;
        self.glue = true;
        Ok(())
    }

    /// Write a closing delimiter. A space owed before it moves after it.
    pub fn write_close(&mut self, s: &str) -> Result<()> {
        let owed = std::mem::take(&mut self.pending_space);
        self.write_str(s)?;
        self.pending_space = owed;
        Ok(())
    }

    /// Write a text node's data.
    pub fn write_text(&mut self, text: &str, state: &RenderState) -> Result<()> {
        if state.in_preformatted {
            self.flush_pending()?;
            return self.emit(text);
        }
        if !self.options.trim_space {
            return self.write_str(&escape_markdown(text));
        }

        let collapsed = collapse_whitespace(text);
        let core = collapsed.trim();
        if collapsed.starts_with(' ') && !self.glue && !self.at_line_start {
            self.pending_space = true;
        }
        if core.is_empty() {
            return Ok(());
        }
        self.write_str(&escape_markdown(core))?;
        if collapsed.ends_with(' ') {
            self.pending_space = true;
        }
        Ok(())
    }

    /// Write text verbatim, line structure included (code block bodies).
    pub fn write_raw(&mut self, s: &str) -> Result<()> {
        self.flush_pending()?;
        self.emit(s)
    }

    /// Markdown hard line break
    pub fn hard_break(&mut self) -> Result<()> {
        self.pending_space = false;
        self.flush_pending()?;
        self.emit("  \n")?;
        self.glue = true;
        Ok(())
    }

    /// Begin a block: end the current line and leave one blank line,
    /// unless nothing has been written yet or a list marker is waiting for
    /// the item's first block.
    pub fn start_block(&mut self) -> Result<()> {
        if self.block_glue {
            return Ok(());
        }
        self.pending_space = false;
        self.pending_blank = false;
        if self.wrote_any {
            self.end_line()?;
            if self.trailing_newlines < 2 {
                self.emit("\n")?;
            }
        }
        self.glue = true;
        Ok(())
    }

    /// Finish a block. The blank line after it is only written if more
    /// content follows.
    pub fn end_block(&mut self) -> Result<()> {
        self.block_glue = false;
        self.end_line()?;
        self.pending_blank = true;
        Ok(())
    }

    /// Make sure the next output starts on a fresh line, without a blank one
    pub fn start_line(&mut self) -> Result<()> {
        if self.block_glue {
            return Ok(());
        }
        self.end_line()
    }

    pub(crate) fn end_line(&mut self) -> Result<()> {
        self.pending_space = false;
        if !self.at_line_start {
            self.emit("\n")?;
        }
        self.glue = true;
        Ok(())
    }

    pub(crate) fn drop_pending_blank(&mut self) {
        self.pending_blank = false;
    }

    /// Run `f` with `prefix` added to the start of every line it writes
    pub fn with_prefix<F>(&mut self, prefix: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let saved = self.prefix.len();
        self.prefix.push_str(prefix);
        let result = f(self);
        self.prefix.truncate(saved);
        result
    }

    /// Flush the sink. Owed blank lines and spaces are discarded.
    pub fn finish(self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn flush_pending(&mut self) -> Result<()> {
        if std::mem::take(&mut self.pending_blank) && self.wrote_any {
            if !self.at_line_start {
                self.emit("\n")?;
            }
            if self.trailing_newlines < 2 {
                self.emit("\n")?;
            }
        }
        if std::mem::take(&mut self.pending_space) && !self.at_line_start {
            self.emit(" ")?;
        }
        Ok(())
    }

    /// Lowest-level write: applies the line prefix and tracks the position.
    fn emit(&mut self, s: &str) -> Result<()> {
        for piece in s.split_inclusive('\n') {
            let (content, newline) = match piece.strip_suffix('\n') {
                Some(content) => (content, true),
                None => (piece, false),
            };

            if !content.is_empty() {
                if self.at_line_start {
                    self.out.write_all(self.prefix.as_bytes())?;
                }
                self.out.write_all(content.as_bytes())?;
                self.at_line_start = false;
                self.trailing_newlines = 0;
                self.wrote_any = true;
                self.block_glue = false;
            }

            if newline {
                if self.at_line_start {
                    self.out.write_all(self.prefix.trim_end().as_bytes())?;
                }
                self.out.write_all(b"\n")?;
                self.at_line_start = true;
                self.trailing_newlines += 1;
                self.wrote_any = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use crate::MarkwalkError;
    use pretty_assertions::assert_eq;
    use std::io;

    fn render(node: &Node, options: &Options) -> String {
        let mut out = Vec::new();
        walk(node, &mut out, 0, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn bold(text: &str) -> Node {
        Node::element("b").with_child(Node::text(text))
    }

    #[test]
    fn test_walk_builtin_bold() {
        assert_eq!(render(&bold("test"), &Options::default()), "**test**");
    }

    #[test]
    fn test_walk_custom_rule_delegates_to_children() {
        let mut options = Options::default();
        options.add_rule(
            "b",
            Rule::new(|node, walker, state| {
                walker.write_str("*")?;
                walker.walk_children(node, state)?;
                walker.write_str("*")
            }),
        );
        assert_eq!(render(&bold("test"), &options), "*test*");
    }

    #[test]
    fn test_custom_rule_owns_subtree() {
        let mut options = Options::default();
        options.add_rule("div", Rule::new(|_, walker, _| walker.write_str("[div]")));
        let div = Node::element("div").with_child(bold("hidden"));
        assert_eq!(render(&div, &options), "[div]");
    }

    #[test]
    fn test_custom_rule_can_defer_to_builtin() {
        let mut options = Options::default();
        options.add_rule(
            "a",
            Rule::new(|node, walker, state| {
                walker.write_str("<")?;
                walker.render_builtin(node, state)?;
                walker.write_str(">")
            }),
        );
        let a = Node::element_with_attrs("a", vec![("href", "https://example.com")])
            .with_child(Node::text("site"));
        assert_eq!(render(&a, &options), "<[site](https://example.com)>");
    }

    #[test]
    fn test_nested_custom_rules_see_only_threaded_state() {
        let mut options = Options::default();
        options.add_rule("i", Rule::wrap("/", "/"));
        options.add_rule(
            "b",
            Rule::new(|node, walker, state| {
                walker.write_str(&format!("{}{}", state.nesting_depth, state.in_preformatted))?;
                walker.walk_children(node, state)
            }),
        );
        let i = Node::element("i").with_child(bold("x"));
        assert_eq!(render(&i, &options), "/0falsex/");
    }

    #[test]
    fn test_custom_rule_receives_nesting_depth() {
        let mut options = Options::default();
        options.add_rule(
            "span",
            Rule::new(|_, walker, state| walker.write_str(&state.nesting_depth.to_string())),
        );
        let ul = Node::element("ul")
            .with_child(Node::element("li").with_child(Node::element("span")));
        assert_eq!(render(&ul, &options), "- 1\n");
    }

    #[test]
    fn test_safe_text_is_identity() {
        let text = "Hello, world. 1 + 2 = 3! Done: yes";
        assert_eq!(render(&Node::text(text), &Options::default()), text);
    }

    #[test]
    fn test_text_is_escaped() {
        let p = Node::text("a*b_c [d](e) #f \\g");
        assert_eq!(
            render(&p, &Options::default()),
            "a\\*b\\_c \\[d\\]\\(e\\) \\#f \\\\g"
        );
    }

    #[test]
    fn test_comment_renders_nothing() {
        let div = Node::element("div")
            .with_child(Node::text("a"))
            .with_child(Node::comment("ignored"))
            .with_child(Node::text("b"));
        assert_eq!(render(&div, &Options::default()), "ab");
    }

    #[test]
    fn test_trim_space_collapses_inline_runs() {
        let p = Node::element("p")
            .with_child(Node::text("  Hello   "))
            .with_child(bold("World"))
            .with_child(Node::text("  "));
        assert_eq!(render(&p, &Options::default()), "Hello **World**\n");
    }

    #[test]
    fn test_trailing_space_moves_outside_delimiter() {
        let p = Node::element("p")
            .with_child(bold("bold "))
            .with_child(Node::text("next"));
        assert_eq!(render(&p, &Options::default()), "**bold** next\n");
    }

    #[test]
    fn test_without_trim_space_text_is_verbatim() {
        let options = Options {
            trim_space: false,
            ..Default::default()
        };
        let p = Node::element("p").with_child(Node::text("a  b"));
        assert_eq!(render(&p, &options), "a  b\n");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render(&Node::document(), &Options::default()), "");
    }

    #[test]
    fn test_max_depth_truncates() {
        let options = Options {
            max_depth: 2,
            ..Default::default()
        };
        let tree = Node::element("div")
            .with_child(Node::text("top"))
            .with_child(
                Node::element("div")
                    .with_child(Node::text("mid"))
                    .with_child(Node::element("div").with_child(Node::text("deep"))),
            );
        assert_eq!(render(&tree, &options), "topmid");
    }

    #[test]
    fn test_list_state_is_not_shared_between_siblings() {
        let state = RenderState::new(0);
        let mut first = state.enter_list(true, 1);
        let second = state.enter_list(false, 1);
        first.advance_item();

        assert_eq!(first.current_list().map(|f| f.number), Some(2));
        assert_eq!(second.current_list().map(|f| f.number), Some(1));
        assert!(state.current_list().is_none());
        assert_eq!(first.nesting_depth, 1);
    }

    #[test]
    fn test_entry_depth_indents_lists() {
        let ul = Node::element("ul")
            .with_child(Node::element("li").with_child(Node::text("a")));
        let at_depth = |depth| {
            let mut out = Vec::new();
            walk(&ul, &mut out, depth, &Options::default()).unwrap();
            String::from_utf8(out).unwrap()
        };

        assert_eq!(at_depth(0), "- a\n");
        assert_eq!(at_depth(1), "  - a\n");
        assert_eq!(at_depth(3), "      - a\n");
    }

    #[test]
    fn test_ordered_marker_uses_start_number() {
        let frame = ListFrame {
            ordered: true,
            number: 0,
        };
        assert_eq!(frame.marker('-'), "0.");
    }

    struct FailingSink;

    impl io::Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let err = walk(&bold("x"), &mut FailingSink, 0, &Options::default()).unwrap_err();
        assert!(matches!(err, MarkwalkError::Io(_)));
    }

    #[test]
    fn test_prefix_applies_to_each_line() {
        let options = Options::default();
        let mut out = Vec::new();
        {
            let mut walker = Walker::new(&mut out, &options);
            walker
                .with_prefix("> ", |w| w.write_raw("one\n\ntwo"))
                .unwrap();
            walker.finish().unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "> one\n>\n> two");
    }
}
