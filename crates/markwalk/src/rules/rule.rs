//! Render rules: the functions that turn one element into Markdown.

use std::fmt;
use std::sync::Arc;

use crate::node::NodeRef;
use crate::walker::{RenderState, Walker};
use crate::Result;

/// Signature shared by built-in and custom rules.
///
/// A rule writes through the [`Walker`] and decides itself whether to
/// descend, either with [`Walker::walk_children`] or by handing the node back
/// to the built-in behavior with [`Walker::render_builtin`].
pub type RenderFn = dyn Fn(&NodeRef<'_>, &mut Walker<'_>, &RenderState) -> Result<()> + Send + Sync;

/// A caller-supplied render rule, registered per tag on
/// [`Options`](crate::Options).
#[derive(Clone)]
pub struct Rule {
    render: Arc<RenderFn>,
}

impl Rule {
    /// Create a new rule
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&NodeRef<'_>, &mut Walker<'_>, &RenderState) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            render: Arc::new(render),
        }
    }

    /// Surround the rendered children with `before` and `after`
    pub fn wrap(before: &str, after: &str) -> Self {
        let before = before.to_string();
        let after = after.to_string();
        Self::new(move |node, walker, state| {
            walker.write_str(&before)?;
            walker.walk_children(node, state)?;
            walker.write_str(&after)
        })
    }

    /// Apply this rule
    pub fn render(&self, node: &NodeRef<'_>, walker: &mut Walker<'_>, state: &RenderState) -> Result<()> {
        (self.render)(node, walker, state)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Rule(..)")
    }
}
