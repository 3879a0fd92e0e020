//! # markwalk
//!
//! Convert HTML node trees to Markdown.
//!
//! A [`Walker`] visits the tree depth-first and renders each element with the
//! rule registered for its tag: a caller-supplied [`Rule`] if there is one,
//! otherwise the built-in rule, otherwise the element is transparent and only
//! its children are rendered. Custom rules can hand control back to the
//! default behavior for the node's children or for the node itself.
//!
//! Output is written incrementally to any [`std::io::Write`] sink.
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use markwalk::{Converter, Node};
//!
//! let h1 = Node::element("h1").with_child(Node::text("Hello World"));
//!
//! let markdown = Converter::new().convert(&h1).unwrap();
//! assert_eq!(markdown, "# Hello World");
//! ```
//!
//! ## Example (custom rule)
//!
//! ```rust
//! use markwalk::{Converter, Node, Rule};
//!
//! let mut converter = Converter::new();
//! converter.add_rule(
//!     "b",
//!     Rule::new(|node, walker, state| {
//!         walker.write_str("*")?;
//!         walker.walk_children(node, state)?;
//!         walker.write_str("*")
//!     }),
//! );
//!
//! let b = Node::element("b").with_child(Node::text("test"));
//! assert_eq!(converter.convert(&b).unwrap(), "*test*");
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use markwalk::Converter;
//!
//! let markdown = Converter::new().convert_html("<h1>Hello World</h1>").unwrap();
//! assert_eq!(markdown, "# Hello World");
//! ```

pub mod accessors;
#[cfg(feature = "html")]
pub mod html;
pub mod node;
mod options;
mod rules;
mod service;
mod utilities;
mod walker;

pub use accessors::{attr, has_class, is_child_of, lang_from_class};
#[cfg(feature = "html")]
pub use html::{parse_fragment, parse_html, parse_html_with_max_depth};
pub use node::{Node, NodeKind, NodeRef};
pub use options::{Options, DEFAULT_MAX_DEPTH, DEFAULT_REMOVED_TAGS};
pub use rules::{has_builtin_rule, RenderFn, Rule};
pub use service::Converter;
pub use utilities::{collapse_whitespace, escape_markdown};
pub use walker::{walk, ListFrame, RenderState, Walker};

/// Error type for markwalk operations
#[derive(Debug, thiserror::Error)]
pub enum MarkwalkError {
    #[error("Write error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rule produced invalid UTF-8: {0}")]
    InvalidOutput(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, MarkwalkError>;
