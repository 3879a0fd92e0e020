//! Owned HTML node tree and a borrowed view that knows its ancestors.
//!
//! Any parser (scraper, html5ever, CDP, ...) can convert its output to this
//! structure. The tree owns its children; parent links only exist while a
//! traversal is in progress, as a chain of [`NodeRef`]s on the stack.

use indexmap::IndexMap;

/// Kind of a node in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of a parsed document or fragment
    Document,
    /// Element such as `<p>` or `<table>`
    Element,
    /// Character data
    Text,
    /// `<!-- ... -->`, never rendered
    Comment,
}

/// One node of an HTML tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,

    /// Lowercase tag name, empty unless `kind` is [`NodeKind::Element`]
    pub tag: String,

    /// Attributes keyed by lowercase name, in document order
    pub attributes: IndexMap<String, String>,

    /// Character data for text and comment nodes
    pub text: String,

    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Node {
    fn new(kind: NodeKind, tag: &str, text: &str) -> Self {
        Self {
            kind,
            tag: tag.to_lowercase(),
            attributes: IndexMap::new(),
            text: text.to_string(),
            children: Vec::new(),
        }
    }

    /// Create an empty document root
    pub fn document() -> Self {
        Self::new(NodeKind::Document, "", "")
    }

    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self::new(NodeKind::Element, tag_name, "")
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut node = Self::element(tag_name);
        for (name, value) in attrs {
            node.set_attr(name, value);
        }
        node
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::new(NodeKind::Text, "", content)
    }

    /// Create a new comment node
    pub fn comment(content: &str) -> Self {
        Self::new(NodeKind::Comment, "", content)
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        if self.attributes.is_empty() {
            return None;
        }
        self.attributes
            .get(name)
            .or_else(|| self.attributes.get(&name.to_lowercase()))
            .map(String::as_str)
    }

    /// Check if an attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Get all child nodes
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().filter(|n| n.is_element())
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Builder form of [`Node::add_child`]
    pub fn with_child(mut self, child: Node) -> Self {
        self.add_child(child);
        self
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes
            .insert(name.to_lowercase(), value.to_string());
    }

    /// Concatenated character data of this node and its descendants.
    /// Comments contribute nothing.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node.kind {
                NodeKind::Text => out.push_str(&node.text),
                NodeKind::Comment => {}
                NodeKind::Document | NodeKind::Element => {
                    stack.extend(node.children.iter().rev());
                }
            }
        }
        out
    }
}

/// A reference to a node with its ancestor chain.
///
/// Built by the walker while it descends; `parent` is `None` for the node the
/// traversal started at.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    /// The node itself
    pub node: &'a Node,
    parent: Option<&'a NodeRef<'a>>,
}

impl<'a> NodeRef<'a> {
    /// Create a NodeRef without parent context
    pub fn new(node: &'a Node) -> Self {
        Self { node, parent: None }
    }

    /// View `child` as a child of this node
    pub fn child<'b>(&'b self, child: &'b Node) -> NodeRef<'b> {
        NodeRef {
            node: child,
            parent: Some(self),
        }
    }

    pub fn parent(&self) -> Option<&'a NodeRef<'a>> {
        self.parent
    }

    /// Iterate over the ancestors, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &'a NodeRef<'a>> {
        std::iter::successors(self.parent, |n| n.parent)
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind
    }

    pub fn tag(&self) -> &'a str {
        &self.node.tag
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attr(name)
    }

    pub fn children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.children.iter()
    }

    pub fn text_content(&self) -> String {
        self.node.text_content()
    }
}
