//! HTML parsing support.
//!
//! Builds a [`Node`] tree from an HTML string with scraper/html5ever. The
//! converter itself never parses; this is a convenience for callers that only
//! have markup.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;
use crate::options::DEFAULT_MAX_DEPTH;

/// Parse a complete HTML document into a tree rooted at a document node.
///
/// # Example
///
/// ```rust
/// use markwalk::{parse_html, Converter};
///
/// let node = parse_html("<h1>Hello <em>World</em></h1>");
/// let markdown = Converter::new().convert(&node).unwrap();
/// assert_eq!(markdown, "# Hello *World*");
/// ```
pub fn parse_html(html: &str) -> Node {
    parse_html_with_max_depth(html, DEFAULT_MAX_DEPTH)
}

/// Like [`parse_html`], but elements nested deeper than `max_depth` are left
/// out of the tree. Pass the `max_depth` the tree will be rendered with; the
/// walker would skip those elements anyway.
pub fn parse_html_with_max_depth(html: &str, max_depth: usize) -> Node {
    let document = Html::parse_document(html);
    Node::document().with_child(scraper_to_node(document.root_element(), max_depth))
}

/// Parse an HTML fragment such as `<p>text</p>`, without the implied
/// document structure.
pub fn parse_fragment(html: &str) -> Node {
    let fragment = Html::parse_fragment(html);
    let mut root = Node::document();
    // html5ever wraps fragments in a synthetic <html> element
    let mut wrapper = scraper_to_node(fragment.root_element(), DEFAULT_MAX_DEPTH + 1);
    root.children = std::mem::take(&mut wrapper.children);
    root
}

fn element_node(element: ElementRef<'_>) -> Node {
    let attrs: Vec<(&str, &str)> = element.value().attrs().collect();
    Node::element_with_attrs(element.value().name(), attrs)
}

/// Convert a scraper ElementRef to our Node structure. Uses an explicit
/// stack, so document depth is bounded only by `max_depth`.
fn scraper_to_node(element: ElementRef<'_>, max_depth: usize) -> Node {
    let mut root = element_node(element);
    // open descendants of `root` and the child iterators of every open level
    let mut open: Vec<Node> = Vec::new();
    let mut pending = vec![element.children()];

    while let Some(children) = pending.last_mut() {
        let Some(child) = children.next() else {
            pending.pop();
            if let Some(done) = open.pop() {
                open.last_mut().unwrap_or(&mut root).add_child(done);
            }
            continue;
        };

        match child.value() {
            ScraperNode::Text(text) => {
                open.last_mut().unwrap_or(&mut root).add_child(Node::text(&text.text));
            }
            ScraperNode::Comment(comment) => {
                open.last_mut()
                    .unwrap_or(&mut root)
                    .add_child(Node::comment(&comment.comment));
            }
            ScraperNode::Element(_) if pending.len() < max_depth => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    open.push(element_node(child_element));
                    pending.push(child_element.children());
                }
            }
            _ => {}
        }
    }

    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn test_parse_document_structure() {
        let doc = parse_html("<p>Hello World</p>");
        assert_eq!(doc.kind, NodeKind::Document);
        let html = &doc.children[0];
        assert_eq!(html.tag, "html");
        let tags: Vec<&str> = html.element_children().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, vec!["head", "body"]);
    }

    #[test]
    fn test_parse_fragment_drops_wrapper() {
        let root = parse_fragment("<p class=\"a  b\">Hi</p><!-- note -->");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].tag, "p");
        assert_eq!(root.children[0].attr("class"), Some("a  b"));
        assert_eq!(root.children[1].kind, NodeKind::Comment);
    }

    #[test]
    fn test_attributes_are_kept() {
        let root = parse_fragment("<img data-src=\"lazy.png\" alt=\"x\">");
        let img = &root.children[0];
        assert_eq!(img.attr("data-src"), Some("lazy.png"));
        assert_eq!(img.attr("src"), None);
    }

    #[test]
    fn test_deep_document_is_cut_at_max_depth() {
        let depth = 100_000;
        let html = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let doc = parse_html_with_max_depth(&html, 8);

        let mut levels = 0;
        let mut node = &doc;
        while let Some(child) = node.element_children().last() {
            levels += 1;
            node = child;
        }
        // html, body (the last child of html) and six divs
        assert_eq!(levels, 8);
    }
}
