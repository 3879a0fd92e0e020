//! Built-in rules for block and inline elements.

use super::BuiltinRule;
use crate::accessors::lang_from_class;
use crate::node::{Node, NodeRef};
use crate::utilities::{clean_attribute, code_span_fence, collapse_whitespace, escape_markdown};
use crate::walker::{RenderState, Walker};
use crate::Result;

/// Built-in rule for `tag`, if there is one
pub(super) fn rule_for(tag: &str) -> Option<BuiltinRule> {
    let rule: BuiltinRule = match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => heading,
        "p" => paragraph,
        "strong" | "b" => strong,
        "em" | "i" => emphasis,
        "a" => link,
        "img" => image,
        "ul" | "ol" => list,
        "li" => list_item,
        "blockquote" => blockquote,
        "pre" => preformatted,
        "code" => code,
        "table" => table,
        "br" => line_break,
        "hr" => horizontal_rule,
        _ => return None,
    };
    Some(rule)
}

fn heading(node: &NodeRef<'_>, w: &mut Walker<'_>, state: &RenderState) -> Result<()> {
    let level: usize = node.tag()[1..].parse().unwrap_or(1);
    let content = w.capture(|inner| inner.walk_children(node, state))?;
    let content = content.trim().replace('\n', " ");
    if content.is_empty() {
        return Ok(());
    }

    w.start_block()?;
    w.write_str(&"#".repeat(level))?;
    w.write_str(" ")?;
    w.write_str(&content)?;
    w.end_block()
}

fn paragraph(node: &NodeRef<'_>, w: &mut Walker<'_>, state: &RenderState) -> Result<()> {
    if state.in_preformatted {
        return w.walk_children(node, state);
    }
    w.start_block()?;
    w.walk_children(node, state)?;
    w.end_block()
}

fn strong(node: &NodeRef<'_>, w: &mut Walker<'_>, state: &RenderState) -> Result<()> {
    delimited(node, w, state, "**")
}

fn emphasis(node: &NodeRef<'_>, w: &mut Walker<'_>, state: &RenderState) -> Result<()> {
    delimited(node, w, state, "*")
}

fn delimited(node: &NodeRef<'_>, w: &mut Walker<'_>, state: &RenderState, delimiter: &str) -> Result<()> {
    if state.in_preformatted {
        return w.walk_children(node, state);
    }
    w.write_open(delimiter)?;
    w.walk_children(node, state)?;
    w.write_close(delimiter)
}

fn link(node: &NodeRef<'_>, w: &mut Walker<'_>, state: &RenderState) -> Result<()> {
    let href = clean_attribute(node.attr("href"));
    if href.is_empty() || state.in_preformatted {
        return w.walk_children(node, state);
    }

    w.write_open("[")?;
    w.walk_children(node, state)?;
    w.write_close(&format!("]({}{})", destination(&href), title_part(node.node)))
}

fn image(node: &NodeRef<'_>, w: &mut Walker<'_>, _state: &RenderState) -> Result<()> {
    let alt = collapse_whitespace(node.attr("alt").unwrap_or_default());
    let mut src = clean_attribute(node.attr("src"));
    if src.is_empty() {
        // lazy-loaded images keep the real URL in data-src
        src = clean_attribute(node.attr("data-src"));
    }

    w.write_str(&format!(
        "![{}]({}{})",
        escape_markdown(alt.trim()),
        destination(&src),
        title_part(node.node)
    ))
}

/// Link target, in angle brackets when it would otherwise end the link early
fn destination(url: &str) -> String {
    if url.contains(char::is_whitespace) || !balanced_parens(url) {
        format!("<{}>", url.replace('<', "\\<").replace('>', "\\>"))
    } else {
        url.to_string()
    }
}

fn balanced_parens(url: &str) -> bool {
    let mut open = 0usize;
    for c in url.chars() {
        match c {
            '(' => open += 1,
            ')' => match open.checked_sub(1) {
                Some(rest) => open = rest,
                None => return false,
            },
            _ => {}
        }
    }
    open == 0
}

fn title_part(node: &Node) -> String {
    let title = clean_attribute(node.attr("title"));
    if title.is_empty() {
        String::new()
    } else {
        format!(" \"{}\"", title.replace('"', "\\\""))
    }
}

fn list(node: &NodeRef<'_>, w: &mut Walker<'_>, state: &RenderState) -> Result<()> {
    let ordered = node.tag() == "ol";
    let nested = !state.list_context.is_empty();
    let first = if ordered {
        node.attr("start")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1)
    } else {
        1
    };

    if nested {
        w.start_line()?;
    } else {
        w.start_block()?;
    }

    let mut items = state.enter_list(ordered, first);
    for child in node.children() {
        if child.is_text() && child.text.trim().is_empty() {
            continue;
        }
        w.walk(&node.child(child), &items)?;
        if child.is_element() && child.tag == "li" {
            items.advance_item();
        }
    }

    if nested {
        w.start_line()
    } else {
        w.end_block()
    }
}

fn list_item(node: &NodeRef<'_>, w: &mut Walker<'_>, state: &RenderState) -> Result<()> {
    let bullet = w.options().bullet_marker;
    let marker = state
        .current_list()
        .map(|frame| frame.marker(bullet))
        .unwrap_or_else(|| bullet.to_string());

    // two columns per enclosing list and per level of entry depth, or more
    // when a parent marker is wider
    let column = 2 * (state.base_depth + state.list_context.len().saturating_sub(1));
    let outer_indent = w.list_indent;
    let pad = column.saturating_sub(outer_indent);

    w.start_line()?;
    w.write_open(&format!("{}{} ", " ".repeat(pad), marker))?;
    w.block_glue = true;

    let continuation = outer_indent + pad + marker.len() + 1;
    w.list_indent = continuation;
    let result = w.with_prefix(&" ".repeat(continuation - outer_indent), |w| {
        w.walk_children(node, state)
    });
    w.list_indent = outer_indent;
    result?;

    w.block_glue = false;
    w.drop_pending_blank();
    w.end_line()
}

fn blockquote(node: &NodeRef<'_>, w: &mut Walker<'_>, state: &RenderState) -> Result<()> {
    w.start_block()?;
    let quoted = state.quoted();
    w.with_prefix("> ", |w| w.walk_children(node, &quoted))?;
    w.end_block()
}

fn preformatted(node: &NodeRef<'_>, w: &mut Walker<'_>, state: &RenderState) -> Result<()> {
    if state.in_preformatted {
        return w.walk_children(node, state);
    }

    let language = lang_from_class(node.node);
    let raw = w.capture(|inner| inner.walk_children(node, &state.preformatted()))?;
    let code = raw.strip_prefix('\n').unwrap_or(&raw).trim_end();
    if code.is_empty() && language.is_empty() {
        return Ok(());
    }

    w.start_block()?;
    if language.is_empty() {
        let indented: Vec<String> = code
            .lines()
            .map(|line| {
                if line.trim().is_empty() {
                    String::new()
                } else {
                    format!("    {}", line)
                }
            })
            .collect();
        w.write_raw(&indented.join("\n"))?;
    } else {
        let fence = code_span_fence(code);
        let fence = if fence.len() < 3 { "```".to_string() } else { fence };
        if code.is_empty() {
            w.write_raw(&format!("{fence}{language}\n{fence}"))?;
        } else {
            w.write_raw(&format!("{fence}{language}\n{code}\n{fence}"))?;
        }
    }
    w.end_block()
}

fn code(node: &NodeRef<'_>, w: &mut Walker<'_>, state: &RenderState) -> Result<()> {
    if state.in_preformatted {
        return w.walk_children(node, state);
    }

    let mut content = node.text_content();
    if w.options().trim_space {
        content = collapse_whitespace(&content);
    }
    if content.trim().is_empty() {
        return Ok(());
    }

    let fence = code_span_fence(&content);
    let pad = if content.starts_with('`') || content.ends_with('`') {
        " "
    } else {
        ""
    };
    w.write_str(&format!("{fence}{pad}{content}{pad}{fence}"))
}

fn table(node: &NodeRef<'_>, w: &mut Walker<'_>, state: &RenderState) -> Result<()> {
    let mut rows = Vec::new();
    collect_rows(node, w, state, &mut rows)?;

    let Some(columns) = rows.iter().map(Vec::len).max() else {
        return Ok(());
    };

    w.start_block()?;
    for (i, cells) in rows.iter().enumerate() {
        let mut line = String::from("|");
        for c in 0..columns {
            line.push(' ');
            line.push_str(cells.get(c).map(String::as_str).unwrap_or_default());
            line.push_str(" |");
        }
        w.write_str(&line)?;
        w.end_line()?;

        if i == 0 {
            w.write_str(&format!("|{}", " --- |".repeat(columns)))?;
            w.end_line()?;
        }
    }
    w.end_block()
}

/// Render the rows of this table, not of tables nested in its cells. Each
/// cell goes through the walker, so rules and removed tags apply inside it.
fn collect_rows(
    node: &NodeRef<'_>,
    w: &mut Walker<'_>,
    state: &RenderState,
    rows: &mut Vec<Vec<String>>,
) -> Result<()> {
    for child in node.node.element_children() {
        let child_ref = node.child(child);
        match child.tag.as_str() {
            "tr" => {
                let mut cells = Vec::new();
                for cell in child
                    .element_children()
                    .filter(|cell| cell.tag == "th" || cell.tag == "td")
                {
                    let cell_ref = child_ref.child(cell);
                    let rendered = w.capture(|inner| inner.walk(&cell_ref, state))?;
                    cells.push(cell_text(&rendered));
                }
                if !cells.is_empty() {
                    rows.push(cells);
                }
            }
            "table" => {}
            _ => collect_rows(&child_ref, w, state, rows)?,
        }
    }
    Ok(())
}

/// One line per cell, with pipes escaped
fn cell_text(rendered: &str) -> String {
    collapse_whitespace(rendered).trim().replace('|', "\\|")
}

fn line_break(_node: &NodeRef<'_>, w: &mut Walker<'_>, state: &RenderState) -> Result<()> {
    if state.in_preformatted {
        return w.write_raw("\n");
    }
    w.hard_break()
}

fn horizontal_rule(_node: &NodeRef<'_>, w: &mut Walker<'_>, _state: &RenderState) -> Result<()> {
    w.start_block()?;
    w.write_str("---")?;
    w.end_block()
}
