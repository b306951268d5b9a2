//! Node rendering functions.

use blogmark_core::tree::{Align, ContainerDirective, Heading, List, ListItem, Table};
use blogmark_core::{Node, Properties, PropertyValue};

use super::{Context, RenderOptions};

/// Renders a whole tree to an HTML string with default options.
pub fn to_html(node: &Node) -> String {
    to_html_with(node, RenderOptions::default())
}

/// Renders a whole tree to an HTML string.
pub fn to_html_with(node: &Node, options: RenderOptions) -> String {
    let mut ctx = Context::with_options(options);
    render_node(node, &mut ctx);
    ctx.finish()
}

/// True for names usable as an element: ASCII letter, then letters, digits or `-`.
pub fn is_valid_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn render_children(children: &[Node], ctx: &mut Context) {
    for child in children {
        render_node(child, ctx);
    }
}

fn render_wrapped(tag: &str, children: &[Node], ctx: &mut Context) {
    ctx.push_raw("<");
    ctx.push_raw(tag);
    ctx.push_raw(">");
    render_children(children, ctx);
    ctx.push_raw("</");
    ctx.push_raw(tag);
    ctx.push_raw(">");
}

/// Renders a container directive.
///
/// Directives use `hName`/`hProperties`. One the transforms never touched
/// becomes a `<div>` carrying its own attributes.
fn render_directive(directive: &ContainerDirective, ctx: &mut Context) {
    let tag = match directive.data.h_name.as_deref() {
        Some(name) if is_valid_tag_name(name) => name,
        Some(name) => {
            log::warn!(
                "Invalid hName {:?} on ':::{}', rendering as div",
                name,
                directive.name
            );
            "div"
        }
        None => "div",
    };

    ctx.push_raw("<");
    ctx.push_raw(tag);
    match &directive.data.h_properties {
        Some(properties) => ctx.push_properties(properties),
        None => {
            let attributes: Properties = directive
                .attributes
                .iter()
                .map(|(name, value)| (name.clone(), PropertyValue::Text(value.clone())))
                .collect();
            ctx.push_properties(&attributes);
        }
    }
    ctx.push_raw(">");
    render_children(&directive.children, ctx);
    ctx.push_raw("</");
    ctx.push_raw(tag);
    ctx.push_raw(">");
}

fn render_heading(heading: &Heading, ctx: &mut Context) {
    let tag = format!("h{}", heading.depth.clamp(1, 6));
    ctx.push_raw("<");
    ctx.push_raw(&tag);
    if let Some(properties) = &heading.data.h_properties {
        ctx.push_properties(properties);
    }
    ctx.push_raw(">");
    render_children(&heading.children, ctx);
    ctx.push_raw("</");
    ctx.push_raw(&tag);
    ctx.push_raw(">");
}

/// Math is left as `language-math` code for a downstream typesetter. With copy
/// text on, the code sits in a container followed by the delimited source.
fn render_math(value: &str, display: bool, ctx: &mut Context) {
    let copy_text = ctx.options().math_copy_text;
    if copy_text {
        ctx.push_raw(if display {
            "<div class=\"math math-display\">"
        } else {
            "<span class=\"math math-inline\">"
        });
    }

    if display {
        ctx.push_raw("<pre><code class=\"language-math math-display\">");
    } else {
        ctx.push_raw("<code class=\"language-math math-inline\">");
    }
    ctx.push_text(value);
    ctx.push_raw(if display { "</code></pre>" } else { "</code>" });

    if copy_text {
        let (open, close) = if display { ("$$\n", "\n$$") } else { ("$", "$") };
        ctx.push_raw("<mjx-copytext aria-hidden=\"true\" style=\"white-space: pre-wrap\">");
        ctx.push_text(open);
        ctx.push_text(value);
        ctx.push_text(close);
        ctx.push_raw("</mjx-copytext>");
        ctx.push_raw(if display { "</div>" } else { "</span>" });
    }
}

fn render_list(list: &List, ctx: &mut Context) {
    let tag = if list.ordered { "ol" } else { "ul" };
    ctx.push_raw("<");
    ctx.push_raw(tag);
    if let Some(start) = list.start.filter(|start| list.ordered && *start != 1) {
        ctx.push_attr("start", &start.to_string());
    }
    ctx.push_raw(">");
    for child in &list.children {
        match child {
            Node::ListItem(item) => render_list_item(item, list.spread, ctx),
            other => render_node(other, ctx),
        }
    }
    ctx.push_raw("</");
    ctx.push_raw(tag);
    ctx.push_raw(">");
}

/// Paragraphs in tight lists render without `<p>`.
fn render_list_item(item: &ListItem, list_spread: bool, ctx: &mut Context) {
    let tight = !list_spread && !item.spread;
    ctx.push_raw("<li>");
    if let Some(checked) = item.checked {
        ctx.push_raw("<input type=\"checkbox\" disabled");
        if checked {
            ctx.push_raw(" checked");
        }
        ctx.push_raw(" /> ");
    }
    for child in &item.children {
        match child {
            Node::Paragraph(p) if tight => render_children(&p.children, ctx),
            other => render_node(other, ctx),
        }
    }
    ctx.push_raw("</li>");
}

fn align_name(align: Align) -> &'static str {
    match align {
        Align::Left => "left",
        Align::Right => "right",
        Align::Center => "center",
    }
}

fn render_table_row(row: &Node, cell_tag: &str, align: &[Option<Align>], ctx: &mut Context) {
    let Some(cells) = row.children() else {
        return;
    };
    ctx.push_raw("<tr>");
    for (index, cell) in cells.iter().enumerate() {
        ctx.push_raw("<");
        ctx.push_raw(cell_tag);
        if let Some(Some(a)) = align.get(index) {
            ctx.push_attr("align", align_name(*a));
        }
        ctx.push_raw(">");
        if let Some(children) = cell.children() {
            render_children(children, ctx);
        }
        ctx.push_raw("</");
        ctx.push_raw(cell_tag);
        ctx.push_raw(">");
    }
    ctx.push_raw("</tr>");
}

fn render_table(table: &Table, ctx: &mut Context) {
    ctx.push_raw("<table>");
    if let Some(head) = table.children.first() {
        ctx.push_raw("<thead>");
        render_table_row(head, "th", &table.align, ctx);
        ctx.push_raw("</thead>");
    }
    if table.children.len() > 1 {
        ctx.push_raw("<tbody>");
        for row in table.children.iter().skip(1) {
            render_table_row(row, "td", &table.align, ctx);
        }
        ctx.push_raw("</tbody>");
    }
    ctx.push_raw("</table>");
}

/// Recursively renders a node to HTML.
pub fn render_node(node: &Node, ctx: &mut Context) {
    match node {
        Node::Root(root) => render_children(&root.children, ctx),
        Node::Paragraph(p) => render_wrapped("p", &p.children, ctx),
        Node::Heading(h) => render_heading(h, ctx),
        Node::Blockquote(q) => render_wrapped("blockquote", &q.children, ctx),
        Node::List(list) => render_list(list, ctx),
        Node::ListItem(item) => render_list_item(item, true, ctx),
        Node::Emphasis(e) => render_wrapped("em", &e.children, ctx),
        Node::Strong(s) => render_wrapped("strong", &s.children, ctx),
        Node::Delete(d) => render_wrapped("del", &d.children, ctx),
        Node::Link(link) => {
            ctx.push_raw("<a");
            ctx.push_attr("href", &link.url);
            if let Some(title) = &link.title {
                ctx.push_attr("title", title);
            }
            ctx.push_raw(">");
            render_children(&link.children, ctx);
            ctx.push_raw("</a>");
        }
        Node::Image(img) => {
            ctx.push_raw("<img");
            ctx.push_attr("src", &img.url);
            ctx.push_attr("alt", &img.alt);
            if let Some(title) = &img.title {
                ctx.push_attr("title", title);
            }
            ctx.push_raw(" />");
        }
        Node::Text(text) => ctx.push_text(&text.value),
        Node::InlineCode(code) => {
            ctx.push_raw("<code>");
            ctx.push_text(&code.value);
            ctx.push_raw("</code>");
        }
        Node::Code(code) => {
            ctx.push_raw("<pre><code");
            if let Some(lang) = &code.lang {
                ctx.push_attr("class", &format!("language-{}", lang));
            }
            ctx.push_raw(">");
            if !code.value.is_empty() {
                ctx.push_text(&code.value);
                ctx.push_raw("\n");
            }
            ctx.push_raw("</code></pre>");
        }
        Node::Html(html) => ctx.push_raw(&html.value),
        Node::Math(math) => render_math(&math.value, true, ctx),
        Node::InlineMath(math) => render_math(&math.value, false, ctx),
        Node::Yaml(_) => {}
        Node::Break => ctx.push_raw("<br />"),
        Node::ThematicBreak => ctx.push_raw("<hr />"),
        Node::Table(table) => render_table(table, ctx),
        Node::TableRow(row) => render_wrapped("tr", &row.children, ctx),
        Node::TableCell(cell) => render_wrapped("td", &cell.children, ctx),
        Node::ContainerDirective(directive) => render_directive(directive, ctx),
    }
}
