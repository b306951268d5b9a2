//! Markdown parsing into the document tree, plus pipeline extension hooks.

use std::borrow::Cow;
use std::collections::HashMap;

use markdown::mdast;
use markdown::message::{Message, Place};

use crate::code_fence::FenceTracker;
use crate::directives::{Block, DirectiveOpening, split_blocks};
use crate::error::{BlogmarkError, ParseDiagnostics, SourceLocation};
use crate::tree::{
    Align, Code, ContainerDirective, Data, Heading, Image, Link, List, ListItem, Literal, Node,
    Parent, Table,
};

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Enable YAML frontmatter at the start of the document.
    pub frontmatter: bool,
    /// Enable math constructs ($inline$ and $$block$$).
    pub math: bool,
    /// Recognize container directives (`:::name ... :::`).
    pub directives: bool,
    /// Allow raw HTML nodes in the tree.
    pub raw_html: bool,
}

impl ParseOptions {
    /// Blog defaults: everything on.
    pub const fn markdown() -> Self {
        Self {
            gfm: true,
            frontmatter: true,
            math: true,
            directives: true,
            raw_html: true,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            frontmatter: self.frontmatter,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        if self.math {
            constructs.math_flow = true;
            constructs.math_text = true;
        }

        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: self.math,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::markdown()
    }
}

/// A parsed document and the warnings collected on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// The `root` node.
    pub tree: Node,
    /// Non-fatal diagnostics.
    pub diagnostics: ParseDiagnostics,
}

/// Trait for preprocessing raw markdown text before parsing.
pub trait TextTransform: Send + Sync {
    /// Transform the input markdown text, returning an owned or borrowed string.
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

impl<F> TextTransform for F
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str> + Send + Sync,
{
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (self)(input)
    }
}

/// Trait for mutating the parsed tree after parsing.
pub trait AstTransform: Send + Sync {
    /// Mutate the tree in place.
    fn transform(&self, root: &mut Node) -> Result<(), BlogmarkError>;
}

impl<F> AstTransform for F
where
    F: Fn(&mut Node) -> Result<(), BlogmarkError> + Send + Sync,
{
    fn transform(&self, root: &mut Node) -> Result<(), BlogmarkError> {
        (self)(root)
    }
}

/// Configurable parsing pipeline with optional transforms.
pub struct ParserPipeline {
    options: ParseOptions,
    text_transforms: Vec<Box<dyn TextTransform>>,
    ast_transforms: Vec<Box<dyn AstTransform>>,
}

impl ParserPipeline {
    /// Create a new pipeline.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            text_transforms: Vec::new(),
            ast_transforms: Vec::new(),
        }
    }

    /// Add a text preprocessor transform.
    pub fn add_text_transform<T: TextTransform + 'static>(&mut self, transform: T) {
        self.text_transforms.push(Box::new(transform));
    }

    /// Add an AST transform. Transforms run in insertion order.
    pub fn add_ast_transform<T: AstTransform + 'static>(&mut self, transform: T) {
        self.ast_transforms.push(Box::new(transform));
    }

    /// Parse markdown using the configured pipeline.
    pub fn parse(&self, input: &str) -> Result<ParsedDocument, BlogmarkError> {
        let mut current = Cow::Borrowed(input);
        for transform in &self.text_transforms {
            let next = transform.transform(current.as_ref());
            current = Cow::Owned(next.into_owned());
        }

        let mut parsed = parse_document(&current, &self.options)?;
        for transform in &self.ast_transforms {
            transform.transform(&mut parsed.tree)?;
        }

        Ok(parsed)
    }
}

/// Parse markdown (with container directives) into a document tree.
pub fn parse_document(input: &str, options: &ParseOptions) -> Result<ParsedDocument, BlogmarkError> {
    let (blocks, diagnostics) = if options.directives {
        let split = split_blocks(input);
        (split.blocks, split.diagnostics)
    } else {
        let block = Block::Markdown {
            text: input.to_string(),
            start_line: 1,
        };
        (vec![block], ParseDiagnostics::new())
    };

    let body = options.to_markdown();
    let mut inner = *options;
    inner.frontmatter = false;
    let inner = inner.to_markdown();

    let mut parsed = parse_blocks(&blocks, &body, &inner, "")?;

    let mut converter = Converter::default();
    for block in &parsed {
        converter.collect_definitions(block);
    }

    // markdown-rs only emits reference nodes for definitions in the same
    // input, so blocks are parsed again with every definition label appended.
    let single_run = matches!(blocks.as_slice(), [Block::Markdown { .. }]);
    if !single_run && !converter.labels.is_empty() {
        let shared = converter.definition_source();
        parsed = parse_blocks(&blocks, &body, &inner, &shared)?;
    }

    let mut children = Vec::new();
    for block in &parsed {
        converter.convert_block(block, &mut children);
    }

    Ok(ParsedDocument {
        tree: Node::root(children),
        diagnostics,
    })
}

/// A block after markdown-rs has parsed its text.
enum ParsedBlock {
    Markdown(Vec<mdast::Node>),
    Directive {
        opening: DirectiveOpening,
        label: Option<Vec<mdast::Node>>,
        children: Vec<ParsedBlock>,
    },
}

fn parse_blocks(
    blocks: &[Block],
    first: &markdown::ParseOptions,
    rest: &markdown::ParseOptions,
    definitions: &str,
) -> Result<Vec<ParsedBlock>, BlogmarkError> {
    blocks
        .iter()
        .map(|block| parse_block(block, first, rest, definitions))
        .collect()
}

/// `first` options apply only to a block starting on line 1 (frontmatter).
/// `definitions` is definition source appended to every markdown run.
fn parse_block(
    block: &Block,
    first: &markdown::ParseOptions,
    rest: &markdown::ParseOptions,
    definitions: &str,
) -> Result<ParsedBlock, BlogmarkError> {
    match block {
        Block::Markdown { text, start_line } => {
            let options = if *start_line == 1 { first } else { rest };
            let text = with_definitions(text, definitions);
            let root = parse_mdast(&text, options, *start_line)?;
            Ok(ParsedBlock::Markdown(into_children(root)))
        }
        Block::Directive {
            opening,
            children,
            start_line,
        } => {
            let label = match &opening.label {
                Some(text) => Some(parse_label(text, rest, *start_line, definitions)?),
                None => None,
            };
            let mut parsed = Vec::with_capacity(children.len());
            for child in children {
                parsed.push(parse_block(child, rest, rest, definitions)?);
            }
            Ok(ParsedBlock::Directive {
                opening: opening.clone(),
                label,
                children: parsed,
            })
        }
    }
}

/// Label text is inline markdown; anything that is not a single paragraph
/// falls back to the raw text.
fn parse_label(
    text: &str,
    options: &markdown::ParseOptions,
    line: usize,
    definitions: &str,
) -> Result<Vec<mdast::Node>, BlogmarkError> {
    let line_text = format!("{}\n", text);
    let source = with_definitions(&line_text, definitions);
    let mut children = into_children(parse_mdast(&source, options, line)?);
    children.retain(|node| !matches!(node, mdast::Node::Definition(_)));
    if children.len() == 1 {
        if let Some(mdast::Node::Paragraph(paragraph)) = children.pop() {
            return Ok(paragraph.children);
        }
    }
    Ok(vec![mdast::Node::Text(mdast::Text {
        value: text.to_string(),
        position: None,
    })])
}

/// Appends definition source after a blank line. Text ending inside an open
/// code fence is left alone, since the definitions would become code.
fn with_definitions<'a>(text: &'a str, definitions: &str) -> Cow<'a, str> {
    if definitions.is_empty() {
        return Cow::Borrowed(text);
    }
    let mut fences = FenceTracker::new();
    for line in text.lines() {
        fences.observe(line);
    }
    if fences.in_fence() {
        return Cow::Borrowed(text);
    }
    Cow::Owned(format!("{}\n{}", text, definitions))
}

fn into_children(root: mdast::Node) -> Vec<mdast::Node> {
    match root {
        mdast::Node::Root(root) => root.children,
        other => vec![other],
    }
}

fn parse_mdast(
    input: &str,
    options: &markdown::ParseOptions,
    start_line: usize,
) -> Result<mdast::Node, BlogmarkError> {
    markdown::to_mdast(input, options).map_err(|err| {
        let location = message_location(&err).offset_lines(start_line - 1);
        BlogmarkError::parse_error(err.to_string(), location.line, location.column)
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

/// Link definitions, keyed by normalized identifier.
#[derive(Default)]
struct Converter {
    definitions: HashMap<String, (String, Option<String>)>,
    /// Source labels, in document order.
    labels: Vec<String>,
}

impl Converter {
    fn collect_definitions(&mut self, block: &ParsedBlock) {
        match block {
            ParsedBlock::Markdown(nodes) => {
                for node in nodes {
                    self.collect_from_node(node);
                }
            }
            ParsedBlock::Directive { children, .. } => {
                for child in children {
                    self.collect_definitions(child);
                }
            }
        }
    }

    fn collect_from_node(&mut self, node: &mdast::Node) {
        if let mdast::Node::Definition(def) = node {
            // First definition wins, as in CommonMark.
            if !self.definitions.contains_key(&def.identifier) {
                self.definitions
                    .insert(def.identifier.clone(), (def.url.clone(), def.title.clone()));
                self.labels
                    .push(def.label.clone().unwrap_or_else(|| def.identifier.clone()));
            }
        }
        if let Some(children) = node.children() {
            for child in children {
                self.collect_from_node(child);
            }
        }
    }

    /// Placeholder definitions for every known label. Destinations come from
    /// `definitions` at conversion time, so only the labels matter.
    fn definition_source(&self) -> String {
        self.labels
            .iter()
            .map(|label| format!("[{}]: #\n", label))
            .collect()
    }

    fn convert_block(&self, block: &ParsedBlock, out: &mut Vec<Node>) {
        match block {
            ParsedBlock::Markdown(nodes) => {
                for node in nodes {
                    self.convert(node, out);
                }
            }
            ParsedBlock::Directive {
                opening,
                label,
                children,
            } => {
                let mut converted = Vec::new();
                if let Some(label) = label {
                    converted.push(Node::label(self.convert_all(label)));
                }
                for child in children {
                    self.convert_block(child, &mut converted);
                }
                out.push(Node::ContainerDirective(ContainerDirective {
                    name: opening.name.clone(),
                    attributes: opening.attributes.clone(),
                    children: converted,
                    data: Data::default(),
                }));
            }
        }
    }

    fn convert_all(&self, nodes: &[mdast::Node]) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            self.convert(node, &mut out);
        }
        out
    }

    fn parent(&self, children: &[mdast::Node]) -> Parent {
        Parent {
            children: self.convert_all(children),
        }
    }

    /// Converts one mdast node, pushing zero or more nodes onto `out`.
    fn convert(&self, node: &mdast::Node, out: &mut Vec<Node>) {
        let converted = match node {
            mdast::Node::Root(root) => {
                out.extend(self.convert_all(&root.children));
                return;
            }
            mdast::Node::Paragraph(p) => Node::paragraph(self.convert_all(&p.children)),
            mdast::Node::Heading(h) => Node::Heading(Heading {
                depth: h.depth,
                children: self.convert_all(&h.children),
                data: Data::default(),
            }),
            mdast::Node::Blockquote(q) => Node::Blockquote(self.parent(&q.children)),
            mdast::Node::List(l) => Node::List(List {
                ordered: l.ordered,
                start: l.start,
                spread: l.spread,
                children: self.convert_all(&l.children),
            }),
            mdast::Node::ListItem(i) => Node::ListItem(ListItem {
                checked: i.checked,
                spread: i.spread,
                children: self.convert_all(&i.children),
            }),
            mdast::Node::Emphasis(e) => Node::Emphasis(self.parent(&e.children)),
            mdast::Node::Strong(s) => Node::Strong(self.parent(&s.children)),
            mdast::Node::Delete(d) => Node::Delete(self.parent(&d.children)),
            mdast::Node::Link(l) => Node::Link(Link {
                url: l.url.clone(),
                title: l.title.clone(),
                children: self.convert_all(&l.children),
            }),
            mdast::Node::Image(i) => Node::Image(Image {
                url: i.url.clone(),
                alt: i.alt.clone(),
                title: i.title.clone(),
            }),
            mdast::Node::LinkReference(r) => match self.definitions.get(&r.identifier) {
                Some((url, title)) => Node::Link(Link {
                    url: url.clone(),
                    title: title.clone(),
                    children: self.convert_all(&r.children),
                }),
                None => {
                    out.extend(self.convert_all(&r.children));
                    return;
                }
            },
            mdast::Node::ImageReference(r) => match self.definitions.get(&r.identifier) {
                Some((url, title)) => Node::Image(Image {
                    url: url.clone(),
                    alt: r.alt.clone(),
                    title: title.clone(),
                }),
                None => Node::text(r.alt.clone()),
            },
            mdast::Node::Definition(_) => return,
            mdast::Node::Text(t) => Node::text(t.value.clone()),
            mdast::Node::InlineCode(c) => Node::InlineCode(Literal {
                value: c.value.clone(),
            }),
            mdast::Node::Code(c) => Node::Code(Code {
                lang: c.lang.clone(),
                meta: c.meta.clone(),
                value: c.value.clone(),
            }),
            mdast::Node::Html(h) => Node::Html(Literal {
                value: h.value.clone(),
            }),
            mdast::Node::Math(m) => Node::Math(Literal {
                value: m.value.clone(),
            }),
            mdast::Node::InlineMath(m) => Node::InlineMath(Literal {
                value: m.value.clone(),
            }),
            mdast::Node::Yaml(y) => Node::Yaml(Literal {
                value: y.value.clone(),
            }),
            mdast::Node::Break(_) => Node::Break,
            mdast::Node::ThematicBreak(_) => Node::ThematicBreak,
            mdast::Node::Table(t) => Node::Table(Table {
                align: t.align.iter().map(convert_align).collect(),
                children: self.convert_all(&t.children),
            }),
            mdast::Node::TableRow(r) => Node::TableRow(self.parent(&r.children)),
            mdast::Node::TableCell(c) => Node::TableCell(self.parent(&c.children)),
            mdast::Node::FootnoteReference(f) => {
                log::debug!("footnote reference [^{}] kept as text", f.identifier);
                Node::text(format!(
                    "[^{}]",
                    f.label.as_deref().unwrap_or(f.identifier.as_str())
                ))
            }
            other => {
                log::warn!("Unsupported markdown node type: {:?}", other);
                if let Some(children) = other.children() {
                    out.extend(self.convert_all(children));
                }
                return;
            }
        };
        out.push(converted);
    }
}

fn convert_align(align: &mdast::AlignKind) -> Option<Align> {
    match align {
        mdast::AlignKind::Left => Some(Align::Left),
        mdast::AlignKind::Right => Some(Align::Right),
        mdast::AlignKind::Center => Some(Align::Center),
        mdast::AlignKind::None => None,
    }
}
