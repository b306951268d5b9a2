//! Container directive fences.
//!
//! markdown-rs has no directive construct, so container directives are
//! recognized line by line before the markdown parser runs. The input is split
//! into a tree of [`Block`]s: runs of plain markdown and directives holding
//! their own nested blocks. Lines inside fenced code are never treated as
//! directive fences.
//!
//! ```text
//! ::::note[Heads up]{#intro .wide}
//! Outer content
//! :::tip
//! Nested
//! :::
//! ::::
//! ```

use std::collections::BTreeMap;

use crate::code_fence::{FenceTracker, leading_whitespace};
use crate::error::{ParseDiagnostics, ParseWarning, SourceLocation};

/// Parsed directive fence line (e.g. `:::note[Title]{.wide}`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveOpening {
    /// Directive name, case preserved.
    pub name: String,
    /// Raw label text from `[...]`; `None` when absent or empty.
    pub label: Option<String>,
    /// Attributes from `{...}`.
    pub attributes: BTreeMap<String, String>,
    /// Number of colons in the fence.
    pub fence_length: usize,
}

/// Parse an opening directive line like `:::note[Title]{#id .class key="v"}`.
///
/// Returns `None` if the line is not a well-formed container directive fence.
pub fn parse_opening_directive(line: &str) -> Option<DirectiveOpening> {
    let (columns, bytes) = leading_whitespace(line);
    if columns > 3 {
        return None;
    }
    let rest = &line[bytes..];

    let fence_length = rest.chars().take_while(|c| *c == ':').count();
    if fence_length < 3 {
        return None;
    }
    let rest = &rest[fence_length..];

    let name_len = directive_name_len(rest);
    if name_len == 0 {
        return None;
    }
    let name = rest[..name_len].to_string();
    let mut rest = &rest[name_len..];

    let mut label = None;
    if rest.starts_with('[') {
        let (text, after) = take_label(rest)?;
        if !text.trim().is_empty() {
            label = Some(text.to_string());
        }
        rest = after;
    }

    let rest = rest.trim_start();
    let mut attributes = BTreeMap::new();
    let rest = if let Some(body) = rest.strip_prefix('{') {
        let close = find_attribute_close(body)?;
        attributes = parse_attributes(&body[..close]);
        &body[close + 1..]
    } else {
        rest
    };

    if !rest.trim().is_empty() {
        return None;
    }

    Some(DirectiveOpening {
        name,
        label,
        attributes,
        fence_length,
    })
}

/// Check if a line is a directive closer (three or more colons alone).
///
/// Returns the number of colons.
pub fn is_directive_closer(line: &str) -> Option<usize> {
    let (columns, bytes) = leading_whitespace(line);
    if columns > 3 {
        return None;
    }
    let trimmed = line[bytes..].trim_end();
    if trimmed.len() >= 3 && trimmed.bytes().all(|b| b == b':') {
        Some(trimmed.len())
    } else {
        None
    }
}

/// Byte length of a directive name at the start of `input`.
fn directive_name_len(input: &str) -> usize {
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(input.len())
}

/// Splits `[label]rest` honoring nested brackets and backslash escapes.
fn take_label(input: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&input[1..i], &input[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the `}` closing an attribute list, skipping quoted values.
fn find_attribute_close(body: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in body.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '}') => return Some(i),
            (None, _) => {}
        }
    }
    None
}

/// Tokenize attributes respecting quoted values.
/// Splits on whitespace but keeps quoted strings intact.
fn tokenize_attrs(attrs: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut token_start: Option<usize> = None;
    let mut quote: Option<char> = None;

    for (i, c) in attrs.char_indices() {
        match c {
            '"' | '\'' if quote.is_none() => {
                token_start.get_or_insert(i);
                quote = Some(c);
            }
            c if Some(c) == quote => quote = None,
            c if c.is_whitespace() && quote.is_none() => {
                if let Some(start) = token_start.take() {
                    tokens.push(&attrs[start..i]);
                }
            }
            _ => {
                token_start.get_or_insert(i);
            }
        }
    }

    if let Some(start) = token_start {
        tokens.push(&attrs[start..]);
    }

    tokens
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Parses `#id .class key=value key="quoted" flag` into a map.
///
/// Classes accumulate into `class`; later keys win otherwise.
pub fn parse_attributes(attrs: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    let mut classes: Vec<&str> = Vec::new();

    for token in tokenize_attrs(attrs) {
        if let Some(id) = token.strip_prefix('#') {
            if !id.is_empty() {
                map.insert("id".to_string(), id.to_string());
            }
        } else if let Some(class) = token.strip_prefix('.') {
            if !class.is_empty() {
                classes.push(class);
            }
        } else if let Some((key, value)) = token.split_once('=') {
            if key == "class" {
                classes.extend(unquote(value).split_whitespace());
            } else if !key.is_empty() {
                map.insert(key.to_string(), unquote(value).to_string());
            }
        } else {
            map.insert(token.to_string(), String::new());
        }
    }

    if !classes.is_empty() {
        map.insert("class".to_string(), classes.join(" "));
    }
    map
}

/// A region of the source document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// Plain markdown between directive fences.
    Markdown {
        /// Source text, newline-terminated lines.
        text: String,
        /// 1-indexed line of the first line of `text`.
        start_line: usize,
    },
    /// A container directive and its contents.
    Directive {
        /// The opening fence.
        opening: DirectiveOpening,
        /// Nested blocks between the fences.
        children: Vec<Block>,
        /// 1-indexed line of the opening fence.
        start_line: usize,
    },
}

/// Result of [`split_blocks`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitOutput {
    /// Top-level blocks.
    pub blocks: Vec<Block>,
    /// Unclosed directives and stray closers.
    pub diagnostics: ParseDiagnostics,
}

struct Frame {
    opening: Option<(DirectiveOpening, usize)>,
    blocks: Vec<Block>,
    pending: String,
    pending_start: Option<usize>,
    /// The last markdown lines belong to a list item or block quote.
    in_container: bool,
}

impl Frame {
    fn new(opening: Option<(DirectiveOpening, usize)>) -> Self {
        Self {
            opening,
            blocks: Vec::new(),
            pending: String::new(),
            pending_start: None,
            in_container: false,
        }
    }

    /// Appends a markdown line and updates the container state.
    fn push_line(&mut self, line: &str, line_no: usize) {
        if !line.trim().is_empty() {
            let (columns, bytes) = leading_whitespace(line);
            if columns <= 3 && starts_container(&line[bytes..]) {
                self.in_container = true;
            } else if columns == 0 {
                self.in_container = false;
            }
        }
        self.push_code_line(line, line_no);
    }

    /// Appends a line inside fenced code.
    fn push_code_line(&mut self, line: &str, line_no: usize) {
        self.pending_start.get_or_insert(line_no);
        self.pending.push_str(line);
        self.pending.push('\n');
    }

    /// Indented lines under a list item, and block quote lines, belong to
    /// that container rather than to this frame.
    fn owns_as_container(&self, line: &str) -> bool {
        let (columns, bytes) = leading_whitespace(line);
        (self.in_container && columns > 0) || line[bytes..].starts_with('>')
    }

    fn flush(&mut self) {
        let text = std::mem::take(&mut self.pending);
        if let Some(start_line) = self.pending_start.take() {
            if !text.trim().is_empty() {
                self.blocks.push(Block::Markdown { text, start_line });
            }
        }
    }

    fn into_block(mut self) -> Option<Block> {
        self.flush();
        let (opening, start_line) = self.opening?;
        Some(Block::Directive {
            opening,
            children: self.blocks,
            start_line,
        })
    }
}

/// Splits a document into markdown runs and container directives.
pub fn split_blocks(input: &str) -> SplitOutput {
    let mut diagnostics = ParseDiagnostics::new();
    let mut fences = FenceTracker::new();
    let mut stack = vec![Frame::new(None)];

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let top = stack.len() - 1;

        if fences.observe(line) {
            stack[top].push_code_line(line, line_no);
            continue;
        }

        if stack[top].owns_as_container(line) {
            if let Some(opening) = contained_opening(line) {
                log::debug!(
                    "directive ':::{}' on line {} is inside a container",
                    opening.name,
                    line_no
                );
                diagnostics.add_warning(ParseWarning::DirectiveInContainer {
                    location: SourceLocation::new(line_no, 1),
                    name: opening.name,
                });
            }
            stack[top].push_line(line, line_no);
            continue;
        }

        if let Some(opening) = parse_opening_directive(line) {
            stack[top].in_container = false;
            stack[top].flush();
            stack.push(Frame::new(Some((opening, line_no))));
            continue;
        }

        if let Some(length) = is_directive_closer(line) {
            let target = stack
                .iter()
                .rposition(|frame| matches!(&frame.opening, Some((o, _)) if o.fence_length <= length));
            match target {
                Some(target) => {
                    while stack.len() > target + 1 {
                        close_frame(&mut stack, &mut diagnostics);
                    }
                    if let Some(frame) = stack.pop() {
                        push_closed(&mut stack, frame);
                    }
                }
                None => {
                    log::debug!("stray directive closer on line {}", line_no);
                    diagnostics.add_warning(ParseWarning::StrayDirectiveCloser {
                        location: SourceLocation::new(line_no, 1),
                    });
                    stack[top].push_line(line, line_no);
                }
            }
            continue;
        }

        stack[top].push_line(line, line_no);
    }

    while stack.len() > 1 {
        close_frame(&mut stack, &mut diagnostics);
    }

    let mut root = stack.pop().unwrap_or_else(|| Frame::new(None));
    root.flush();
    SplitOutput {
        blocks: root.blocks,
        diagnostics,
    }
}

/// True for a list item marker (`-`, `*`, `+`, `1.`, `1)`) or `>`.
fn starts_container(rest: &str) -> bool {
    if rest.starts_with('>') {
        return true;
    }
    let marker_len = match rest.as_bytes().first() {
        Some(b'-' | b'*' | b'+') => 1,
        Some(b) if b.is_ascii_digit() => {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            match rest.as_bytes().get(digits) {
                Some(b'.' | b')') if digits <= 9 => digits + 1,
                _ => return false,
            }
        }
        _ => return false,
    };
    matches!(rest.as_bytes().get(marker_len), None | Some(b' ' | b'\t'))
}

/// An opening fence after any indentation and `>` markers.
fn contained_opening(line: &str) -> Option<DirectiveOpening> {
    let mut rest = line.trim_start();
    while let Some(after) = rest.strip_prefix('>') {
        rest = after.trim_start();
    }
    parse_opening_directive(rest)
}

/// Closes the innermost frame without an explicit closer.
fn close_frame(stack: &mut Vec<Frame>, diagnostics: &mut ParseDiagnostics) {
    let Some(frame) = stack.pop() else {
        return;
    };
    if let Some((opening, line)) = &frame.opening {
        diagnostics.add_warning(ParseWarning::UnclosedDirective {
            location: SourceLocation::new(*line, 1),
            name: opening.name.clone(),
        });
    }
    push_closed(stack, frame);
}

fn push_closed(stack: &mut [Frame], frame: Frame) {
    if let (Some(block), Some(parent)) = (frame.into_block(), stack.last_mut()) {
        parent.blocks.push(block);
    }
}
