#![deny(missing_docs)]
//! blogmark core: document tree, directive splitting, and markdown parsing.

/// Code fence tracking for the directive splitter.
pub mod code_fence;
/// Container directive fence parsing and block splitting.
pub mod directives;
/// Core error and diagnostic types.
pub mod error;
/// Markdown parsing into the document tree and pipeline hooks.
pub mod parse;
/// Document tree model.
pub mod tree;
/// github-slugger compatible heading slugs.
pub mod slug;
/// Pre-order traversal helpers.
pub mod visit;

pub use error::{BlogmarkError, ParseDiagnostics, ParseWarning, SourceLocation};
pub use parse::{
    AstTransform, ParseOptions, ParsedDocument, ParserPipeline, TextTransform, parse_document,
};
pub use slug::Slugger;
pub use tree::{ContainerDirective, Data, Heading, Node, Paragraph, Properties, PropertyValue};
pub use visit::{visit, visit_mut};

pub use code_fence::FenceTracker;
pub use directives::{
    Block, DirectiveOpening, SplitOutput, is_directive_closer, parse_opening_directive,
    split_blocks,
};
