#![deny(missing_docs)]
//! blogmark remark stage: admonition rewriting, HTML emission, and batch processing.

/// Parallel processing of many documents.
pub mod batch;
/// Serde configuration for the rewriter and processor.
pub mod config;
/// Parse, rewrite, render pipeline.
pub mod processor;
/// Admonition type registry.
pub mod registry;
/// HTML emission.
pub mod renderer;
/// Tree transforms (directive elements, admonitions, heading anchors).
pub mod transform;

pub use batch::{BatchInput, BatchOptions, BatchOutput, BatchResult, BatchStats, process_batch};
pub use config::{ConfigError, HtmlFlags, ParseFlags, ProcessorConfig, RewriterConfig};
pub use processor::{Processor, Rendered};
pub use registry::{
    AdmonitionType, DEFAULT_ADMONITION_NAMES, TypeRegistry, default_admonition_types,
    shared_default_registry,
};
pub use renderer::{RenderOptions, to_html, to_html_with};
pub use transform::admonitions::{
    ADMONITION_ATTRIBUTE, DEFAULT_ELEMENT, DirectiveBlockRewriter, RewriteSummary,
};
pub use transform::directive_elements::DirectiveElements;
pub use transform::headings::{HeadingAnchors, HeadingEntry};
