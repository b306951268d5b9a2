//! End-to-end markdown to HTML processing.

use crate::config::{HtmlFlags, ProcessorConfig};
use crate::renderer::to_html_with;
use crate::transform::admonitions::{DirectiveBlockRewriter, RewriteSummary};
use crate::transform::directive_elements::DirectiveElements;
use crate::transform::headings::{HeadingAnchors, HeadingEntry};
use blogmark_core::{
    AstTransform, BlogmarkError, Node, ParseDiagnostics, ParserPipeline, TextTransform,
};

/// Output of [`Processor::process`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Rendered HTML.
    pub html: String,
    /// The rewritten tree the HTML was rendered from.
    pub tree: Node,
    /// Non-fatal parse warnings.
    pub diagnostics: ParseDiagnostics,
    /// What the admonition rewrite did.
    pub summary: RewriteSummary,
    /// Headings in document order; empty when heading ids are off.
    pub headings: Vec<HeadingEntry>,
}

/// Parses, rewrites admonitions, and renders HTML.
///
/// Holds no per-document state, so one processor can serve many threads.
pub struct Processor {
    pipeline: ParserPipeline,
    rewriter: DirectiveBlockRewriter,
    html: HtmlFlags,
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(ProcessorConfig::default())
    }
}

impl Processor {
    /// Builds a processor from configuration.
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            pipeline: ParserPipeline::new(config.parse.to_options()),
            rewriter: DirectiveBlockRewriter::from_config(&config.admonitions),
            html: config.html,
        }
    }

    /// Builds a processor around an existing rewriter.
    pub fn with_rewriter(config: &ProcessorConfig, rewriter: DirectiveBlockRewriter) -> Self {
        Self {
            pipeline: ParserPipeline::new(config.parse.to_options()),
            rewriter,
            html: config.html.clone(),
        }
    }

    /// Adds a source preprocessor, run before parsing.
    pub fn add_text_transform<T: TextTransform + 'static>(&mut self, transform: T) {
        self.pipeline.add_text_transform(transform);
    }

    /// Adds a tree transform, run after parsing and before the built-in ones.
    pub fn add_ast_transform<T: AstTransform + 'static>(&mut self, transform: T) {
        self.pipeline.add_ast_transform(transform);
    }

    /// The admonition rewriter in use.
    pub fn rewriter(&self) -> &DirectiveBlockRewriter {
        &self.rewriter
    }

    /// Processes one markdown document.
    ///
    /// Directive elements, then the admonition rewrite, then heading anchors,
    /// then HTML.
    pub fn process(&self, source: &str) -> Result<Rendered, BlogmarkError> {
        let parsed = self.pipeline.parse(source)?;
        let mut tree = parsed.tree;
        if self.html.directive_elements() {
            DirectiveElements.apply(&mut tree);
        }
        let summary = self.rewriter.rewrite(&mut tree)?;
        let headings = if self.html.heading_ids() {
            HeadingAnchors::new()
                .with_autolink(self.html.heading_autolinks())
                .apply(&mut tree)
        } else {
            Vec::new()
        };
        let html = to_html_with(&tree, self.html.render_options());
        Ok(Rendered {
            html,
            tree,
            diagnostics: parsed.diagnostics,
            summary,
            headings,
        })
    }
}
