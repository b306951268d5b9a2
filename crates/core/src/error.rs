use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Shift the location down by `lines`, used when a block was parsed in isolation.
    pub fn offset_lines(self, lines: usize) -> Self {
        Self {
            line: self.line + lines,
            column: self.column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that can occur while parsing or transforming a document tree.
#[derive(Debug, Error)]
pub enum BlogmarkError {
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    MarkdownAdapter {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// The tree does not have the shape the parser contract promises.
    #[error("Malformed document tree: {message}")]
    MalformedTree {
        /// What was wrong with the tree
        message: String,
    },
    /// Serializing a tree failed.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl BlogmarkError {
    /// Create a parse error with location
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::MarkdownAdapter {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }

    /// Create a malformed tree error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTree {
            message: message.into(),
        }
    }
}

/// Non-fatal warnings that don't prevent rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Directive fence opened but never closed; it was closed at end of input.
    UnclosedDirective {
        /// Where the directive was opened
        location: SourceLocation,
        /// Directive name
        name: String,
    },
    /// A `:::` line that had no open directive to close.
    StrayDirectiveCloser {
        /// Location of the closer
        location: SourceLocation,
    },
    /// A directive fence inside a list item or block quote, kept as text.
    DirectiveInContainer {
        /// Location of the fence
        location: SourceLocation,
        /// Directive name
        name: String,
    },
}

impl ParseWarning {
    /// Get the location of this warning
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseWarning::UnclosedDirective { location, .. } => location,
            ParseWarning::StrayDirectiveCloser { location } => location,
            ParseWarning::DirectiveInContainer { location, .. } => location,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnclosedDirective { location, name } => {
                write!(f, "Unclosed directive ':::{}' opened at {}", name, location)
            }
            ParseWarning::StrayDirectiveCloser { location } => {
                write!(f, "{}: directive closer without an open directive", location)
            }
            ParseWarning::DirectiveInContainer { location, name } => write!(
                f,
                "{}: directive ':::{}' inside a list item or block quote is kept as text",
                location, name
            ),
        }
    }
}

/// Collection of non-fatal parse diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<ParseWarning>,
}

impl ParseDiagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: ParseWarning) {
        self.warnings.push(warning);
    }

    /// Append every warning from another collection
    pub fn extend(&mut self, other: ParseDiagnostics) {
        self.warnings.extend(other.warnings);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get total count of all diagnostics
    pub fn count(&self) -> usize {
        self.warnings.len()
    }
}
