//! Tree transforms applied between parsing and HTML emission.
//!
//! - `directive_elements`: names every directive's output element after it.
//! - `admonitions`: rewrites registered container directives into labeled blocks.
//! - `headings`: heading ids and self-links.

/// Directive-to-admonition rewriting.
pub mod admonitions;
/// Default element mapping for directives.
pub mod directive_elements;
/// Heading ids and self-links.
pub mod headings;
