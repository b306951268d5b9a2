//! HTML emission for rewritten document trees.
//!
//! - `context` - output buffer with escaping helpers
//! - `html` - node rendering functions

mod context;
pub mod html;

pub use context::{Context, RenderOptions};
pub use html::{is_valid_tag_name, render_node, to_html, to_html_with};
