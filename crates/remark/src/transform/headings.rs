//! Heading ids and self-links.
//!
//! Each heading gets a slug of its text as `hProperties.id`, unique within the
//! document. With autolinking on, the heading's content is wrapped in a link to
//! its own anchor:
//!
//! ```text
//! ## Part 2   ->   <h2 id="part-2"><a href="#part-2">Part 2</a></h2>
//! ```

use std::convert::Infallible;

use blogmark_core::tree::Link;
use blogmark_core::{
    AstTransform, BlogmarkError, Heading, Node, PropertyValue, Slugger, visit_mut,
};
use serde::Serialize;

/// One heading as it appears in the document outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingEntry {
    /// Rank (1-6).
    pub depth: u8,
    /// Anchor id.
    pub slug: String,
    /// Plain text content.
    pub text: String,
}

/// Assigns heading ids and optionally wraps heading content in a self-link.
#[derive(Debug, Clone, Copy)]
pub struct HeadingAnchors {
    autolink: bool,
}

impl Default for HeadingAnchors {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadingAnchors {
    /// Ids and self-links.
    pub fn new() -> Self {
        Self { autolink: true }
    }

    /// Turns self-links on or off. Ids are always assigned.
    pub fn with_autolink(mut self, autolink: bool) -> Self {
        self.autolink = autolink;
        self
    }

    /// Processes every heading in document order and returns the outline.
    ///
    /// An `id` already present in `hProperties` is kept and reserved.
    pub fn apply(&self, tree: &mut Node) -> Vec<HeadingEntry> {
        let mut slugger = Slugger::new();
        let mut outline = Vec::new();
        let Ok(()) = visit_mut(tree, &mut |node: &mut Node| -> Result<(), Infallible> {
            if let Node::Heading(heading) = node {
                outline.push(self.anchor(heading, &mut slugger));
            }
            Ok(())
        });
        log::debug!("headings: anchored {}", outline.len());
        outline
    }

    fn anchor(&self, heading: &mut Heading, slugger: &mut Slugger) -> HeadingEntry {
        let text: String = heading.children.iter().map(Node::text_content).collect();
        let properties = heading.data.h_properties.get_or_insert_with(Default::default);
        let existing = match properties.get("id") {
            Some(PropertyValue::Text(id)) if !id.is_empty() => Some(id.clone()),
            _ => None,
        };
        let slug = match existing {
            Some(id) => {
                slugger.reserve(&id);
                id
            }
            None => {
                let slug = slugger.slug(&text);
                properties.insert("id".to_string(), PropertyValue::Text(slug.clone()));
                slug
            }
        };

        if self.autolink {
            wrap_in_self_link(heading, &slug);
        }
        HeadingEntry {
            depth: heading.depth,
            slug,
            text,
        }
    }
}

/// Leaves a heading that already links to `#slug` as its only child alone.
fn wrap_in_self_link(heading: &mut Heading, slug: &str) {
    let href = format!("#{}", slug);
    if matches!(heading.children.as_slice(), [Node::Link(link)] if link.url == href) {
        return;
    }
    let children = std::mem::take(&mut heading.children);
    heading.children = vec![Node::Link(Link {
        url: href,
        title: None,
        children,
    })];
}

impl AstTransform for HeadingAnchors {
    fn transform(&self, root: &mut Node) -> Result<(), BlogmarkError> {
        self.apply(root);
        Ok(())
    }
}
