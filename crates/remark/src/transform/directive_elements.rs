//! Default element mapping for container directives.
//!
//! Every directive without an `hName` renders as an element named after the
//! directive, carrying its attributes, so `:::details{open}` becomes
//! `<details open>`. Runs before the admonition rewrite, which replaces both
//! fields on the directives it recognizes.

use std::convert::Infallible;

use blogmark_core::{
    AstTransform, BlogmarkError, ContainerDirective, Node, Properties, PropertyValue, visit_mut,
};

/// Gives unhandled directives `hName = name` and `hProperties = attributes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectiveElements;

impl DirectiveElements {
    /// Applies the mapping to every directive in `tree`. Returns how many
    /// directives were given an element.
    pub fn apply(&self, tree: &mut Node) -> usize {
        let mut mapped = 0;
        let Ok(()) = visit_mut(tree, &mut |node: &mut Node| -> Result<(), Infallible> {
            if let Node::ContainerDirective(directive) = node {
                if map_directive(directive) {
                    mapped += 1;
                }
            }
            Ok(())
        });
        mapped
    }
}

/// Existing `hName`/`hProperties` win.
fn map_directive(directive: &mut ContainerDirective) -> bool {
    if directive.data.h_name.is_some() {
        return false;
    }
    directive.data.h_name = Some(directive.name.clone());
    if directive.data.h_properties.is_none() {
        directive.data.h_properties = Some(attribute_properties(directive));
    }
    true
}

/// A bare attribute (`{open}`) parses to an empty value and becomes a boolean.
fn attribute_properties(directive: &ContainerDirective) -> Properties {
    directive
        .attributes
        .iter()
        .map(|(name, value)| {
            let value = if value.is_empty() {
                PropertyValue::Bool(true)
            } else {
                PropertyValue::Text(value.clone())
            };
            (name.clone(), value)
        })
        .collect()
}

impl AstTransform for DirectiveElements {
    fn transform(&self, root: &mut Node) -> Result<(), BlogmarkError> {
        self.apply(root);
        Ok(())
    }
}
