//! Pre-order tree traversal.

use crate::tree::Node;

/// Visits every node in pre-order, parent before children.
///
/// The callback may replace a node's children; traversal descends into the
/// children as they are after the callback returns. The first error stops the
/// walk and is returned.
pub fn visit_mut<E, F>(node: &mut Node, visitor: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Node) -> Result<(), E>,
{
    visitor(node)?;
    if let Some(children) = node.children_mut() {
        for child in children.iter_mut() {
            visit_mut(child, visitor)?;
        }
    }
    Ok(())
}

/// Read-only pre-order walk.
pub fn visit<F>(node: &Node, visitor: &mut F)
where
    F: FnMut(&Node),
{
    visitor(node);
    if let Some(children) = node.children() {
        for child in children {
            visit(child, visitor);
        }
    }
}
