mod connector;
pub(crate) mod types;

pub use connector::compute_lines;
pub use types::*;

use crate::tree::{ExpansionState, TreeNode};

/// Flattens the tree into the ordered list of rendered rows: depth-first,
/// pre-order, children included only when the parent id is expanded.
/// Un-expanded subtrees are omitted entirely, which keeps downstream
/// measurement limited to what is actually painted.
pub fn visible_nodes<'a>(
    roots: &'a [TreeNode],
    expanded: &ExpansionState,
) -> Vec<VisibleNode<'a>> {
    let mut rows = Vec::new();
    for root in roots {
        push_visible(root, 0, expanded, &mut rows);
    }
    rows
}

fn push_visible<'a>(
    node: &'a TreeNode,
    depth: usize,
    expanded: &ExpansionState,
    rows: &mut Vec<VisibleNode<'a>>,
) {
    let is_expanded = expanded.is_expanded(&node.id);
    rows.push(VisibleNode {
        node,
        depth,
        is_expanded,
        has_children: node.has_children(),
    });
    if is_expanded {
        for child in &node.children {
            push_visible(child, depth + 1, expanded, rows);
        }
    }
}
