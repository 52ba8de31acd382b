use std::cmp::Ordering;

use super::arena::{Hierarchy, NodeId};
use crate::error::{Result, TreemapError};

/// Compute aggregated values and heights for every node (bottom-up).
///
/// After this, each internal node's `aggregate` equals the sum of all descendant
/// leaf values. Fails if a leaf has no positive value or the whole tree weighs nothing.
pub fn aggregate_values(tree: &mut Hierarchy) -> Result<()> {
    // Children always have higher indices than their parents in our arena.
    let len = tree.nodes.len();
    for i in (0..len).rev() {
        let node = &tree.nodes[i];

        if node.is_leaf() {
            let value = match node.value {
                Some(v) if v.is_finite() && v > 0.0 => v,
                Some(v) => {
                    return Err(TreemapError::invalid_tree(
                        node.id.as_str(),
                        format!("leaf value must be positive and finite, got {v}"),
                    ))
                }
                None => {
                    return Err(TreemapError::invalid_tree(
                        node.id.as_str(),
                        "node has neither children nor a value",
                    ))
                }
            };
            tree.nodes[i].aggregate = value;
            tree.nodes[i].height = 0;
            continue;
        }

        let mut total = 0.0;
        let mut height = 0u16;
        let mut child = node.first_child;
        while let Some(child_id) = child {
            let c = &tree.nodes[child_id.index()];
            total += c.aggregate;
            height = height.max(c.height + 1);
            child = c.next_sibling;
        }
        tree.nodes[i].aggregate = total;
        tree.nodes[i].height = height;
    }

    let root = tree.get(tree.root);
    if !(root.aggregate.is_finite() && root.aggregate > 0.0) {
        return Err(TreemapError::invalid_tree(
            root.id.as_str(),
            format!("total value must be positive and finite, got {}", root.aggregate),
        ));
    }

    tracing::debug!(
        "Aggregated {} nodes, total value {:.2}, height {}",
        len,
        root.aggregate,
        root.height
    );
    Ok(())
}

/// Sibling order used by the layout: descending aggregate value, then
/// descending height, then original input order.
pub fn compare_siblings(tree: &Hierarchy, a: NodeId, b: NodeId) -> Ordering {
    let (na, nb) = (tree.get(a), tree.get(b));
    nb.aggregate
        .total_cmp(&na.aggregate)
        .then_with(|| nb.height.cmp(&na.height))
        .then_with(|| na.order.cmp(&nb.order))
}

/// Sort children of each internal node into layout order.
/// This re-links the sibling list without moving nodes in the arena.
pub fn sort_children(tree: &mut Hierarchy) {
    let len = tree.nodes.len();
    let mut children: Vec<NodeId> = Vec::new();
    for i in 0..len {
        let parent = NodeId(i as u32);
        if tree.get(parent).is_leaf() {
            continue;
        }

        children.clear();
        children.extend(tree.children(parent));
        children.sort_by(|&a, &b| compare_siblings(tree, a, b));
        tree.relink_children(parent, &children);
    }
}
