pub mod aggregate;
pub mod arena;

use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize};

use self::arena::{Hierarchy, HierarchyNode, NodeId};
use crate::error::{Result, TreemapError};

/// A named, weighted node as it arrives from the data loader.
///
/// Leaves carry `value`; internal nodes carry `children`. The published
/// datasets encode values as strings (`"20.32"`), so both forms are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "deserialize_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            category: None,
            children: None,
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            value: None,
            category: None,
            children: Some(children),
        }
    }

    /// Number of nodes in this subtree, including itself.
    pub fn count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(TreeNode::count)
            .sum::<usize>()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

fn deserialize_value<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawValue> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(RawValue::Number(n)) => Ok(Some(n)),
        Some(RawValue::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid numeric value '{s}': {e}"))),
    }
}

/// Build a validated `Hierarchy` from a parsed `TreeNode`.
///
/// Aggregates values bottom-up and sorts every child list into layout order.
/// Uses an explicit stack so deep documents cannot overflow the call stack.
pub fn build_tree(root: &TreeNode) -> Result<Hierarchy> {
    let mut tree = Hierarchy::new(&root.name);
    {
        let r = tree.get_mut(tree.root);
        r.value = if root.children.is_some() { None } else { root.value };
        r.category = root.category.as_deref().map(CompactString::new);
    }
    check_shape(root, tree.get(tree.root).id.as_str())?;

    let mut stack: Vec<(&TreeNode, NodeId)> = vec![(root, tree.root)];
    while let Some((node, id)) = stack.pop() {
        let Some(children) = &node.children else {
            continue;
        };
        let mut added = Vec::with_capacity(children.len());
        for child in children {
            let child_id = tree.add_child(
                id,
                HierarchyNode {
                    name: CompactString::new(&child.name),
                    id: CompactString::default(),
                    category: child.category.as_deref().map(CompactString::new),
                    value: if child.children.is_some() { None } else { child.value },
                    aggregate: 0.0,
                    parent: None,
                    first_child: None,
                    next_sibling: None,
                    depth: 0,
                    height: 0,
                    order: 0,
                },
            );
            check_shape(child, tree.get(child_id).id.as_str())?;
            added.push((child, child_id));
        }
        // Reverse so the first child is processed first.
        stack.extend(added.into_iter().rev());
    }

    aggregate::aggregate_values(&mut tree)?;
    aggregate::sort_children(&mut tree);

    tracing::info!(
        "Hierarchy built: {} nodes, {} leaves, total value {:.2}",
        tree.len(),
        tree.leaves().count(),
        tree.get(tree.root).aggregate
    );

    Ok(tree)
}

fn check_shape(node: &TreeNode, id: &str) -> Result<()> {
    if let Some(children) = &node.children {
        if children.is_empty() {
            return Err(TreemapError::invalid_tree(
                id,
                "node has neither children nor a value",
            ));
        }
        if node.value.is_some() {
            tracing::debug!("Ignoring own value of internal node '{}'", id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_and_number_values() {
        let json = r#"{
            "name": "Video Game Sales Data Top 100",
            "children": [
                {"name": "Wii", "children": [
                    {"name": "Wii Sports", "category": "Wii", "value": "82.53"},
                    {"name": "Mario Kart Wii", "category": "Wii", "value": 35.52}
                ]}
            ]
        }"#;
        let root: TreeNode = serde_json::from_str(json).unwrap();
        let wii = &root.children.as_ref().unwrap()[0];
        let games = wii.children.as_ref().unwrap();
        assert_eq!(games[0].value, Some(82.53));
        assert_eq!(games[1].value, Some(35.52));
        assert_eq!(games[0].category.as_deref(), Some("Wii"));
        assert_eq!(root.count(), 4);
    }

    #[test]
    fn rejects_garbage_value_strings() {
        let json = r#"{"name": "x", "value": "lots"}"#;
        assert!(serde_json::from_str::<TreeNode>(json).is_err());
    }

    #[test]
    fn builds_ids_and_depths() {
        let root = TreeNode::branch(
            "root",
            vec![TreeNode::branch("Wii", vec![TreeNode::leaf("Wii Sports", 82.53)])],
        );
        let tree = build_tree(&root).unwrap();
        let leaf = tree.leaves().next().unwrap();
        let node = tree.get(leaf);
        assert_eq!(node.id.as_str(), "root.Wii.Wii Sports");
        assert_eq!(node.depth, 2);
        assert_eq!(tree.get(node.parent.unwrap()).name.as_str(), "Wii");
    }

    #[test]
    fn single_leaf_root_is_valid() {
        let tree = build_tree(&TreeNode::leaf("solo", 5.0)).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(tree.root).aggregate, 5.0);
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let mut node = TreeNode::leaf("bottom", 1.0);
        for i in 0..1_000 {
            node = TreeNode::branch(format!("n{i}"), vec![node]);
        }
        let tree = build_tree(&node).unwrap();
        assert_eq!(tree.len(), 1_001);
        assert_eq!(tree.get(tree.root).height, 1_000);
    }
}
