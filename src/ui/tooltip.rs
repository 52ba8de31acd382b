use crate::tree::arena::{Hierarchy, NodeId};

/// Information to display in the tooltip when hovering over a tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipInfo {
    pub name: String,
    /// Display name of the enclosing category
    pub category: String,
    pub value: f64,
    pub value_display: String,
}

impl TooltipInfo {
    /// Lines as shown in the tooltip box.
    pub fn lines(&self) -> [String; 3] {
        [
            format!("Name: {}", self.name),
            format!("Category: {}", self.category),
            format!("Value: {}", self.value_display),
        ]
    }
}

/// Build tooltip info for a node.
pub fn build_tooltip(tree: &Hierarchy, node_id: NodeId) -> TooltipInfo {
    let node = tree.get(node_id);
    let category = node
        .category
        .as_ref()
        .map(|c| c.to_string())
        .or_else(|| node.parent.map(|p| tree.get(p).name.to_string()))
        .unwrap_or_default();

    TooltipInfo {
        name: node.name.to_string(),
        category,
        value: node.aggregate,
        value_display: format_value(node.aggregate),
    }
}

/// Format a value with `,` thousands separators and at most two decimals.
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    if value < 0.0 && fixed.bytes().any(|b| b != b'0' && b != b'.') {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !frac.is_empty() {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{build_tree, TreeNode};

    #[test]
    fn formats_values_like_a_ledger() {
        assert_eq!(format_value(82.53), "82.53");
        assert_eq!(format_value(1_234_567.0), "1,234,567");
        assert_eq!(format_value(1234.5), "1,234.5");
        assert_eq!(format_value(999.999), "1,000");
        assert_eq!(format_value(-4200.0), "-4,200");
        assert_eq!(format_value(0.0), "0");
    }

    #[test]
    fn tooltip_names_the_leaf_and_its_category() {
        let mut wii_sports = TreeNode::leaf("Wii Sports", 82.53);
        wii_sports.category = Some("Wii".into());
        let root = TreeNode::branch(
            "games",
            vec![
                TreeNode::branch("Wii", vec![wii_sports]),
                TreeNode::branch("NES", vec![TreeNode::leaf("Duck Hunt", 28.31)]),
            ],
        );
        let tree = build_tree(&root).unwrap();
        let leaves: Vec<_> = tree.leaves().collect();

        let first = build_tooltip(&tree, leaves[0]);
        assert_eq!(first.name, "Wii Sports");
        assert_eq!(first.category, "Wii");
        assert_eq!(first.value_display, "82.53");

        // Without a category tag the parent's name is used.
        let second = build_tooltip(&tree, leaves[1]);
        assert_eq!(second.category, "NES");
        assert_eq!(second.lines()[2], "Value: 28.31");
    }
}
