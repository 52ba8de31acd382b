use compact_str::CompactString;

use crate::layout::LayoutTree;
use crate::render::colors::{AppColor, ColorScale, FALLBACK};
use crate::tree::arena::{Hierarchy, NodeId};

/// Geometry of the legend grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendStyle {
    /// Width of one legend cell (swatch + text)
    pub cell_width: f64,
    pub row_height: f64,
    pub swatch_size: f64,
    /// Space between the swatch and its text
    pub gap: f64,
}

impl Default for LegendStyle {
    fn default() -> Self {
        Self {
            cell_width: 90.0,
            row_height: 20.0,
            swatch_size: 12.0,
            gap: 4.0,
        }
    }
}

/// A positioned legend item: swatch at (`x`, `y`), text to its right.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub name: CompactString,
    /// Category key (dotted id of the first-level node)
    pub category: CompactString,
    pub color: AppColor,
    pub x: f64,
    pub y: f64,
}

/// First-level children of the root in input order (layout order is by value).
fn categories(tree: &Hierarchy) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = tree.children(tree.root).collect();
    ids.sort_by_key(|&id| tree.get(id).order);
    ids
}

/// One entry per first-level child of the root, in input order, wrapped into
/// rows that fit `max_width`. Each entry's position is relative to the legend origin.
pub fn legend_entries(
    tree: &Hierarchy,
    colors: &ColorScale,
    max_width: f64,
    style: &LegendStyle,
) -> Vec<LegendEntry> {
    let per_row = ((max_width / style.cell_width).floor() as usize).max(1);
    categories(tree)
        .into_iter()
        .enumerate()
        .map(|(i, id)| {
            let node = tree.get(id);
            LegendEntry {
                name: node.name.clone(),
                category: node.id.clone(),
                color: colors.get(&node.id).unwrap_or(FALLBACK),
                x: (i % per_row) as f64 * style.cell_width,
                y: (i / per_row) as f64 * style.row_height,
            }
        })
        .collect()
}

/// Category key of a tile: the dotted id of its parent (the node itself for a lone root).
pub fn category_of<'a>(tree: &'a Hierarchy, node: NodeId) -> &'a str {
    let n = tree.get(node);
    match n.parent {
        Some(p) => tree.get(p).id.as_str(),
        None => n.id.as_str(),
    }
}

/// Colour scale keyed by the first-level children, assigned in input order.
/// Deeper tiles look up their parent's key, so nested categories still resolve.
pub fn category_colors(tree: &Hierarchy, layout: &LayoutTree) -> ColorScale {
    let mut scale = ColorScale::for_categories(
        categories(tree).into_iter().map(|id| tree.get(id).id.as_str()),
    );
    for leaf in layout.leaves() {
        scale.color(category_of(tree, leaf.node));
    }
    scale
}
