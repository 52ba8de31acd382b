pub mod squarify;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use self::squarify::{Cell, GOLDEN_RATIO};
use crate::error::{Result, TreemapError};
use crate::tree::arena::{Hierarchy, NodeId};
use crate::tree::{build_tree, TreeNode};

/// A positioned rectangle in the treemap layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutNode {
    pub node: NodeId,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub depth: u16,
    /// Aggregate value of the subtree this rectangle stands for
    pub value: f64,
    /// Index of the enclosing rectangle in `LayoutTree::nodes` (None for root)
    pub parent: Option<usize>,
    pub is_leaf: bool,
}

impl LayoutNode {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    fn cell(&self) -> Cell {
        Cell::new(self.x0, self.y0, self.x1, self.y1)
    }
}

/// The full layout result (rects + fast lookup).
///
/// Immutable once built; lay the hierarchy out again for a different size.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    /// One rectangle per hierarchy node, parents before children
    pub nodes: Vec<LayoutNode>,
    /// node → index into `nodes`
    pub node_to_index: HashMap<NodeId, usize>,
    children: Vec<Vec<usize>>,
    pub width: f64,
    pub height: f64,
}

impl LayoutTree {
    pub fn root(&self) -> &LayoutNode {
        &self.nodes[0]
    }

    pub fn get(&self, node: NodeId) -> Option<&LayoutNode> {
        self.node_to_index.get(&node).map(|&i| &self.nodes[i])
    }

    /// Indices of the immediate children of `nodes[index]`, in layout order.
    pub fn children(&self, index: usize) -> &[usize] {
        &self.children[index]
    }

    pub fn leaves(&self) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.iter().filter(|n| n.is_leaf)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// How an internal node's area is split among its children.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TileMethod {
    /// Squarified rows aiming for `ratio` (golden ratio by default)
    Squarify { ratio: f64 },
    /// Stack children top to bottom
    Slice,
    /// Stack children left to right
    Dice,
    /// Alternate slice and dice by depth
    SliceDice,
}

impl Default for TileMethod {
    fn default() -> Self {
        TileMethod::Squarify {
            ratio: GOLDEN_RATIO,
        }
    }
}

/// Configuration for treemap layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between sibling rectangles (px)
    pub inner_padding: f64,
    /// Inset of every internal node's content from its own edges (px)
    pub outer_padding: f64,
    /// Snap all edges to integer pixels
    pub round: bool,
    pub tile: TileMethod,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            inner_padding: 0.0,
            outer_padding: 0.0,
            round: false,
            tile: TileMethod::default(),
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("inner_padding", self.inner_padding),
            ("outer_padding", self.outer_padding),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(TreemapError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {v}"
                )));
            }
        }
        if let TileMethod::Squarify { ratio } = self.tile {
            if !(ratio.is_finite() && ratio >= 1.0) {
                return Err(TreemapError::InvalidConfig(format!(
                    "squarify ratio must be at least 1, got {ratio}"
                )));
            }
        }
        Ok(())
    }
}

/// Build the hierarchy for `root` and lay it out in one go.
pub fn compute_layout(
    root: &TreeNode,
    width: f64,
    height: f64,
    config: &LayoutConfig,
) -> Result<(Hierarchy, LayoutTree)> {
    let tree = build_tree(root)?;
    let layout = layout_hierarchy(&tree, width, height, config)?;
    Ok((tree, layout))
}

/// Lay out an already validated hierarchy in a `width` x `height` area.
///
/// Pure: the hierarchy is only read, and equal inputs give bit-identical output.
pub fn layout_hierarchy(
    tree: &Hierarchy,
    width: f64,
    height: f64,
    config: &LayoutConfig,
) -> Result<LayoutTree> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(TreemapError::InvalidViewport { width, height });
    }
    config.validate()?;

    let root = tree.get(tree.root);
    if !(root.aggregate.is_finite() && root.aggregate > 0.0) {
        return Err(TreemapError::invalid_tree(
            root.id.as_str(),
            "hierarchy has no positive total value",
        ));
    }

    tracing::info!(
        "Laying out {} nodes of '{}' (value={:.2}) in {:.0}x{:.0} area",
        tree.len(),
        root.name,
        root.aggregate,
        width,
        height
    );

    let mut nodes: Vec<LayoutNode> = Vec::with_capacity(tree.len());
    let mut children: Vec<Vec<usize>> = Vec::with_capacity(tree.len());
    let mut node_to_index = HashMap::with_capacity(tree.len());

    // Pre-order walk with an explicit stack: (node, parent index, assigned cell).
    let mut stack: Vec<(NodeId, Option<usize>, Cell)> =
        vec![(tree.root, None, Cell::new(0.0, 0.0, width, height))];
    let half_inner = config.inner_padding / 2.0;
    let mut child_ids: Vec<NodeId> = Vec::new();
    let mut values: Vec<f64> = Vec::new();

    while let Some((id, parent, cell)) = stack.pop() {
        let node = tree.get(id);

        // Every non-root rectangle gives up half the inner padding on each side.
        let pad = if parent.is_some() { half_inner } else { 0.0 };
        let mut own = inset(cell, pad);
        // Only collapsed slivers can poke out of the parent; pin them inside.
        if let Some(p) = parent {
            own = clamp_into(own, nodes[p].cell());
        }

        let index = nodes.len();
        nodes.push(LayoutNode {
            node: id,
            x0: own.x0,
            y0: own.y0,
            x1: own.x1,
            y1: own.y1,
            depth: node.depth,
            value: node.aggregate,
            parent,
            is_leaf: node.is_leaf(),
        });
        children.push(Vec::new());
        node_to_index.insert(id, index);
        if let Some(p) = parent {
            children[p].push(index);
        }

        if node.is_leaf() {
            continue;
        }

        // Grow the content box by the half padding the children will give back,
        // so outermost children end flush with this node's edges.
        let content = inset(own, config.outer_padding - half_inner);

        child_ids.clear();
        child_ids.extend(tree.children(id));
        values.clear();
        values.extend(child_ids.iter().map(|&c| tree.get(c).aggregate));

        let cells = tile(config.tile, node.depth, &values, content);
        if cells.len() != child_ids.len() {
            tracing::warn!(
                "Tiling '{}' produced {} cells for {} children",
                node.id,
                cells.len(),
                child_ids.len()
            );
        }

        // Reverse so the first child is popped (and numbered) first.
        for (&child, &child_cell) in child_ids.iter().zip(cells.iter()).rev() {
            stack.push((child, Some(index), child_cell));
        }
    }

    if config.round {
        for n in &mut nodes {
            n.x0 = round_px(n.x0);
            n.y0 = round_px(n.y0);
            n.x1 = round_px(n.x1);
            n.y1 = round_px(n.y1);
        }
    }

    tracing::debug!(
        "Layout computed: {} rectangles, {} leaves",
        nodes.len(),
        nodes.iter().filter(|n| n.is_leaf).count()
    );

    Ok(LayoutTree {
        nodes,
        node_to_index,
        children,
        width,
        height,
    })
}

fn tile(method: TileMethod, depth: u16, values: &[f64], area: Cell) -> Vec<Cell> {
    match method {
        TileMethod::Squarify { ratio } => squarify::squarify(values, ratio, area),
        TileMethod::Slice => squarify::slice(values, area),
        TileMethod::Dice => squarify::dice(values, area),
        TileMethod::SliceDice if depth % 2 == 0 => squarify::slice(values, area),
        TileMethod::SliceDice => squarify::dice(values, area),
    }
}

/// Shrink a cell by `pad` on every side (grow it for negative `pad`).
/// A side that would invert collapses to its midline instead.
fn inset(cell: Cell, pad: f64) -> Cell {
    let (mut x0, mut y0, mut x1, mut y1) = (cell.x0 + pad, cell.y0 + pad, cell.x1 - pad, cell.y1 - pad);
    if x1 < x0 {
        let mid = (x0 + x1) / 2.0;
        x0 = mid;
        x1 = mid;
    }
    if y1 < y0 {
        let mid = (y0 + y1) / 2.0;
        y0 = mid;
        y1 = mid;
    }
    Cell::new(x0, y0, x1, y1)
}

fn clamp_into(cell: Cell, bounds: Cell) -> Cell {
    Cell::new(
        cell.x0.clamp(bounds.x0, bounds.x1),
        cell.y0.clamp(bounds.y0, bounds.y1),
        cell.x1.clamp(bounds.x0, bounds.x1),
        cell.y1.clamp(bounds.y0, bounds.y1),
    )
}

/// Round half up, like the browser's `Math.round`. Monotone, so shared or
/// ordered edges keep their order after rounding.
fn round_px(v: f64) -> f64 {
    (v + 0.5).floor()
}

impl LayoutTree {
    /// Check containment of every child in its parent (with `tolerance`).
    pub fn is_contained(&self, tolerance: f64) -> bool {
        self.nodes.iter().all(|n| match n.parent {
            None => true,
            Some(p) => {
                let parent = self.nodes[p].cell();
                n.x0 >= parent.x0 - tolerance
                    && n.y0 >= parent.y0 - tolerance
                    && n.x1 <= parent.x1 + tolerance
                    && n.y1 <= parent.y1 + tolerance
            }
        })
    }

    /// First pair of sibling rectangles whose interiors intersect, if any.
    pub fn find_overlap(&self, tolerance: f64) -> Option<(usize, usize)> {
        for kids in &self.children {
            for (i, &a) in kids.iter().enumerate() {
                for &b in &kids[i + 1..] {
                    let (ra, rb) = (self.nodes[a].cell(), self.nodes[b].cell());
                    let ix = ra.x1.min(rb.x1) - ra.x0.max(rb.x0);
                    let iy = ra.y1.min(rb.y1) - ra.y0.max(rb.y0);
                    if ix > tolerance && iy > tolerance {
                        return Some((a, b));
                    }
                }
            }
        }
        None
    }
}
