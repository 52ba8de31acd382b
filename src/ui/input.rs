use crate::layout::LayoutTree;
use crate::tree::arena::NodeId;

/// Mouse state tracking.
#[derive(Debug, Default, Clone, Copy)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    /// Whether the cursor is inside the window
    pub inside: bool,
}

/// Hit-test: find the leaf tile under (`x`, `y`), in treemap coordinates.
/// Padding gaps between tiles hit nothing.
pub fn hit_test(layout: &LayoutTree, x: f64, y: f64) -> Option<NodeId> {
    // Leaves come after their ancestors; search from the back for the deepest hit.
    layout
        .nodes
        .iter()
        .rev()
        .find(|n| n.is_leaf && n.contains(x, y))
        .map(|n| n.node)
}

/// Input action produced from raw input events.
#[derive(Debug, PartialEq)]
pub enum InputAction {
    /// Pointer moved onto a tile (or off every tile)
    Hover { node: Option<NodeId> },
    /// No action
    None,
}

/// Translate a cursor move into a hover action, given where the treemap is drawn.
pub fn process_cursor(
    layout: &LayoutTree,
    mouse: &MouseState,
    origin: (f64, f64),
    current: Option<NodeId>,
) -> InputAction {
    let (x, y) = (mouse.x as f64 - origin.0, mouse.y as f64 - origin.1);
    // Most moves stay on the hovered tile.
    if let Some(rect) = current.and_then(|id| layout.get(id)) {
        if rect.contains(x, y) {
            return InputAction::None;
        }
    }
    let node = hit_test(layout, x, y);
    if node == current {
        InputAction::None
    } else {
        InputAction::Hover { node }
    }
}
