//! Property-based invariant tests for the treemap layout.
//!
//! These tests verify structural invariants that must hold for any valid hierarchy:
//!
//! 1. Without padding or rounding, every rectangle's area is proportional to its value.
//! 2. Children tile their parent exactly when there is no padding.
//! 3. Every rectangle lies inside its parent, with any padding and rounding.
//! 4. Sibling rectangles never overlap, with any padding and rounding.
//! 5. Determinism: the same input always produces the same layout.
//! 6. Rounded layouts have integer edges.
//! 7. Every tiling method preserves proportionality.
//! 8. Non-positive or non-finite viewports are rejected.
//! 9. Every leaf ends up in the layout.
//! 10. Rounding moves no edge by more than half a pixel.

use proptest::prelude::*;
use salesview_rs::layout::{compute_layout, LayoutConfig, TileMethod};
use salesview_rs::tree::TreeNode;
use salesview_rs::TreemapError;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Hierarchies up to four levels deep with positive leaf values.
fn arb_tree() -> impl Strategy<Value = TreeNode> {
    let leaf = (1u32..=10_000).prop_map(|v| TreeNode::leaf("leaf", v as f64 / 100.0));
    leaf.prop_recursive(3, 96, 8, |inner| {
        proptest::collection::vec(inner, 1..=8).prop_map(|children| {
            let children = children
                .into_iter()
                .enumerate()
                .map(|(i, mut c)| {
                    c.name = format!("n{i}");
                    c
                })
                .collect();
            TreeNode::branch("branch", children)
        })
    })
}

fn arb_viewport() -> impl Strategy<Value = (f64, f64)> {
    (20u32..=1600, 20u32..=1200).prop_map(|(w, h)| (w as f64, h as f64))
}

fn arb_tile() -> impl Strategy<Value = TileMethod> {
    prop_oneof![
        (1.0f64..4.0).prop_map(|ratio| TileMethod::Squarify { ratio }),
        Just(TileMethod::Slice),
        Just(TileMethod::Dice),
        Just(TileMethod::SliceDice),
    ]
}

fn count_leaves(node: &TreeNode) -> usize {
    match &node.children {
        Some(children) => children.iter().map(count_leaves).sum(),
        None => 1,
    }
}

fn close(a: f64, b: f64, rel: f64) -> bool {
    (a - b).abs() <= rel * a.abs().max(b.abs()).max(1.0)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Area proportional to value
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn area_is_proportional_to_value(root in arb_tree(), (w, h) in arb_viewport()) {
        let (tree, layout) = compute_layout(&root, w, h, &LayoutConfig::default()).unwrap();
        let total = tree.get(tree.root).aggregate;
        let viewport = w * h;

        for rect in &layout.nodes {
            let expected = rect.value / total * viewport;
            prop_assert!(
                close(rect.area(), expected, 1e-6),
                "'{}' has area {} but value share {}",
                tree.get(rect.node).id, rect.area(), expected
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Children tile their parent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn children_tile_parent_without_padding(root in arb_tree(), (w, h) in arb_viewport()) {
        let (_, layout) = compute_layout(&root, w, h, &LayoutConfig::default()).unwrap();
        for (i, parent) in layout.nodes.iter().enumerate() {
            let kids = layout.children(i);
            if kids.is_empty() {
                continue;
            }
            let sum: f64 = kids.iter().map(|&k| layout.nodes[k].area()).sum();
            prop_assert!(close(sum, parent.area(), 1e-6), "children cover {} of {}", sum, parent.area());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3-4. Containment and no sibling overlap, with padding and rounding
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn contained_and_disjoint(
        root in arb_tree(),
        (w, h) in arb_viewport(),
        inner in 0.0f64..6.0,
        outer in 0.0f64..6.0,
        round in any::<bool>(),
        tile in arb_tile(),
    ) {
        let config = LayoutConfig { inner_padding: inner, outer_padding: outer, round, tile };
        let (_, layout) = compute_layout(&root, w, h, &config).unwrap();

        prop_assert!(layout.is_contained(1e-9), "a rectangle escapes its parent");
        prop_assert_eq!(layout.find_overlap(1e-9), None);

        let r = layout.root();
        prop_assert!(r.x0 >= 0.0 && r.y0 >= 0.0 && r.x1 <= w && r.y1 <= h);
        for rect in &layout.nodes {
            prop_assert!(rect.x0 <= rect.x1 && rect.y0 <= rect.y1, "inverted rectangle {:?}", rect);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_is_deterministic(root in arb_tree(), (w, h) in arb_viewport(), round in any::<bool>()) {
        let config = LayoutConfig { inner_padding: 1.0, round, ..LayoutConfig::default() };
        let (_, first) = compute_layout(&root, w, h, &config).unwrap();
        let (_, second) = compute_layout(&root, w, h, &config).unwrap();
        prop_assert_eq!(first.nodes, second.nodes);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Rounded edges are integers
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rounded_edges_are_whole_pixels(root in arb_tree(), (w, h) in arb_viewport()) {
        let config = LayoutConfig { inner_padding: 1.0, round: true, ..LayoutConfig::default() };
        let (_, layout) = compute_layout(&root, w, h, &config).unwrap();
        for rect in &layout.nodes {
            for edge in [rect.x0, rect.y0, rect.x1, rect.y1] {
                prop_assert_eq!(edge.fract(), 0.0, "edge {} is fractional", edge);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Every tiling method preserves proportionality
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn every_tile_method_is_proportional(root in arb_tree(), tile in arb_tile()) {
        let config = LayoutConfig { tile, ..LayoutConfig::default() };
        let (tree, layout) = compute_layout(&root, 400.0, 300.0, &config).unwrap();
        let total = tree.get(tree.root).aggregate;
        for leaf in layout.leaves() {
            prop_assert!(close(leaf.area(), leaf.value / total * 120_000.0, 1e-6));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Bad viewports are rejected
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn non_positive_viewport_is_rejected(
        root in arb_tree(),
        w in prop_oneof![Just(0.0f64), -1000.0f64..0.0, Just(f64::NAN), Just(f64::INFINITY)],
        h in 1.0f64..1000.0,
        swap in any::<bool>(),
    ) {
        let (w, h) = if swap { (h, w) } else { (w, h) };
        let err = compute_layout(&root, w, h, &LayoutConfig::default()).unwrap_err();
        let is_viewport_error = matches!(err, TreemapError::InvalidViewport { .. });
        prop_assert!(is_viewport_error, "unexpected error {:?}", err);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 9. No leaf is lost
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn every_leaf_is_laid_out(root in arb_tree()) {
        let (tree, layout) = compute_layout(&root, 600.0, 473.0, &LayoutConfig::default()).unwrap();
        prop_assert_eq!(layout.len(), tree.len());
        prop_assert_eq!(layout.leaves().count(), count_leaves(&root));
        for rect in layout.leaves() {
            prop_assert!(tree.get(rect.node).is_leaf());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Layout results can cross threads
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn layout_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<salesview_rs::tree::arena::Hierarchy>();
    assert_send_sync::<salesview_rs::layout::LayoutTree>();
}

// ═════════════════════════════════════════════════════════════════════════
// 10. Rounding stays within half a pixel of the exact layout
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rounding_moves_edges_by_at_most_half_a_pixel(
        root in arb_tree(),
        (w, h) in arb_viewport(),
        inner in 0.0f64..4.0,
    ) {
        let exact = LayoutConfig { inner_padding: inner, ..LayoutConfig::default() };
        let rounded = LayoutConfig { round: true, ..exact.clone() };
        let (_, a) = compute_layout(&root, w, h, &exact).unwrap();
        let (_, b) = compute_layout(&root, w, h, &rounded).unwrap();

        prop_assert_eq!(a.len(), b.len());
        for (e, r) in a.nodes.iter().zip(&b.nodes) {
            prop_assert_eq!(e.node, r.node);
            for (x, y) in [(e.x0, r.x0), (e.y0, r.y0), (e.x1, r.x1), (e.y1, r.y1)] {
                prop_assert!((x - y).abs() <= 0.5, "edge {} rounded to {}", x, y);
            }
        }
    }
}
