//! Property tests for the layout engine and viewport math
//!
//! Trees are generated as parent-index vectors: node `i` (i > 0) hangs under
//! some node `< i`, so every generated shape is a valid tree.

use std::collections::{BTreeMap, HashSet};

use egui::{Pos2, Rect, Vec2};
use ib_network_graph::{GraphSettings, LayoutEngine, TreeMetrics, TreeNode, ViewportController};
use proptest::prelude::*;

fn build_tree(parents: &[usize]) -> TreeNode {
    let count = parents.len() + 1;
    let mut kids: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (i, &parent) in parents.iter().enumerate() {
        kids[parent].push(i + 1);
    }

    let mut built: Vec<Option<TreeNode>> = (0..count).map(|_| None).collect();
    for index in (0..count).rev() {
        let children: Vec<TreeNode> = kids[index]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[index] = Some(
            TreeNode::new(format!("n{}", index))
                .with_name(format!("Node {}", index))
                .with_email(format!("n{}@example.com", index))
                .with_referral_code(format!("R{}", index))
                .with_children(children),
        );
    }
    built[0].take().unwrap_or_else(|| TreeNode::new("n0"))
}

fn arb_parents() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<prop::sample::Index>(), 0..60).prop_map(|picks| {
        picks
            .iter()
            .enumerate()
            .map(|(i, pick)| pick.index(i + 1))
            .collect()
    })
}

fn arb_canvas() -> impl Strategy<Value = (f32, f32)> {
    (200.0f32..2000.0, 200.0f32..1500.0)
}

proptest! {
    #[test]
    fn every_node_is_placed_once(parents in arb_parents(), (w, h) in arb_canvas()) {
        let tree = build_tree(&parents);
        let layout = LayoutEngine::default().layout(&tree, w, h, "N/A");

        prop_assert_eq!(layout.nodes.len(), parents.len() + 1);
        prop_assert_eq!(layout.links.len(), parents.len());
        prop_assert!(layout.diagnostics.is_empty());

        let ids: HashSet<&str> = layout.nodes.iter().map(|n| n.id.as_str()).collect();
        prop_assert_eq!(ids.len(), layout.nodes.len());

        for link in &layout.links {
            prop_assert_eq!(layout.nodes[link.target].parent, Some(link.source));
            prop_assert!(layout.nodes[link.target].y > layout.nodes[link.source].y);
        }
    }

    #[test]
    fn same_depth_nodes_keep_their_distance(parents in arb_parents(), (w, h) in arb_canvas()) {
        let engine = LayoutEngine::default();
        let layout = engine.layout(&build_tree(&parents), w, h, "N/A");

        let mut rows: BTreeMap<usize, Vec<f32>> = BTreeMap::new();
        for node in &layout.nodes {
            rows.entry(node.layout_depth).or_default().push(node.x);
        }
        let diameter = engine.settings().min_node_radius * 2.0;
        for (depth, mut xs) in rows {
            xs.sort_by(f32::total_cmp);
            let required = diameter * engine.settings().depth_multiplier(depth);
            for pair in xs.windows(2) {
                prop_assert!(
                    pair[1] - pair[0] >= required - 1e-2,
                    "depth {}: gap {} < {}",
                    depth,
                    pair[1] - pair[0],
                    required
                );
            }
        }
    }

    #[test]
    fn layout_is_deterministic(parents in arb_parents(), (w, h) in arb_canvas()) {
        let tree = build_tree(&parents);
        let engine = LayoutEngine::default();
        prop_assert_eq!(engine.layout(&tree, w, h, "N/A"), engine.layout(&tree, w, h, "N/A"));
    }

    #[test]
    fn metrics_agree_with_layout(parents in arb_parents()) {
        let tree = build_tree(&parents);
        let metrics = TreeMetrics::of(&tree);
        prop_assert!(metrics.is_ok());
        if let Ok(metrics) = metrics {
            prop_assert_eq!(metrics.len(), parents.len() + 1);
            prop_assert_eq!(metrics.level_counts().iter().sum::<usize>(), parents.len() + 1);
            prop_assert!(metrics.leaf_count() >= 1);
        }
    }

    #[test]
    fn fit_contains_the_content(parents in arb_parents(), (w, h) in arb_canvas()) {
        let settings = GraphSettings::default();
        let layout = LayoutEngine::new(&settings.layout).layout(&build_tree(&parents), w, h, "N/A");

        let mut viewport = ViewportController::new(&settings.viewport);
        viewport.set_viewport_size(Vec2::new(w, h));
        let transform = viewport.fit_to_content(layout.bounds(), false);
        prop_assert!(transform.is_finite());

        if let Some(bounds) = layout.bounds() {
            let degenerate = bounds.width() < 1e-3 || bounds.height() < 1e-3;
            let clamped_low = transform.scale <= viewport.min_scale() + 1e-6;
            if !degenerate && !clamped_low {
                let screen = Rect::from_min_size(Pos2::ZERO, Vec2::new(w, h)).expand(0.5);
                prop_assert!(screen.contains_rect(transform.apply_rect(bounds)));
            }
        }
    }

    #[test]
    fn center_on_lands_in_the_middle(
        parents in arb_parents(),
        (w, h) in arb_canvas(),
        pick in any::<prop::sample::Index>(),
        zooms in 0usize..4,
    ) {
        let settings = GraphSettings::default();
        let layout = LayoutEngine::new(&settings.layout).layout(&build_tree(&parents), w, h, "N/A");
        let node = &layout.nodes[pick.index(layout.nodes.len())];

        let mut viewport = ViewportController::new(&settings.viewport);
        viewport.set_viewport_size(Vec2::new(w, h));
        for _ in 0..zooms {
            viewport.zoom_in(settings.viewport.zoom_step);
        }
        viewport.center_on_node(node);
        viewport.snap_to_target();

        let screen = viewport.world_to_screen(node.position());
        prop_assert!(screen.distance(viewport.viewport_center()) < 1.0);
    }
}
