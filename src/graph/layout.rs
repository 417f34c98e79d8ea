//! Layout algorithm - tidy top-down tree
//!
//! Subtrees are packed bottom-up with per-depth contours (Reingold-Tilford
//! style). Each child subtree is pushed right until, at every depth both
//! share, it clears its left neighbours by the separation for that depth:
//!
//! `separation(depth) = unit * base * (1 + depth_factor * depth)`
//!
//! where `base` is `sibling_spacing` for nodes sharing a parent and
//! `cousin_spacing` otherwise. A parent sits at the leaf-weighted center of
//! its children. The natural width is then stretched (never compressed) to
//! the canvas width and rows are spread over `height * vertical_fraction`.
//!
//! Traversal is driven by the pre-order arena, so there is no recursion.

use egui::Pos2;

use super::edges::link_path;
use super::metrics::TreeMetrics;
use super::network::NetworkTree;
use super::types::{LinkSegment, NetworkLayout, PositionedNode, TreeNode};
use crate::config::LayoutSettings;
use crate::error::{GraphError, GraphResult};

// =============================================================================
// CONTOURS
// =============================================================================

/// Leftmost and rightmost x per relative depth, relative to the subtree root
#[derive(Debug, Clone, Default)]
struct Contour {
    left: Vec<f32>,
    right: Vec<f32>,
}

impl Contour {
    fn point() -> Self {
        Self {
            left: vec![0.0],
            right: vec![0.0],
        }
    }

    fn len(&self) -> usize {
        self.left.len()
    }

    /// Add a subtree placed at `offset` to the combined children contour
    fn absorb(&mut self, other: &Contour, offset: f32) {
        for k in 0..other.len() {
            let l = other.left[k] + offset;
            let r = other.right[k] + offset;
            if k < self.len() {
                self.left[k] = self.left[k].min(l);
                self.right[k] = self.right[k].max(r);
            } else {
                self.left.push(l);
                self.right.push(r);
            }
        }
    }

    /// Contour of a parent at `center` above these combined children
    fn under_parent(self, center: f32) -> Self {
        let mut left = Vec::with_capacity(self.len() + 1);
        let mut right = Vec::with_capacity(self.len() + 1);
        left.push(0.0);
        right.push(0.0);
        left.extend(self.left.into_iter().map(|x| x - center));
        right.extend(self.right.into_iter().map(|x| x - center));
        Self { left, right }
    }
}

// =============================================================================
// LAYOUT ENGINE
// =============================================================================

/// Computes node positions for a partner network
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    settings: LayoutSettings,
}

impl LayoutEngine {
    pub fn new(settings: &LayoutSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Required center-to-center distance between adjacent nodes at `depth`
    pub fn separation(&self, depth: usize, siblings: bool) -> f32 {
        let base = if siblings {
            self.settings.sibling_spacing
        } else {
            self.settings.cousin_spacing
        };
        self.settings.spacing_unit() * base * self.settings.depth_multiplier(depth)
    }

    /// Validate, measure and lay out a payload tree.
    ///
    /// Never fails: structural problems drop the offending subtree and
    /// degenerate geometry yields an empty layout. Both end up in
    /// `NetworkLayout::diagnostics`.
    pub fn layout(&self, root: &TreeNode, width: f32, height: f32, placeholder: &str) -> NetworkLayout {
        self.layout_network(&NetworkTree::build(root, placeholder), width, height)
    }

    /// Infallible layout of an already validated arena; the arena's
    /// diagnostics are carried into the result.
    pub fn layout_network(&self, tree: &NetworkTree, width: f32, height: f32) -> NetworkLayout {
        match self.layout_tree(tree, width, height) {
            Ok(layout) => layout,
            Err(err) => {
                tracing::warn!("Layout failed, rendering nothing: {}", err);
                let mut diagnostics = tree.diagnostics().to_vec();
                diagnostics.push(err);
                NetworkLayout {
                    canvas_width: width,
                    canvas_height: height,
                    diagnostics,
                    ..Default::default()
                }
            }
        }
    }

    /// Lay out an already validated arena
    pub fn layout_tree(&self, tree: &NetworkTree, width: f32, height: f32) -> GraphResult<NetworkLayout> {
        if !(width.is_finite() && height.is_finite()) {
            return Err(GraphError::LayoutOverflow {
                reason: format!("canvas size {} x {} is not finite", width, height),
            });
        }

        let nodes = tree.nodes();
        if nodes.is_empty() {
            return Ok(NetworkLayout {
                canvas_width: width,
                canvas_height: height,
                diagnostics: tree.diagnostics().to_vec(),
                ..Default::default()
            });
        }

        let metrics = TreeMetrics::analyze(tree);
        let natural = self.natural_positions(tree, &metrics);

        // Horizontal: stretch to the canvas, keep half a separation at each end
        let margin = self.separation(0, true) / 2.0;
        let (min_x, max_x) = natural
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        let span = max_x - min_x;
        let kx = (width / (span + 2.0 * margin)).max(1.0);

        // Vertical: proportional to depth, never tighter than min_row_height
        let max_depth = tree.max_depth();
        let body = height.max(0.0) * self.settings.vertical_fraction - self.settings.top_offset;
        let row = (body / max_depth.max(1) as f32).max(self.settings.min_row_height);

        let mut positioned = Vec::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            let x = (natural[index] - min_x + margin) * kx;
            let y = self.settings.top_offset + node.depth as f32 * row;
            if !(x.is_finite() && y.is_finite()) {
                return Err(GraphError::LayoutOverflow {
                    reason: format!("node '{}' got non-finite position ({}, {})", node.id, x, y),
                });
            }
            positioned.push(PositionedNode {
                id: node.id.clone(),
                display_name: node.display_name.clone(),
                email_address: node.email_address.clone(),
                referral_code: node.referral_code.clone(),
                level: node.level,
                role: node.role,
                x,
                y,
                subtree_width: metrics.get(index).map(|m| m.width).unwrap_or(1),
                layout_depth: node.depth,
                child_count: node.children.len(),
                parent: node.parent,
            });
        }

        let links = positioned
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let parent = node.parent?;
                Some(LinkSegment {
                    source: parent,
                    target: index,
                    curve: link_path(positioned[parent].position(), node.position()),
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "Layout computed: {} nodes, {} links, depth {}, stretch {:.2}",
            positioned.len(),
            links.len(),
            max_depth,
            kx
        );

        Ok(NetworkLayout {
            nodes: positioned,
            links,
            canvas_width: width,
            canvas_height: height,
            diagnostics: tree.diagnostics().to_vec(),
        })
    }

    /// Unscaled x per node, root at 0
    fn natural_positions(&self, tree: &NetworkTree, metrics: &TreeMetrics) -> Vec<f32> {
        let nodes = tree.nodes();
        let mut contours: Vec<Option<Contour>> = (0..nodes.len()).map(|_| None).collect();
        let mut relative = vec![0.0f32; nodes.len()];

        // Reverse pre-order visits every child before its parent
        for (index, node) in nodes.iter().enumerate().rev() {
            if node.is_leaf() {
                contours[index] = Some(Contour::point());
                continue;
            }

            let child_depth = node.depth + 1;
            let mut merged = Contour::default();
            let mut offsets = Vec::with_capacity(node.children.len());

            for &child in &node.children {
                let contour = contours[child].take().unwrap_or_else(Contour::point);
                let offset = if offsets.is_empty() {
                    0.0
                } else {
                    (0..merged.len().min(contour.len()))
                        .map(|k| {
                            merged.right[k] - contour.left[k]
                                + self.separation(child_depth + k, k == 0)
                        })
                        .fold(f32::NEG_INFINITY, f32::max)
                };
                merged.absorb(&contour, offset);
                offsets.push(offset);
            }

            let mut weighted = 0.0;
            let mut total = 0.0;
            for (&child, &offset) in node.children.iter().zip(&offsets) {
                let w = metrics.get(child).map(|m| m.width).unwrap_or(1) as f32;
                weighted += w * offset;
                total += w;
            }
            let center = if total > 0.0 { weighted / total } else { 0.0 };

            for (&child, &offset) in node.children.iter().zip(&offsets) {
                relative[child] = offset - center;
            }
            contours[index] = Some(merged.under_parent(center));
        }

        // Pre-order: parents are resolved before their children
        let mut absolute = vec![0.0f32; nodes.len()];
        for (index, node) in nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                absolute[index] = absolute[parent] + relative[index];
            }
        }
        absolute
    }
}

/// Position lookup used by tests and callers that only need coordinates
pub fn positions_by_id(layout: &NetworkLayout) -> Vec<(String, Pos2)> {
    layout
        .nodes
        .iter()
        .map(|n| (n.id.clone(), n.position()))
        .collect()
}
