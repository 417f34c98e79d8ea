//! R-tree over node markers for pointer hit testing
//!
//! Entries live in layout (world) space. Callers convert the pointer position
//! with the current viewport transform and scale their screen-pixel slop to
//! match before asking for a hit.

use egui::{Pos2, Rect};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use super::colors::node_radius;
use super::types::NetworkLayout;
use crate::config::RenderSettings;

/// One node marker: a disc in layout space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeDisc {
    /// Index into `NetworkLayout::nodes`
    pub index: usize,
    pub center: Pos2,
    pub radius: f32,
}

impl NodeDisc {
    /// Gap between `point` and the disc edge, 0 when inside
    pub fn gap_to(&self, point: Pos2) -> f32 {
        (self.center.distance(point) - self.radius).max(0.0)
    }
}

impl RTreeObject for NodeDisc {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.center.x - self.radius, self.center.y - self.radius],
            [self.center.x + self.radius, self.center.y + self.radius],
        )
    }
}

impl PointDistance for NodeDisc {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let gap = self.gap_to(Pos2::new(point[0], point[1]));
        gap * gap
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        self.center.distance_sq(Pos2::new(point[0], point[1])) <= self.radius * self.radius
    }
}

/// Spatial index rebuilt on every re-layout
#[derive(Clone, Default)]
pub struct SpatialIndex {
    tree: RTree<NodeDisc>,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("discs", &self.tree.size())
            .finish()
    }
}

impl SpatialIndex {
    /// Index every node of a layout with its role-dependent radius
    pub fn from_layout(layout: &NetworkLayout, settings: &RenderSettings) -> Self {
        let discs = layout
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| NodeDisc {
                index,
                center: node.position(),
                radius: node_radius(node.role, settings),
            })
            .collect();
        Self {
            tree: RTree::bulk_load(discs),
        }
    }

    /// Node whose disc lies within `slop` of `point`; the closest edge wins
    /// when markers overlap the search area.
    pub fn node_at(&self, point: Pos2, slop: f32) -> Option<usize> {
        let search = Rect::from_center_size(point, egui::Vec2::splat(2.0 * slop.max(0.0)));
        let envelope = AABB::from_corners([search.min.x, search.min.y], [search.max.x, search.max.y]);

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|disc| (disc.index, disc.gap_to(point)))
            .filter(|&(_, gap)| gap <= slop)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(index, _)| index)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::layout::LayoutEngine;
    use crate::graph::types::TreeNode;

    fn index_of(discs: Vec<NodeDisc>) -> SpatialIndex {
        SpatialIndex {
            tree: RTree::bulk_load(discs),
        }
    }

    fn disc(index: usize, x: f32, y: f32, radius: f32) -> NodeDisc {
        NodeDisc {
            index,
            center: Pos2::new(x, y),
            radius,
        }
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.node_at(Pos2::ZERO, 10.0), None);
    }

    #[test]
    fn test_inside_edge_and_miss() {
        let index = index_of(vec![disc(0, 100.0, 100.0, 10.0)]);

        assert_eq!(index.node_at(Pos2::new(100.0, 100.0), 0.0), Some(0));
        // 3px beyond the edge, 4px slop
        assert_eq!(index.node_at(Pos2::new(113.0, 100.0), 4.0), Some(0));
        assert_eq!(index.node_at(Pos2::new(115.0, 100.0), 4.0), None);
    }

    #[test]
    fn test_closest_disc_wins() {
        let index = index_of(vec![
            disc(0, 0.0, 0.0, 10.0),
            disc(1, 50.0, 0.0, 10.0),
            disc(2, 100.0, 0.0, 10.0),
        ]);
        assert_eq!(index.node_at(Pos2::new(48.0, 0.0), 15.0), Some(1));
        assert_eq!(index.node_at(Pos2::new(75.0, 0.0), 20.0), Some(1));
        assert_eq!(index.node_at(Pos2::new(76.0, 0.0), 20.0), Some(2));
    }

    #[test]
    fn test_from_layout() {
        let root = TreeNode::new("r")
            .with_child(TreeNode::new("a"))
            .with_child(TreeNode::new("b"));
        let layout = LayoutEngine::default().layout(&root, 800.0, 600.0, "N/A");
        let index = SpatialIndex::from_layout(&layout, &RenderSettings::default());

        assert_eq!(index.len(), 3);
        let b = &layout.nodes[2];
        assert_eq!(index.node_at(Pos2::new(b.x + 2.0, b.y), 0.0), Some(2));
    }
}
