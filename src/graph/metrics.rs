//! Subtree metrics
//!
//! Per-node subtree depth (nodes on the longest downward path, leaf = 1) and
//! subtree width (leaf descendants, leaf = 1). Both come from one reverse
//! pre-order sweep over the arena, so the cost is O(N) with no recursion.

use super::network::NetworkTree;
use super::types::TreeNode;
use crate::error::GraphResult;

/// Metrics for a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtreeMetrics {
    pub depth: usize,
    pub width: usize,
}

/// Metrics for a whole tree, indexed like the arena
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeMetrics {
    per_node: Vec<SubtreeMetrics>,
    /// Node count per traversal depth
    level_counts: Vec<usize>,
}

impl TreeMetrics {
    /// Compute metrics for an already validated arena
    pub fn analyze(tree: &NetworkTree) -> Self {
        let nodes = tree.nodes();
        let mut per_node = vec![SubtreeMetrics { depth: 1, width: 1 }; nodes.len()];
        let mut level_counts = vec![0usize; tree.max_depth() + 1];

        // Children always follow their parent in pre-order
        for (index, node) in nodes.iter().enumerate().rev() {
            level_counts[node.depth] += 1;
            if node.is_leaf() {
                continue;
            }
            let mut depth = 0;
            let mut width = 0;
            for &child in &node.children {
                depth = depth.max(per_node[child].depth);
                width += per_node[child].width;
            }
            per_node[index] = SubtreeMetrics {
                depth: depth + 1,
                width: width.max(1),
            };
        }

        if nodes.is_empty() {
            level_counts.clear();
        }

        Self {
            per_node,
            level_counts,
        }
    }

    /// Strict entry point for a raw payload.
    ///
    /// Any repeated id is reported instead of silently pruned.
    pub fn of(root: &TreeNode) -> GraphResult<Self> {
        let tree = NetworkTree::build_quiet(root, "");
        if let Some(err) = tree.structural_error() {
            return Err(err.clone());
        }
        Ok(Self::analyze(&tree))
    }

    pub fn get(&self, index: usize) -> Option<SubtreeMetrics> {
        self.per_node.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.per_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_node.is_empty()
    }

    /// Depth of the whole tree (root subtree depth)
    pub fn tree_depth(&self) -> usize {
        self.per_node.first().map(|m| m.depth).unwrap_or(0)
    }

    /// Leaf count of the whole tree
    pub fn leaf_count(&self) -> usize {
        self.per_node.first().map(|m| m.width).unwrap_or(0)
    }

    /// Number of nodes at each traversal depth
    pub fn level_counts(&self) -> &[usize] {
        &self.level_counts
    }

    /// Largest number of nodes sharing one depth
    pub fn max_breadth(&self) -> usize {
        self.level_counts.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_node() {
        let metrics = TreeMetrics::of(&TreeNode::new("solo")).unwrap();
        assert_eq!(metrics.get(0), Some(SubtreeMetrics { depth: 1, width: 1 }));
        assert_eq!(metrics.tree_depth(), 1);
        assert_eq!(metrics.leaf_count(), 1);
        assert_eq!(metrics.level_counts(), &[1]);
    }

    #[test]
    fn test_three_by_two() {
        let root = TreeNode::new("r").with_children((0..3).map(|i| {
            TreeNode::new(format!("c{}", i)).with_children(
                (0..2).map(move |j| TreeNode::new(format!("c{}-{}", i, j))),
            )
        }));
        let metrics = TreeMetrics::of(&root).unwrap();

        assert_eq!(metrics.len(), 10);
        assert_eq!(metrics.get(0), Some(SubtreeMetrics { depth: 3, width: 6 }));
        assert_eq!(metrics.get(1), Some(SubtreeMetrics { depth: 2, width: 2 }));
        assert_eq!(metrics.get(2), Some(SubtreeMetrics { depth: 1, width: 1 }));
        assert_eq!(metrics.level_counts(), &[1, 3, 6]);
        assert_eq!(metrics.max_breadth(), 6);
    }

    #[test]
    fn test_two_by_two() {
        let root = TreeNode::new("r").with_children((0..2).map(|i| {
            TreeNode::new(format!("c{}", i)).with_children(
                (0..2).map(move |j| TreeNode::new(format!("c{}-{}", i, j))),
            )
        }));
        let metrics = TreeMetrics::of(&root).unwrap();

        assert_eq!(metrics.len(), 7);
        assert_eq!(metrics.get(0), Some(SubtreeMetrics { depth: 3, width: 4 }));
        assert_eq!(metrics.level_counts(), &[1, 2, 4]);
    }

    #[test]
    fn test_uneven_branches() {
        let root = TreeNode::new("r")
            .with_child(TreeNode::new("a").with_child(
                TreeNode::new("a1").with_child(TreeNode::new("a11")),
            ))
            .with_child(TreeNode::new("b"));
        let metrics = TreeMetrics::of(&root).unwrap();
        assert_eq!(metrics.tree_depth(), 4);
        assert_eq!(metrics.leaf_count(), 2);
    }

    #[test]
    fn test_cycle_is_an_error() {
        let root = TreeNode::new("r").with_child(TreeNode::new("a").with_child(TreeNode::new("r")));
        let err = TreeMetrics::of(&root).unwrap_err();
        assert_eq!(
            err,
            GraphError::StructuralCycle {
                node_id: "r".into(),
                depth: 2
            }
        );
    }

    #[test]
    fn test_empty_arena() {
        let metrics = TreeMetrics::analyze(&NetworkTree::default());
        assert!(metrics.is_empty());
        assert_eq!(metrics.tree_depth(), 0);
        assert!(metrics.level_counts().is_empty());
    }
}
