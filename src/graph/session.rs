//! Layout session - serializes re-layout passes
//!
//! Tree refreshes and container resizes both invalidate the layout. Each
//! change bumps a generation counter; a layout pass is stamped with the
//! generation it was computed for and only the newest one is committed.
//! Results for superseded generations are discarded, never merged.
//!
//! `compute` takes `&self` and owns nothing mutable, so a host may run it on
//! another thread and hand the result back to `commit`.

use std::sync::Arc;

use egui::Vec2;

use super::layout::LayoutEngine;
use super::network::NetworkTree;
use super::types::{NetworkLayout, TreeNode};
use crate::error::GraphError;

/// Inputs for one layout pass
#[derive(Debug, Clone)]
pub struct LayoutTicket {
    pub generation: u64,
    tree: Option<Arc<NetworkTree>>,
    size: Vec2,
}

/// Output of one layout pass
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub generation: u64,
    pub layout: NetworkLayout,
}

#[derive(Debug, Clone)]
pub struct LayoutSession {
    engine: LayoutEngine,
    placeholder: String,
    /// Validated once per refresh; resizes reuse it
    tree: Option<Arc<NetworkTree>>,
    size: Vec2,
    /// Generation of the newest request
    latest: u64,
    /// Generation of the layout currently shown
    committed: u64,
    layout: NetworkLayout,
    discarded: usize,
}

impl LayoutSession {
    pub fn new(engine: LayoutEngine, placeholder: impl Into<String>) -> Self {
        Self {
            engine,
            placeholder: placeholder.into(),
            tree: None,
            size: Vec2::ZERO,
            latest: 0,
            committed: 0,
            layout: NetworkLayout::default(),
            discarded: 0,
        }
    }

    /// Replace the tree (`None` = no data). Returns the new generation.
    pub fn set_tree(&mut self, tree: Option<TreeNode>) -> u64 {
        self.tree = tree.map(|root| Arc::new(NetworkTree::build(&root, &self.placeholder)));
        self.bump("tree refresh")
    }

    /// Record a container size. Only an actual change starts a new pass.
    pub fn resize(&mut self, size: Vec2) -> Option<u64> {
        if size == self.size || !(size.x > 0.0 && size.y > 0.0) {
            return None;
        }
        self.size = size;
        Some(self.bump("resize"))
    }

    fn bump(&mut self, reason: &str) -> u64 {
        self.latest += 1;
        tracing::debug!("Layout generation {} requested ({})", self.latest, reason);
        self.latest
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn has_tree(&self) -> bool {
        self.tree.is_some()
    }

    /// Whether a newer request than the shown layout exists
    pub fn is_dirty(&self) -> bool {
        self.latest != self.committed
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest
    }

    pub fn committed_generation(&self) -> u64 {
        self.committed
    }

    /// Number of results thrown away as stale
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn layout(&self) -> &NetworkLayout {
        &self.layout
    }

    /// Snapshot of the inputs for the newest request, if not yet committed
    pub fn pending(&self) -> Option<LayoutTicket> {
        self.is_dirty().then(|| LayoutTicket {
            generation: self.latest,
            tree: self.tree.clone(),
            size: self.size,
        })
    }

    /// Run a layout pass for a ticket
    pub fn compute(&self, ticket: &LayoutTicket) -> LayoutResult {
        let layout = match ticket.tree.as_deref() {
            Some(tree) => self
                .engine
                .layout_network(tree, ticket.size.x, ticket.size.y),
            None => NetworkLayout {
                canvas_width: ticket.size.x,
                canvas_height: ticket.size.y,
                diagnostics: vec![GraphError::MissingData],
                ..Default::default()
            },
        };
        LayoutResult {
            generation: ticket.generation,
            layout,
        }
    }

    /// Install a result if it belongs to the newest request.
    ///
    /// Returns false (and drops the result) when it has been superseded.
    pub fn commit(&mut self, result: LayoutResult) -> bool {
        if result.generation != self.latest {
            self.discarded += 1;
            tracing::debug!(
                "Discarding stale layout generation {} (latest {})",
                result.generation,
                self.latest
            );
            return false;
        }
        self.committed = result.generation;
        self.layout = result.layout;
        true
    }

    /// Compute and commit the newest request synchronously.
    ///
    /// Returns true when a new layout was installed.
    pub fn run_pending(&mut self) -> bool {
        match self.pending() {
            Some(ticket) => {
                let result = self.compute(&ticket);
                self.commit(result)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> LayoutSession {
        LayoutSession::new(LayoutEngine::default(), "N/A")
    }

    fn tree(n: usize) -> TreeNode {
        TreeNode::new("r").with_children((0..n).map(|i| TreeNode::new(format!("c{}", i))))
    }

    #[test]
    fn test_initial_state() {
        let s = session();
        assert!(!s.is_dirty());
        assert!(s.pending().is_none());
        assert!(s.layout().is_empty());
    }

    #[test]
    fn test_run_pending() {
        let mut s = session();
        s.resize(Vec2::new(800.0, 600.0));
        s.set_tree(Some(tree(3)));
        assert!(s.is_dirty());
        assert!(s.run_pending());
        assert!(!s.is_dirty());
        assert_eq!(s.layout().nodes.len(), 4);
        assert!(!s.run_pending());
    }

    #[test]
    fn test_stale_result_discarded() {
        let mut s = session();
        s.resize(Vec2::new(800.0, 600.0));
        s.set_tree(Some(tree(2)));
        let old = s.pending().map(|t| s.compute(&t));

        // A resize lands while the first pass is in flight
        s.resize(Vec2::new(1200.0, 600.0));
        let new = s.pending().map(|t| s.compute(&t));

        if let Some(new) = new {
            assert!(s.commit(new));
        }
        if let Some(old) = old {
            assert!(!s.commit(old));
        }
        assert_eq!(s.discarded(), 1);
        assert_eq!(s.layout().canvas_width, 1200.0);
    }

    #[test]
    fn test_same_size_is_not_a_change() {
        let mut s = session();
        assert_eq!(s.resize(Vec2::new(800.0, 600.0)), Some(1));
        assert_eq!(s.resize(Vec2::new(800.0, 600.0)), None);
        assert_eq!(s.resize(Vec2::new(0.0, 600.0)), None);
    }

    #[test]
    fn test_resize_reuses_validated_tree() {
        let mut s = session();
        s.resize(Vec2::new(800.0, 600.0));
        s.set_tree(Some(tree(2).with_child(TreeNode::new(""))));
        assert!(s.run_pending());
        let before = s.layout().diagnostics.clone();
        assert!(before.contains(&GraphError::MalformedNode {
            node_id: "anon-3".into(),
            field: "id"
        }));

        s.resize(Vec2::new(1000.0, 700.0));
        assert!(s.run_pending());
        assert_eq!(s.layout().diagnostics, before);
        assert_eq!(s.layout().nodes.len(), 4);
        assert_eq!(s.layout().canvas_width, 1000.0);
    }

    #[test]
    fn test_missing_tree() {
        let mut s = session();
        s.resize(Vec2::new(800.0, 600.0));
        s.set_tree(None);
        assert!(s.run_pending());
        assert!(s.layout().is_empty());
        assert_eq!(s.layout().diagnostics, vec![GraphError::MissingData]);
    }
}
