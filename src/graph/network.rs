//! Validated network arena
//!
//! Flattens a `TreeNode` payload into a pre-order arena, the form every later
//! stage works on. While flattening it:
//! - rejects subtrees whose id repeats an ancestor (`StructuralCycle`) or an
//!   id already placed elsewhere (`DuplicateNodeId`), keeping the rest;
//! - substitutes the placeholder for missing descriptive fields
//!   (`MalformedNode`), warning once per node.
//!
//! Traversal is iterative so arbitrarily deep chains cannot exhaust the stack.

use std::collections::HashSet;

use super::types::{NodeRole, TreeNode};
use crate::error::GraphError;

/// One accepted node
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkNode {
    pub id: String,
    pub display_name: String,
    pub email_address: String,
    pub referral_code: String,
    pub level: u32,
    pub role: NodeRole,
    /// Distance from the root (root = 0)
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Descriptive fields that were replaced by the placeholder
    pub missing_fields: Vec<&'static str>,
}

impl NetworkNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Sanitized tree in pre-order; index 0 is the root
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkTree {
    nodes: Vec<NetworkNode>,
    diagnostics: Vec<GraphError>,
}

enum Visit<'a> {
    Enter {
        node: &'a TreeNode,
        parent: Option<usize>,
        depth: usize,
    },
    Exit(String),
}

impl NetworkTree {
    /// Flatten and validate a payload tree, warning about every problem
    pub fn build(root: &TreeNode, placeholder: &str) -> Self {
        Self::flatten(root, placeholder, true)
    }

    /// Same validation without logging, for callers that only need shape
    /// (metrics, status lines) next to a tree that is also being drawn
    pub fn build_quiet(root: &TreeNode, placeholder: &str) -> Self {
        Self::flatten(root, placeholder, false)
    }

    fn flatten(root: &TreeNode, placeholder: &str, report: bool) -> Self {
        let mut tree = NetworkTree::default();
        let reserved = payload_ids(root);
        let mut visited: HashSet<String> = HashSet::new();
        let mut on_path: HashSet<String> = HashSet::new();
        let mut stack = vec![Visit::Enter {
            node: root,
            parent: None,
            depth: 0,
        }];

        while let Some(visit) = stack.pop() {
            let (node, parent, depth) = match visit {
                Visit::Exit(id) => {
                    on_path.remove(&id);
                    continue;
                }
                Visit::Enter {
                    node,
                    parent,
                    depth,
                } => (node, parent, depth),
            };

            let index = tree.nodes.len();
            let mut missing_fields = Vec::new();

            let id = match non_blank(Some(&node.id)) {
                Some(id) => id.to_string(),
                None => {
                    missing_fields.push("id");
                    synthesize_id(index, &reserved, &visited)
                }
            };

            if on_path.contains(&id) {
                if report {
                    tracing::warn!(
                        "Skipping subtree at '{}': id repeats an ancestor (depth {})",
                        id,
                        depth
                    );
                }
                tree.diagnostics.push(GraphError::StructuralCycle {
                    node_id: id,
                    depth,
                });
                continue;
            }
            if visited.contains(&id) {
                if report {
                    tracing::warn!("Skipping subtree at '{}': duplicate node id", id);
                }
                tree.diagnostics
                    .push(GraphError::DuplicateNodeId { node_id: id });
                continue;
            }

            let display_name = field_or_placeholder(
                node.display_name.as_deref(),
                "displayName",
                placeholder,
                &mut missing_fields,
            );
            let email_address = field_or_placeholder(
                node.email_address.as_deref(),
                "emailAddress",
                placeholder,
                &mut missing_fields,
            );
            let referral_code = field_or_placeholder(
                node.referral_code.as_deref(),
                "referralCode",
                placeholder,
                &mut missing_fields,
            );

            if !missing_fields.is_empty() {
                if report {
                    tracing::warn!(
                        "Node '{}' is missing {}; using placeholder",
                        id,
                        missing_fields.join(", ")
                    );
                }
                for &field in &missing_fields {
                    tree.diagnostics.push(GraphError::MalformedNode {
                        node_id: id.clone(),
                        field,
                    });
                }
            }

            let level = match node.level {
                Some(level) => {
                    if level as usize != depth {
                        tracing::debug!(
                            "Node '{}' reports level {} at depth {}",
                            id,
                            level,
                            depth
                        );
                    }
                    level
                }
                None => depth as u32,
            };

            if node.role.is_none() && node.is_root && node.is_current_user {
                tracing::debug!("Node '{}' flagged as root and current user; using root", id);
            }

            if let Some(parent) = parent {
                tree.nodes[parent].children.push(index);
            }

            visited.insert(id.clone());
            on_path.insert(id.clone());
            stack.push(Visit::Exit(id.clone()));
            for child in node.children.iter().rev() {
                stack.push(Visit::Enter {
                    node: child,
                    parent: Some(index),
                    depth: depth + 1,
                });
            }

            tree.nodes.push(NetworkNode {
                id,
                display_name,
                email_address,
                referral_code,
                level,
                role: node.resolved_role(),
                depth,
                parent,
                children: Vec::new(),
                missing_fields,
            });
        }

        tracing::debug!(
            "Network tree built: {} nodes, {} diagnostics",
            tree.nodes.len(),
            tree.diagnostics.len()
        );
        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &NetworkNode {
        &self.nodes[index]
    }

    pub fn root(&self) -> Option<&NetworkNode> {
        self.nodes.first()
    }

    pub fn diagnostics(&self) -> &[GraphError] {
        &self.diagnostics
    }

    /// First structural error, if any subtree was dropped
    pub fn structural_error(&self) -> Option<&GraphError> {
        self.diagnostics.iter().find(|d| d.is_structural())
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Deepest traversal depth (0 for a lone root)
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }
}

/// Every non-blank id present anywhere in the payload
fn payload_ids(root: &TreeNode) -> HashSet<&str> {
    let mut ids = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(id) = non_blank(Some(&node.id)) {
            ids.insert(id);
        }
        stack.extend(node.children.iter());
    }
    ids
}

/// `anon-<index>`, suffixed until it clashes with no real or earlier id
fn synthesize_id(index: usize, reserved: &HashSet<&str>, visited: &HashSet<String>) -> String {
    let base = format!("anon-{}", index);
    let mut candidate = base.clone();
    let mut suffix = 1;
    while reserved.contains(candidate.as_str()) || visited.contains(&candidate) {
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    candidate
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn field_or_placeholder(
    value: Option<&str>,
    field: &'static str,
    placeholder: &str,
    missing: &mut Vec<&'static str>,
) -> String {
    match non_blank(value) {
        Some(v) => v.to_string(),
        None => {
            missing.push(field);
            placeholder.to_string()
        }
    }
}
