//! Graph data types
//!
//! `TreeNode` is the payload handed over by the network-tree endpoint.
//! `PositionedNode`, `LinkSegment` and `NetworkLayout` are what the layout
//! engine produces for the renderer and the interaction layer.

use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

use super::edges::LinkCurve;
use crate::error::GraphError;

// =============================================================================
// INPUT PAYLOAD
// =============================================================================

/// Visual role of a node in the partner network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeRole {
    /// Top-level introducer
    Root,
    /// The signed-in user
    #[serde(alias = "SELF", alias = "CURRENT_USER")]
    SelfNode,
    /// Everyone referred below
    #[default]
    Downline,
}

impl NodeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Root => "ROOT",
            NodeRole::SelfNode => "SELF",
            NodeRole::Downline => "DOWNLINE",
        }
    }
}

/// One partner in the referral tree, as delivered by the backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawTreeNode")]
pub struct TreeNode {
    pub id: String,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub referral_code: Option<String>,
    pub level: Option<u32>,
    pub is_root: bool,
    pub is_current_user: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<NodeRole>,
    pub children: Vec<TreeNode>,
}

/// Wire shape of a node. Every field is optional so one bad node degrades
/// to placeholders instead of rejecting the whole payload.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTreeNode {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email_address: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    referral_code: Option<String>,
    #[serde(default)]
    level: Option<u32>,
    #[serde(default)]
    is_root: Option<bool>,
    #[serde(default)]
    is_current_user: Option<bool>,
    #[serde(default)]
    role: Option<NodeRole>,
    #[serde(default)]
    children: Option<Vec<serde_json::Value>>,
}

/// Ids arrive as strings or integers depending on the backend version
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Unsigned(u64),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

/// First non-blank of the canonical field and its short alias
fn either(primary: Option<String>, alias: Option<String>) -> Option<String> {
    primary
        .filter(|s| !s.trim().is_empty())
        .or(alias.filter(|s| !s.trim().is_empty()))
}

impl From<RawTreeNode> for TreeNode {
    fn from(raw: RawTreeNode) -> Self {
        let id: String = raw.id.map(String::from).unwrap_or_default();

        // Unreadable children are dropped one by one; their siblings stay
        let children = raw
            .children
            .unwrap_or_default()
            .into_iter()
            .filter(|value| !value.is_null())
            .filter_map(|value| match serde_json::from_value::<TreeNode>(value) {
                Ok(child) => Some(child),
                Err(err) => {
                    tracing::warn!("Skipping unreadable child of '{}': {}", id, err);
                    None
                }
            })
            .collect();

        TreeNode {
            display_name: either(raw.display_name, raw.name),
            email_address: either(raw.email_address, raw.email),
            referral_code: raw.referral_code,
            level: raw.level,
            is_root: raw.is_root.unwrap_or(false),
            is_current_user: raw.is_current_user.unwrap_or(false),
            role: raw.role,
            children,
            id,
        }
    }
}

impl TreeNode {
    /// Create a downline node with the given id and no descriptive fields
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email_address = Some(email.into());
        self
    }

    pub fn with_referral_code(mut self, code: impl Into<String>) -> Self {
        self.referral_code = Some(code.into());
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = TreeNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Resolve the visual role.
    ///
    /// An explicit `role` wins, then `isRoot`, then `isCurrentUser`.
    pub fn resolved_role(&self) -> NodeRole {
        if let Some(role) = self.role {
            return role;
        }
        if self.is_root {
            NodeRole::Root
        } else if self.is_current_user {
            NodeRole::SelfNode
        } else {
            NodeRole::Downline
        }
    }

    /// Parse a network-tree response.
    ///
    /// Accepts a bare node or a `{ "data": node }` envelope. `null` (bare or
    /// inside the envelope) yields `MissingData`.
    pub fn from_json(json: &str) -> Result<TreeNode, GraphError> {
        let rejected = |e: serde_json::Error| {
            tracing::warn!("Network tree payload rejected: {}", e);
            GraphError::MissingData
        };

        let value: serde_json::Value = serde_json::from_str(json).map_err(rejected)?;
        let node = match value {
            serde_json::Value::Object(mut map) if map.contains_key("data") && !map.contains_key("id") => {
                map.remove("data").unwrap_or(serde_json::Value::Null)
            }
            other => other,
        };
        if !node.is_object() {
            return Err(GraphError::MissingData);
        }
        serde_json::from_value(node).map_err(rejected)
    }

    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

// =============================================================================
// LAYOUT OUTPUT
// =============================================================================

/// A node with its computed layout position
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub id: String,
    /// Descriptive fields with placeholders already substituted
    pub display_name: String,
    pub email_address: String,
    pub referral_code: String,
    /// Level ordinal from the payload (falls back to traversal depth)
    pub level: u32,
    pub role: NodeRole,
    pub x: f32,
    pub y: f32,
    /// Leaf descendants (1 for a leaf)
    pub subtree_width: usize,
    /// Traversal depth used for vertical placement
    pub layout_depth: usize,
    pub child_count: usize,
    /// Index of the parent in `NetworkLayout::nodes`
    pub parent: Option<usize>,
}

impl PositionedNode {
    pub fn position(&self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }

    /// Label shown for the node's level, e.g. "Root", "Level 2"
    pub fn level_label(&self) -> String {
        match self.role {
            NodeRole::Root => "Root".to_string(),
            _ => format!("Level {}", self.level),
        }
    }
}

/// Connection between a node and one of its direct children
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSegment {
    /// Index of the parent in `NetworkLayout::nodes`
    pub source: usize,
    /// Index of the child in `NetworkLayout::nodes`
    pub target: usize,
    pub curve: LinkCurve,
}

/// Fully positioned network, ready for rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkLayout {
    /// Nodes in pre-order (root first)
    pub nodes: Vec<PositionedNode>,
    pub links: Vec<LinkSegment>,
    /// Canvas size the layout was computed for
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Structural and data problems found while building the layout
    pub diagnostics: Vec<GraphError>,
}

impl NetworkLayout {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get_node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn root(&self) -> Option<&PositionedNode> {
        self.nodes.first()
    }

    /// Bounding box of all node coordinates (no radius padding).
    ///
    /// `None` for an empty layout.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.nodes.first()?;
        let mut rect = Rect::from_min_max(first.position(), first.position());
        for node in &self.nodes[1..] {
            rect.extend_with(node.position());
        }
        Some(rect)
    }

    /// Links whose source is the given node
    pub fn children_links(&self, index: usize) -> impl Iterator<Item = &LinkSegment> {
        self.links.iter().filter(move |l| l.source == index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_payload() {
        let json = r#"{
            "id": 1,
            "name": "Alice Root",
            "email": "alice@example.com",
            "referralCode": "ALICE01",
            "level": 0,
            "isRoot": true,
            "children": [
                { "id": "2", "name": "Bob", "level": 1, "isCurrentUser": true, "children": [] },
                { "id": 3, "displayName": "Carol", "emailAddress": "c@example.com" }
            ]
        }"#;

        let root = TreeNode::from_json(json).unwrap();
        assert_eq!(root.id, "1");
        assert_eq!(root.display_name.as_deref(), Some("Alice Root"));
        assert_eq!(root.email_address.as_deref(), Some("alice@example.com"));
        assert_eq!(root.resolved_role(), NodeRole::Root);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].resolved_role(), NodeRole::SelfNode);
        assert_eq!(root.children[1].id, "3");
        assert_eq!(root.children[1].referral_code, None);
        assert_eq!(root.children[1].resolved_role(), NodeRole::Downline);
        assert_eq!(root.node_count(), 3);
    }

    #[test]
    fn test_envelope_and_null() {
        let node = TreeNode::from_json(r#"{ "data": { "id": "x" } }"#).unwrap();
        assert_eq!(node.id, "x");

        assert_eq!(TreeNode::from_json("null"), Err(GraphError::MissingData));
        assert_eq!(
            TreeNode::from_json(r#"{ "data": null }"#),
            Err(GraphError::MissingData)
        );
        assert_eq!(TreeNode::from_json("not json"), Err(GraphError::MissingData));
    }

    #[test]
    fn test_child_without_id_keeps_tree() {
        let root = TreeNode::from_json(
            r#"{ "id": "r", "children": [ { "name": "No Id" }, { "id": null }, { "id": "b" } ] }"#,
        )
        .unwrap();
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0].id, "");
        assert_eq!(root.children[0].display_name.as_deref(), Some("No Id"));
        assert_eq!(root.children[1].id, "");
        assert_eq!(root.children[2].id, "b");
    }

    #[test]
    fn test_null_children() {
        let root = TreeNode::from_json(r#"{ "id": "r", "children": null }"#).unwrap();
        assert!(root.children.is_empty());

        let root = TreeNode::from_json(r#"{ "id": "r", "children": [null, { "id": "a" }] }"#).unwrap();
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_both_name_spellings() {
        let node = TreeNode::from_json(
            r#"{ "id": 1, "name": "Short", "displayName": "Full Name",
                 "email": "a@example.com", "emailAddress": "" }"#,
        )
        .unwrap();
        assert_eq!(node.display_name.as_deref(), Some("Full Name"));
        // Blank canonical field falls back to the alias
        assert_eq!(node.email_address.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_unreadable_child_is_dropped_alone() {
        let root = TreeNode::from_json(
            r#"{ "id": "r", "children": [ 42, { "id": "a", "level": "two" }, { "id": "b" } ] }"#,
        )
        .unwrap();
        let ids: Vec<&str> = root.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_explicit_role_wins() {
        let node = TreeNode {
            id: "a".into(),
            is_root: true,
            role: Some(NodeRole::SelfNode),
            ..Default::default()
        };
        assert_eq!(node.resolved_role(), NodeRole::SelfNode);

        let both = TreeNode {
            id: "b".into(),
            is_root: true,
            is_current_user: true,
            ..Default::default()
        };
        assert_eq!(both.resolved_role(), NodeRole::Root);
    }

    #[test]
    fn test_role_strings() {
        let role: NodeRole = serde_json::from_str("\"SELF_NODE\"").unwrap();
        assert_eq!(role, NodeRole::SelfNode);
        let role: NodeRole = serde_json::from_str("\"SELF\"").unwrap();
        assert_eq!(role, NodeRole::SelfNode);
        let role: NodeRole = serde_json::from_str("\"CURRENT_USER\"").unwrap();
        assert_eq!(role, NodeRole::SelfNode);
        assert_eq!(NodeRole::Downline.as_str(), "DOWNLINE");
    }
}
