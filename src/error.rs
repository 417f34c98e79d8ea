//! Error taxonomy for the partner network graph
//!
//! Only configuration loading surfaces errors to callers. Everything raised
//! while building, laying out or interacting with a tree is recovered inside
//! the engine and reported as a diagnostic.

use thiserror::Error;

/// Problems detected while processing a network tree
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("No network tree supplied")]
    MissingData,

    #[error("Node '{node_id}' is missing required field '{field}'")]
    MalformedNode { node_id: String, field: &'static str },

    #[error("Node '{node_id}' repeats an ancestor id at depth {depth}")]
    StructuralCycle { node_id: String, depth: usize },

    #[error("Node id '{node_id}' appears more than once in the tree")]
    DuplicateNodeId { node_id: String },

    #[error("Degenerate layout geometry: {reason}")]
    LayoutOverflow { reason: String },

    #[error("Interaction handler failed: {0}")]
    Interaction(String),
}

impl GraphError {
    /// Structural errors remove a subtree from the rendered output
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            GraphError::StructuralCycle { .. } | GraphError::DuplicateNodeId { .. }
        )
    }

    /// Node id the error refers to, if any
    pub fn node_id(&self) -> Option<&str> {
        match self {
            GraphError::MalformedNode { node_id, .. }
            | GraphError::StructuralCycle { node_id, .. }
            | GraphError::DuplicateNodeId { node_id } => Some(node_id),
            _ => None,
        }
    }
}

/// Result alias for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors while loading [`crate::config::GraphSettings`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_classification() {
        let cycle = GraphError::StructuralCycle {
            node_id: "ib-7".into(),
            depth: 3,
        };
        let dup = GraphError::DuplicateNodeId {
            node_id: "ib-7".into(),
        };
        let malformed = GraphError::MalformedNode {
            node_id: "ib-7".into(),
            field: "referralCode",
        };

        assert!(cycle.is_structural());
        assert!(dup.is_structural());
        assert!(!malformed.is_structural());
        assert!(!GraphError::MissingData.is_structural());
    }

    #[test]
    fn test_node_id_accessor() {
        let err = GraphError::MalformedNode {
            node_id: "abc".into(),
            field: "email",
        };
        assert_eq!(err.node_id(), Some("abc"));
        assert_eq!(GraphError::MissingData.node_id(), None);
    }

    #[test]
    fn test_messages() {
        let err = GraphError::StructuralCycle {
            node_id: "n1".into(),
            depth: 2,
        };
        assert_eq!(
            err.to_string(),
            "Node 'n1' repeats an ancestor id at depth 2"
        );
    }
}
