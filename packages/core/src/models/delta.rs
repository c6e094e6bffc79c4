//! Graph deltas
//!
//! A `GraphDelta` is an ordered list of node-level operations. It is the only way a
//! graph changes, and the unit pushed to editors and other subscribers.

use serde::{Deserialize, Serialize};

use super::node::{Node, NodeId};

/// One operation of a [`GraphDelta`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NodeDelta {
    /// Insert or fully replace the node at `node.id`
    UpsertNode {
        node: Node,
        /// Undo context only, never consulted when applying
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous_node: Option<Node>,
    },

    /// Remove the node at `node_id` if present
    DeleteNode {
        node_id: NodeId,
        /// Undo context only, never consulted when applying
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deleted_node: Option<Node>,
    },
}

impl NodeDelta {
    pub fn upsert(node: Node, previous_node: Option<Node>) -> Self {
        NodeDelta::UpsertNode {
            node,
            previous_node,
        }
    }

    pub fn delete(node_id: impl Into<NodeId>, deleted_node: Option<Node>) -> Self {
        NodeDelta::DeleteNode {
            node_id: node_id.into(),
            deleted_node,
        }
    }

    /// Id of the node this operation touches
    pub fn node_id(&self) -> &str {
        match self {
            NodeDelta::UpsertNode { node, .. } => &node.id,
            NodeDelta::DeleteNode { node_id, .. } => node_id,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, NodeDelta::DeleteNode { .. })
    }
}

/// Ordered operations; later operations on the same node win.
pub type GraphDelta = Vec<NodeDelta>;
