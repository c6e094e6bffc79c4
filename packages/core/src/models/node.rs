//! Node Data Structures
//!
//! This module defines the `Node` and `Edge` types backing every file in a vault.
//!
//! # Architecture
//!
//! - **File-backed identity**: a `NodeId` is the file's path relative to the vault
//!   root with the extension removed (`notes/ideas` for `notes/ideas.md`)
//! - **Content is the source of truth**: `content` holds what a human wrote, with
//!   front matter removed and every `[[link]]` replaced by a `[link]*` placeholder
//! - **Edges are a derived index**: `outgoing_edges` lists the links found in the
//!   content and is never written back into `content` a second time
//!
//! # Examples
//!
//! ```rust
//! use vaultgraph_core::models::{Edge, Node};
//!
//! let node = Node::new("notes/ideas", "See [roadmap]* for details")
//!     .with_edges(vec![Edge::resolved("roadmap", "")]);
//!
//! assert_eq!(node.display_title(), "ideas");
//! assert!(node.links_to("roadmap"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::first_heading;

/// Identity of a node: vault-relative path without extension, `/`-separated.
pub type NodeId = String;

/// Return the last path segment of a node id (`a/b/c` → `c`).
pub fn basename(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

/// Where an edge points.
///
/// Links are resolved against the graph when their file is read. A link naming a
/// node that has not been scanned yet (or a basename shared by several nodes)
/// stays `Unresolved` until a later event can settle it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum EdgeTarget {
    /// Points at a concrete node id
    Resolved(NodeId),
    /// Raw link name as written in the file
    Unresolved(String),
}

impl EdgeTarget {
    /// The resolved id, or the raw name for unresolved targets
    pub fn as_str(&self) -> &str {
        match self {
            EdgeTarget::Resolved(id) => id,
            EdgeTarget::Unresolved(name) => name,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, EdgeTarget::Resolved(_))
    }
}

/// Directed, labelled link from the owning node to `target`.
///
/// Parallel edges (same target, different label) and self-references are legal.
/// `name` keeps the link text as written so the target can be re-resolved when
/// the set of nodes changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub name: String,
    pub target: EdgeTarget,
    pub label: String,
}

impl Edge {
    /// Edge whose link text is the target id itself
    pub fn resolved(target_id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        let target_id = target_id.into();
        Self {
            name: target_id.clone(),
            target: EdgeTarget::Resolved(target_id),
            label: label.into(),
        }
    }

    pub fn unresolved(name: impl Into<String>, label: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            target: EdgeTarget::Unresolved(name.clone()),
            name,
            label: label.into(),
        }
    }

    pub fn linked(name: impl Into<String>, target: EdgeTarget, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target,
            label: label.into(),
        }
    }

    /// Id this edge is compared by in every read-side algorithm.
    ///
    /// Unresolved edges report their raw name, which usually is not a key of the
    /// graph; callers treat such edges as dangling.
    pub fn target_id(&self) -> &str {
        self.target.as_str()
    }

    pub fn points_to(&self, node_id: &str) -> bool {
        self.target_id() == node_id
    }
}

/// 2D canvas position assigned by the UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Presentation metadata carried in a node file's front matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUiMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Ephemeral, agent-scoped scratch node. Excluded from rename propagation.
    #[serde(default)]
    pub is_context_node: bool,

    /// Every other front matter key, in file order
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra_properties: Map<String, Value>,
}

/// A single vault file as seen by the graph.
///
/// Nodes are immutable by convention: every change goes through a
/// [`NodeDelta::UpsertNode`](crate::models::NodeDelta) that replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,

    /// Links found in `content`, in order of appearance
    #[serde(default)]
    pub outgoing_edges: Vec<Edge>,

    /// Body text with front matter stripped and links turned into placeholders
    pub content: String,

    #[serde(default)]
    pub ui_metadata: NodeUiMetadata,
}

impl Node {
    /// Create a node with no edges and default metadata
    pub fn new(id: impl Into<NodeId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outgoing_edges: Vec::new(),
            content: content.into(),
            ui_metadata: NodeUiMetadata::default(),
        }
    }

    pub fn with_edges(mut self, edges: Vec<Edge>) -> Self {
        self.outgoing_edges = edges;
        self
    }

    pub fn with_metadata(mut self, metadata: NodeUiMetadata) -> Self {
        self.ui_metadata = metadata;
        self
    }

    /// Title shown in trees and context bundles.
    ///
    /// Front matter `title` wins, then the first markdown heading of the content,
    /// then the basename of the node id.
    pub fn display_title(&self) -> String {
        if let Some(title) = self.ui_metadata.title.as_deref() {
            if !title.trim().is_empty() {
                return title.trim().to_string();
            }
        }
        first_heading(&self.content).unwrap_or_else(|| basename(&self.id).to_string())
    }

    pub fn is_context_node(&self) -> bool {
        self.ui_metadata.is_context_node
    }

    /// True when at least one outgoing edge targets `node_id`
    pub fn links_to(&self, node_id: &str) -> bool {
        self.outgoing_edges.iter().any(|edge| edge.points_to(node_id))
    }
}
