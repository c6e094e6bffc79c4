//! Graph container
//!
//! A `Graph` maps `NodeId` to a shared, immutable `Node`. Cloning a graph is cheap:
//! node entries are reference counted, so a graph derived through a delta shares
//! every node it did not touch with its predecessor.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::node::{basename, Edge, Node, NodeId};

/// Reference to one edge: `(source node id, index into its outgoing_edges)`
pub type EdgeRef = (NodeId, usize);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Arc<Node>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from owned nodes. Later nodes with a duplicate id win.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.insert(node);
        }
        graph
    }

    pub fn get(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id).map(Arc::as_ref)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in ascending order
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Nodes in ascending id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().map(Arc::as_ref)
    }

    /// Total number of outgoing edges, dangling ones included
    pub fn edge_count(&self) -> usize {
        self.nodes().map(|node| node.outgoing_edges.len()).sum()
    }

    /// Invert edge direction over the whole graph.
    ///
    /// Keys are edge target ids (which may be dangling); values list every edge
    /// pointing at that id, in ascending source order.
    pub fn incoming_index(&self) -> BTreeMap<NodeId, Vec<EdgeRef>> {
        let mut index: BTreeMap<NodeId, Vec<EdgeRef>> = BTreeMap::new();
        for node in self.nodes() {
            for (i, edge) in node.outgoing_edges.iter().enumerate() {
                index
                    .entry(edge.target_id().to_string())
                    .or_default()
                    .push((node.id.clone(), i));
            }
        }
        index
    }

    /// Look up the edge an `EdgeRef` names
    pub fn edge(&self, edge_ref: &EdgeRef) -> Option<&Edge> {
        self.get(&edge_ref.0)
            .and_then(|node| node.outgoing_edges.get(edge_ref.1))
    }

    /// Every node whose id ends in the path segment `name`
    pub fn find_by_basename(&self, name: &str) -> Vec<&NodeId> {
        self.nodes
            .keys()
            .filter(|id| basename(id) == name)
            .collect()
    }

    /// Restrict the graph to `ids`, dropping every edge that leaves the set.
    pub fn subgraph(&self, ids: &BTreeSet<NodeId>) -> Graph {
        let nodes = ids
            .iter()
            .filter_map(|id| self.get(id))
            .map(|node| {
                let mut kept = node.clone();
                kept.outgoing_edges.retain(|edge| ids.contains(edge.target_id()));
                kept
            });
        Graph::from_nodes(nodes)
    }

    pub(crate) fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), Arc::new(node));
    }

    pub(crate) fn remove(&mut self, node_id: &str) -> Option<Arc<Node>> {
        self.nodes.remove(node_id)
    }
}

impl FromIterator<Node> for Graph {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        Graph::from_nodes(iter)
    }
}
