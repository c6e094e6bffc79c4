//! Delta reducer
//!
//! `apply_graph_delta` is the only function that produces a changed graph. It is
//! pure: the same graph and delta always yield the same result, edges are never
//! validated, and nothing can fail.

use crate::models::{Graph, NodeDelta};

/// Apply `delta` to `graph`, returning the new graph.
///
/// Operations run in order, so a later operation on the same node wins.
/// Deleting an absent node is a no-op. Untouched nodes are shared with `graph`.
pub fn apply_graph_delta(graph: &Graph, delta: &[NodeDelta]) -> Graph {
    let mut next = graph.clone();
    for op in delta {
        match op {
            NodeDelta::UpsertNode { node, .. } => next.insert(node.clone()),
            NodeDelta::DeleteNode { node_id, .. } => {
                next.remove(node_id);
            }
        }
    }
    next
}

/// Operations of `delta` that would change `graph` when applied on their own.
///
/// Drops upserts whose node equals the current one and deletes of absent nodes.
/// Used to avoid re-publishing filesystem notifications that carry nothing new.
pub fn effective_delta(graph: &Graph, delta: &[NodeDelta]) -> Vec<NodeDelta> {
    delta
        .iter()
        .filter(|op| match op {
            NodeDelta::UpsertNode { node, .. } => graph.get(&node.id) != Some(node),
            NodeDelta::DeleteNode { node_id, .. } => graph.contains(node_id),
        })
        .cloned()
        .collect()
}
