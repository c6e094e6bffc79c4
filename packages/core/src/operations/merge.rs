//! Subgraph merge
//!
//! Collapses a selection of nodes into one representative node. The new node
//! carries a tree summary of the selection followed by every member's content.
//! Edges from outside the selection into it are redirected to the new node, and
//! the members are deleted.

use std::collections::{BTreeSet, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::resolve::{placeholder_refers_to, redirect_references, settle_links};
use crate::markdown::demote_placeholders;
use crate::models::{Edge, Graph, GraphDelta, Node, NodeDelta, NodeId, NodeUiMetadata, Position};
use crate::utils::render_ascii_tree_covering;

/// Separator between the sections of a merged node's content
pub const MERGE_SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// An edge entering a subgraph from outside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingEdge {
    pub source_node_id: NodeId,
    pub edge: Edge,
}

/// What to do with members' edges that leave the selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExternalEdgePolicy {
    /// The merged node keeps every outgoing edge to a non-member
    #[default]
    Preserve,
    /// The merged node starts without edges
    Drop,
}

/// Edges from nodes outside `selection` to nodes inside it, ordered by source id
pub fn incoming_edges_to_subgraph(selection: &[NodeId], graph: &Graph) -> Vec<IncomingEdge> {
    let members: BTreeSet<&str> = selection.iter().map(String::as_str).collect();

    graph
        .nodes()
        .filter(|node| !members.contains(node.id.as_str()))
        .flat_map(|node| {
            node.outgoing_edges
                .iter()
                .filter(|edge| members.contains(edge.target_id()))
                .map(|edge| IncomingEdge {
                    source_node_id: node.id.clone(),
                    edge: edge.clone(),
                })
        })
        .collect()
}

/// The member that reaches the most other members along outgoing edges.
///
/// Only edges between members count. Ties go to the smallest id. Returns
/// `None` for an empty selection.
pub fn find_representative_node(selection: &[NodeId], graph: &Graph) -> Option<NodeId> {
    let members: BTreeSet<&str> = selection.iter().map(String::as_str).collect();

    let mut best: Option<(&str, usize)> = None;
    for &member in &members {
        let reach = count_reachable_within(member, &members, graph);
        if best.map_or(true, |(_, top)| reach > top) {
            best = Some((member, reach));
        }
    }
    best.map(|(id, _)| id.to_string())
}

fn count_reachable_within(start: &str, members: &BTreeSet<&str>, graph: &Graph) -> usize {
    let mut visited: HashSet<&str> = HashSet::from([start]);
    let mut queue: VecDeque<&str> = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        let Some(node) = graph.get(current) else {
            continue;
        };
        for edge in &node.outgoing_edges {
            let target = edge.target_id();
            if members.contains(target) && visited.insert(target) {
                queue.push_back(target);
            }
        }
    }

    visited.len() - 1
}

/// Synthesize the node that replaces `nodes`.
///
/// Position is the centroid of the members that have one, color comes from the
/// first member, and content is an ASCII tree of the members followed by each
/// member's content in order. The result has no edges.
pub fn create_representative_node(nodes: &[Node], new_node_id: &str) -> Node {
    let positions: Vec<Position> = nodes.iter().filter_map(|n| n.ui_metadata.position).collect();
    let position = (!positions.is_empty()).then(|| {
        let count = positions.len() as f64;
        Position::new(
            positions.iter().map(|p| p.x).sum::<f64>() / count,
            positions.iter().map(|p| p.y).sum::<f64>() / count,
        )
    });

    let order: Vec<NodeId> = nodes.iter().map(|n| n.id.clone()).collect();
    let ids: BTreeSet<NodeId> = order.iter().cloned().collect();
    let members = Graph::from_nodes(nodes.iter().cloned()).subgraph(&ids);
    let summary = render_ascii_tree_covering(&members, &order);

    let content = std::iter::once(summary)
        .chain(nodes.iter().map(|n| n.content.clone()))
        .collect::<Vec<_>>()
        .join(MERGE_SECTION_SEPARATOR);

    Node {
        id: new_node_id.to_string(),
        outgoing_edges: Vec::new(),
        content,
        ui_metadata: NodeUiMetadata {
            color: nodes.first().and_then(|n| n.ui_metadata.color.clone()),
            position,
            ..NodeUiMetadata::default()
        },
    }
}

/// Delta that merges `selection` into a new node `new_node_id`.
///
/// The merged node comes first, followed by upserts of outside nodes whose
/// edges were redirected to it, then deletes of the members. Selection ids
/// missing from the graph are ignored. Returns an empty delta when nothing
/// selected exists or `new_node_id` names a node outside the selection.
pub fn compute_merge_delta(
    selection: &[NodeId],
    new_node_id: &str,
    graph: &Graph,
    policy: ExternalEdgePolicy,
) -> GraphDelta {
    let mut member_ids: Vec<&str> = Vec::new();
    for id in selection {
        if graph.contains(id) && !member_ids.contains(&id.as_str()) {
            member_ids.push(id);
        }
    }
    if member_ids.is_empty() {
        return Vec::new();
    }
    if graph.contains(new_node_id) && !member_ids.contains(&new_node_id) {
        return Vec::new();
    }

    let existing: Vec<NodeId> = member_ids.iter().map(|id| id.to_string()).collect();
    let representative = find_representative_node(&existing, graph);

    let mut ordered: Vec<Node> = Vec::with_capacity(member_ids.len());
    if let Some(node) = representative.as_deref().and_then(|id| graph.get(id)) {
        ordered.push(node.clone());
    }
    for id in &member_ids {
        if representative.as_deref() != Some(*id) {
            if let Some(node) = graph.get(id) {
                ordered.push(node.clone());
            }
        }
    }

    let mut external_edges: Vec<Edge> = Vec::new();
    for node in &mut ordered {
        let (kept, dropped): (Vec<&Edge>, Vec<&Edge>) = node
            .outgoing_edges
            .iter()
            .partition(|edge| {
                policy == ExternalEdgePolicy::Preserve && !member_ids.contains(&edge.target_id())
            });
        let kept_targets: Vec<&str> = kept.iter().map(|e| e.target_id()).collect();
        let dropped_targets: Vec<&str> = dropped.iter().map(|e| e.target_id()).collect();

        let content = demote_placeholders(&node.content, |raw| {
            dropped_targets
                .iter()
                .any(|target| placeholder_refers_to(raw, target, &kept_targets))
                && !kept_targets
                    .iter()
                    .any(|target| placeholder_refers_to(raw, target, &dropped_targets))
        });
        external_edges.extend(kept.into_iter().cloned());
        node.content = content;
    }

    let mut merged = create_representative_node(&ordered, new_node_id);
    merged.outgoing_edges = external_edges;

    let mut delta = vec![NodeDelta::upsert(merged, graph.get(new_node_id).cloned())];

    let sources: BTreeSet<NodeId> = incoming_edges_to_subgraph(&existing, graph)
        .into_iter()
        .map(|incoming| incoming.source_node_id)
        .collect();
    for source in &sources {
        let Some(node) = graph.get(source) else {
            continue;
        };
        if let Some(updated) = redirect_references(node, &member_ids, new_node_id) {
            delta.push(NodeDelta::upsert(updated, Some(node.clone())));
        }
    }

    for id in &member_ids {
        if *id != new_node_id {
            delta.push(NodeDelta::delete(*id, graph.get(id).cloned()));
        }
    }

    let mut changed_ids = vec![new_node_id];
    changed_ids.extend(member_ids.iter().copied().filter(|id| *id != new_node_id));
    settle_links(&mut delta, graph, &changed_ids);

    delta
}
