//! Cycle-eliminating spanning tree
//!
//! Breadth-first over the undirected view of the graph: from each visited node
//! both outgoing edges and incoming edges are followed. The edge that first
//! discovers a node is kept with its original direction; every other edge
//! between visited nodes is dropped. The result is acyclic whatever the input.

use std::collections::{HashSet, VecDeque};

use crate::models::Graph;

/// Spanning tree of the component of `graph` containing `root_id`.
///
/// Node content and metadata are copied unchanged, only `outgoing_edges` are
/// pruned. Self-loops and edges to nodes missing from the graph never survive.
/// An absent root yields the empty graph.
pub fn spanning_tree(graph: &Graph, root_id: &str) -> Graph {
    if !graph.contains(root_id) {
        return Graph::new();
    }

    let incoming = graph.incoming_index();
    let mut visited: HashSet<&str> = HashSet::from([root_id]);
    let mut kept: HashSet<(&str, usize)> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::from([root_id]);

    while let Some(current) = queue.pop_front() {
        let Some(node) = graph.get(current) else {
            continue;
        };

        for (idx, edge) in node.outgoing_edges.iter().enumerate() {
            let target = edge.target_id();
            if target == current || !graph.contains(target) {
                continue;
            }
            if visited.insert(target) {
                kept.insert((current, idx));
                queue.push_back(target);
            }
        }

        let Some(edge_refs) = incoming.get(current) else {
            continue;
        };
        for (source, idx) in edge_refs {
            if source == current {
                continue;
            }
            if visited.insert(source.as_str()) {
                kept.insert((source.as_str(), *idx));
                queue.push_back(source.as_str());
            }
        }
    }

    visited
        .iter()
        .filter_map(|id| graph.get(id))
        .map(|node| {
            let mut pruned = node.clone();
            pruned.outgoing_edges = node
                .outgoing_edges
                .iter()
                .enumerate()
                .filter(|(idx, _)| kept.contains(&(node.id.as_str(), *idx)))
                .map(|(_, edge)| edge.clone())
                .collect();
            pruned
        })
        .collect()
}

#[cfg(test)]
#[path = "spanning_tree_test.rs"]
mod spanning_tree_test;
