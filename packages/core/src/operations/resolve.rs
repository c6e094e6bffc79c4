//! Link resolution
//!
//! A link names its target by node id (`notes/plan`), optionally with a `./`
//! prefix or `.md` suffix, or by bare name (`plan`): a sibling in the linking
//! node's directory, else the only node in the vault with that basename.
//! Edges keep the name as written, so targets are recomputed whenever a node
//! that could match appears or disappears.

use crate::markdown::{normalize_link_name, rewrite_placeholders};
use crate::models::{basename, Edge, EdgeTarget, Graph, GraphDelta, Node, NodeDelta};
use crate::operations::apply_graph_delta;

/// Resolve a link name written in node `self_id` against `graph`.
///
/// Lookup order: exact id, then a sibling in the linking node's directory, then
/// a unique basename anywhere in the vault. A bare name matching several nodes
/// stays unresolved; the raw name is kept so the file can be written back
/// unchanged. The result depends only on the set of ids in `graph`, never on
/// the order they arrived in.
pub fn resolve_link(name: &str, graph: &Graph, self_id: &str) -> EdgeTarget {
    let normalized = normalize_link_name(name);
    if normalized.is_empty() {
        return EdgeTarget::Unresolved(name.to_string());
    }
    if normalized == self_id || graph.contains(&normalized) {
        return EdgeTarget::Resolved(normalized);
    }

    if !normalized.contains('/') {
        if let Some((dir, _)) = self_id.rsplit_once('/') {
            let sibling = format!("{dir}/{normalized}");
            if sibling == self_id || graph.contains(&sibling) {
                return EdgeTarget::Resolved(sibling);
            }
        }

        let mut candidates: Vec<&str> = graph
            .find_by_basename(&normalized)
            .into_iter()
            .map(String::as_str)
            .filter(|id| *id != self_id)
            .collect();
        if basename(self_id) == normalized {
            candidates.push(self_id);
        }
        if let [only] = candidates.as_slice() {
            return EdgeTarget::Resolved(only.to_string());
        }
    }

    EdgeTarget::Unresolved(name.to_string())
}

/// Re-resolve every edge of `node` against `graph`.
///
/// Returns `None` when all targets are already current.
pub fn resolve_edges(node: &Node, graph: &Graph) -> Option<Node> {
    relink(node, graph, |_| true)
}

/// Re-resolve other nodes' edges whose link text could name `changed_id`.
///
/// Called with the graph after `changed_id` was added or removed. Only edges
/// whose written name shares the basename of `changed_id` are looked at, since
/// no other link can change target. Returns `(updated, previous)` pairs for
/// every node that changed.
pub fn resolve_incoming(changed_id: &str, graph: &Graph) -> Vec<(Node, Node)> {
    let base = basename(changed_id);
    graph
        .nodes()
        .filter(|node| node.id != changed_id)
        .filter_map(|node| {
            relink(node, graph, |edge| {
                basename(&normalize_link_name(&edge.name)) == base
            })
            .map(|updated| (updated, node.clone()))
        })
        .collect()
}

fn relink(node: &Node, graph: &Graph, affected: impl Fn(&Edge) -> bool) -> Option<Node> {
    let mut changed = false;
    let edges: Vec<Edge> = node
        .outgoing_edges
        .iter()
        .map(|edge| {
            if !affected(edge) {
                return edge.clone();
            }
            let target = resolve_link(&edge.name, graph, &node.id);
            if target == edge.target {
                edge.clone()
            } else {
                changed = true;
                Edge {
                    target,
                    ..edge.clone()
                }
            }
        })
        .collect();

    changed.then(|| {
        let mut updated = node.clone();
        updated.outgoing_edges = edges;
        updated
    })
}

/// Extend `delta` so that links affected by adding or removing `changed_ids`
/// point where they would if the vault were scanned from scratch.
///
/// Nodes already upserted by `delta` have that upsert updated in place; others
/// get a new upsert appended.
pub(crate) fn settle_links(delta: &mut GraphDelta, graph: &Graph, changed_ids: &[&str]) {
    let mut staged = apply_graph_delta(graph, delta);

    for changed_id in changed_ids {
        let mut updates: Vec<Node> = resolve_incoming(changed_id, &staged)
            .into_iter()
            .map(|(updated, _)| updated)
            .collect();
        if let Some(updated) = staged.get(changed_id).and_then(|node| resolve_edges(node, &staged)) {
            updates.push(updated);
        }

        for updated in updates {
            staged.insert(updated.clone());
            let existing = delta.iter_mut().find_map(|op| match op {
                NodeDelta::UpsertNode { node, .. } if node.id == updated.id => Some(node),
                _ => None,
            });
            match existing {
                Some(node) => *node = updated,
                None => {
                    let previous = graph.get(&updated.id).cloned();
                    delta.push(NodeDelta::upsert(updated, previous));
                }
            }
        }
    }
}

/// Whether placeholder `raw` refers to node `target`.
///
/// A bare placeholder may name a target by basename, unless one of `others`
/// shares that basename and the reference is ambiguous.
pub(crate) fn placeholder_refers_to(raw: &str, target: &str, others: &[&str]) -> bool {
    let name = normalize_link_name(raw);
    let target = normalize_link_name(target);
    if name == target {
        return true;
    }
    let target_base = basename(&target);
    !name.contains('/')
        && name == target_base
        && !others
            .iter()
            .any(|other| *other != target && basename(&normalize_link_name(other)) == target_base)
}

/// Point every edge of `node` that targets one of `old_ids` at `new_id`.
///
/// Placeholders naming an old id are rewritten to `new_id` as well, keeping
/// content and edges consistent. Returns `None` when nothing pointed at `old_ids`.
pub(crate) fn redirect_references(node: &Node, old_ids: &[&str], new_id: &str) -> Option<Node> {
    if !node
        .outgoing_edges
        .iter()
        .any(|edge| old_ids.contains(&edge.target_id()))
    {
        return None;
    }

    let remaining: Vec<&str> = node
        .outgoing_edges
        .iter()
        .map(Edge::target_id)
        .filter(|target| !old_ids.contains(target))
        .collect();

    let mut updated = node.clone();
    for edge in &mut updated.outgoing_edges {
        if old_ids.contains(&edge.target_id()) {
            edge.name = new_id.to_string();
            edge.target = EdgeTarget::Resolved(new_id.to_string());
        }
    }
    updated.content = rewrite_placeholders(&node.content, |raw| {
        old_ids
            .iter()
            .any(|old| placeholder_refers_to(raw, old, &remaining))
            .then(|| new_id.to_string())
    });

    Some(updated)
}
