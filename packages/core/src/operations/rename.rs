//! Node rename
//!
//! Renaming moves a node to a new id and rewrites every reference to it, both
//! the edges and the inline placeholders, so no link dangles afterwards. Links
//! elsewhere that already named the new id, and the renamed node's own links,
//! are resolved again for the new location.

use serde::{Deserialize, Serialize};

use super::resolve::{redirect_references, settle_links};
use crate::models::{GraphDelta, Graph, NodeDelta};

/// What happens to the old id after a rename
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenameMode {
    /// Leave the node at the old id in place (the caller removes it)
    KeepOld,
    /// Append a delete of the old id to the delta
    #[default]
    DeleteOld,
}

/// Delta that moves `old_id` to `new_id` and redirects references to it.
///
/// Upserts the renamed node first, then every non-context node that linked to
/// `old_id`, then any node whose links now resolve to `new_id`. The old node is
/// left in place. Returns an empty delta when
/// `old_id` is absent, `new_id` already exists, or the two are equal.
pub fn compute_rename_delta(old_id: &str, new_id: &str, graph: &Graph) -> GraphDelta {
    let Some(old_node) = graph.get(old_id) else {
        return Vec::new();
    };
    if old_id == new_id || graph.contains(new_id) {
        return Vec::new();
    }

    let old_ids = [old_id];

    let mut renamed = old_node.clone();
    renamed.id = new_id.to_string();
    let renamed = redirect_references(&renamed, &old_ids, new_id).unwrap_or(renamed);

    let mut delta = vec![NodeDelta::upsert(renamed, None)];
    for node in graph.nodes() {
        if node.id == old_id || node.is_context_node() {
            continue;
        }
        if let Some(updated) = redirect_references(node, &old_ids, new_id) {
            delta.push(NodeDelta::upsert(updated, Some(node.clone())));
        }
    }
    settle_links(&mut delta, graph, &[new_id]);
    delta
}

/// [`compute_rename_delta`] with an explicit policy for the old id
pub fn compute_rename_delta_with_mode(
    old_id: &str,
    new_id: &str,
    graph: &Graph,
    mode: RenameMode,
) -> GraphDelta {
    let mut delta = compute_rename_delta(old_id, new_id, graph);
    if mode == RenameMode::DeleteOld && !delta.is_empty() {
        delta.push(NodeDelta::delete(old_id, graph.get(old_id).cloned()));
        settle_links(&mut delta, graph, &[old_id]);
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edge, EdgeTarget, Node, NodeUiMetadata};
    use crate::operations::apply_graph_delta;

    fn vault() -> Graph {
        let mut context = NodeUiMetadata::default();
        context.is_context_node = true;

        Graph::from_nodes(vec![
            Node::new("old", "I am old").with_edges(vec![Edge::resolved("child", "")]),
            Node::new("child", ""),
            Node::new("a", "- refines [old]*").with_edges(vec![Edge::resolved("old", "refines")]),
            Node::new("b", "[old]* and again [old]*").with_edges(vec![
                Edge::resolved("old", ""),
                Edge::resolved("old", ""),
            ]),
            Node::new("ctx", "[old]*")
                .with_edges(vec![Edge::resolved("old", "")])
                .with_metadata(context),
        ])
    }

    #[test]
    fn test_rename_redirects_all_references() {
        let graph = vault();
        let delta = compute_rename_delta("old", "new", &graph);

        let ids: Vec<&str> = delta.iter().map(NodeDelta::node_id).collect();
        assert_eq!(ids, vec!["new", "a", "b"]);

        let next = apply_graph_delta(&graph, &delta);
        assert_eq!(next.get("new").unwrap().content, "I am old");
        assert_eq!(next.get("a").unwrap().content, "- refines [new]*");
        assert_eq!(next.get("a").unwrap().outgoing_edges, vec![Edge::resolved("new", "refines")]);
        assert_eq!(next.get("b").unwrap().content, "[new]* and again [new]*");
        assert!(next.get("b").unwrap().outgoing_edges.iter().all(|e| e.points_to("new")));
        assert!(next.contains("old"), "old node left for the caller");
    }

    #[test]
    fn test_rename_skips_context_nodes() {
        let next = apply_graph_delta(&vault(), &compute_rename_delta("old", "new", &vault()));
        assert!(next.get("ctx").unwrap().links_to("old"));
    }

    #[test]
    fn test_rename_redirects_self_reference() {
        let graph = Graph::from_nodes(vec![
            Node::new("loop", "me [loop]*").with_edges(vec![Edge::resolved("loop", "")]),
        ]);
        let delta = compute_rename_delta("loop", "cycle", &graph);

        let NodeDelta::UpsertNode { node, .. } = &delta[0] else {
            panic!("expected upsert");
        };
        assert_eq!(node.content, "me [cycle]*");
        assert!(node.links_to("cycle"));
    }

    #[test]
    fn test_rename_guard_cases_return_empty_delta() {
        let graph = vault();
        assert!(compute_rename_delta("old", "old", &graph).is_empty());
        assert!(compute_rename_delta("old", "child", &graph).is_empty());
        assert!(compute_rename_delta("missing", "new", &graph).is_empty());
    }

    #[test]
    fn test_delete_old_mode_removes_old_id() {
        let graph = vault();
        let delta = compute_rename_delta_with_mode("old", "new", &graph, RenameMode::DeleteOld);

        assert!(delta.iter().any(|op| op.is_delete() && op.node_id() == "old"));
        let next = apply_graph_delta(&graph, &delta);
        assert!(!next.contains("old"));
        assert!(next.contains("new"));
        assert_eq!(next.len(), graph.len());

        // The context node keeps its link text, which no longer names a node
        let ctx_edge = &next.get("ctx").unwrap().outgoing_edges[0];
        assert_eq!(ctx_edge.target, EdgeTarget::Unresolved("old".into()));
    }

    #[test]
    fn test_rename_resolves_links_waiting_for_new_id() {
        let graph = Graph::from_nodes(vec![
            Node::new("a", "[new]*").with_edges(vec![Edge::unresolved("new", "")]),
            Node::new("old", "body"),
        ]);

        let delta = compute_rename_delta_with_mode("old", "new", &graph, RenameMode::DeleteOld);
        let ids: Vec<&str> = delta.iter().map(NodeDelta::node_id).collect();
        assert_eq!(ids, vec!["new", "a", "old"]);

        let next = apply_graph_delta(&graph, &delta);
        assert_eq!(
            next.get("a").unwrap().outgoing_edges[0].target,
            EdgeTarget::Resolved("new".into())
        );
    }

    #[test]
    fn test_rename_into_directory_resolves_own_links_there() {
        let graph = Graph::from_nodes(vec![
            Node::new("old", "[b]*").with_edges(vec![Edge::linked(
                "b",
                EdgeTarget::Resolved("b".into()),
                "",
            )]),
            Node::new("b", ""),
            Node::new("proj/b", ""),
        ]);

        // An exact id still beats the sibling after the move
        let next = apply_graph_delta(
            &graph,
            &compute_rename_delta_with_mode("old", "proj/a", &graph, RenameMode::DeleteOld),
        );
        assert!(next.get("proj/a").unwrap().links_to("b"));

        let graph = Graph::from_nodes(vec![
            Node::new("old", "[b]*").with_edges(vec![Edge::unresolved("b", "")]),
            Node::new("proj/b", ""),
            Node::new("other/b", ""),
        ]);
        let next = apply_graph_delta(
            &graph,
            &compute_rename_delta_with_mode("old", "proj/a", &graph, RenameMode::DeleteOld),
        );
        assert!(next.get("proj/a").unwrap().links_to("proj/b"));
    }
}
