//! ASCII tree rendering of a graph
//!
//! Depth-first walk from each root, printing every node once at its first
//! visitation with box-drawing connectors:
//!
//! ```text
//! root
//! ├── a
//! │   ├── a1
//! │   └── a2
//! ├── b
//! └── c
//! ```
//!
//! Roots are the nodes with no incoming edge, unless a root is forced. A graph
//! made only of cycles has no such node and renders as an empty string.

use std::collections::HashSet;

use crate::models::{Graph, NodeId};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Render `graph` as an indented tree.
///
/// When `forced_root` names a node of the graph it is the only root; otherwise
/// every node without incoming edges is a root, printed from column zero in id
/// order. Lines are joined with `\n` and there is no trailing newline.
pub fn render_ascii_tree(graph: &Graph, forced_root: Option<&str>) -> String {
    let roots: Vec<NodeId> = match forced_root.filter(|id| graph.contains(id)) {
        Some(root) => vec![root.to_string()],
        None => find_roots(graph),
    };

    let mut lines = Vec::new();
    let mut visited = HashSet::new();
    for root in &roots {
        render_node(graph, root, "", true, true, &mut visited, &mut lines);
    }
    lines.join("\n")
}

/// Render `graph` so that every node appears.
///
/// Natural roots are drawn first. Nodes they do not reach (members of cycles
/// with no entry point) are then used as extra roots in `fallback_order`.
pub fn render_ascii_tree_covering(graph: &Graph, fallback_order: &[NodeId]) -> String {
    let mut lines = Vec::new();
    let mut visited = HashSet::new();
    for root in find_roots(graph) {
        render_node(graph, &root, "", true, true, &mut visited, &mut lines);
    }
    for id in fallback_order {
        if !visited.contains(id) {
            render_node(graph, id, "", true, true, &mut visited, &mut lines);
        }
    }
    lines.join("\n")
}

/// Nodes with zero incoming edges, ascending by id
pub fn find_roots(graph: &Graph) -> Vec<NodeId> {
    let incoming = graph.incoming_index();
    graph
        .node_ids()
        .filter(|id| !incoming.contains_key(*id))
        .cloned()
        .collect()
}

fn render_node(
    graph: &Graph,
    node_id: &str,
    prefix: &str,
    is_last: bool,
    is_root: bool,
    visited: &mut HashSet<NodeId>,
    lines: &mut Vec<String>,
) {
    let Some(node) = graph.get(node_id) else {
        return;
    };
    if !visited.insert(node_id.to_string()) {
        return;
    }

    let title = node.display_title();
    if is_root {
        lines.push(title);
    } else {
        let connector = if is_last { LAST_BRANCH } else { BRANCH };
        lines.push(format!("{prefix}{connector}{title}"));
    }

    // Parallel edges and already printed nodes would only produce gaps
    let mut children: Vec<&str> = Vec::new();
    for edge in &node.outgoing_edges {
        let target = edge.target_id();
        if graph.contains(target) && !visited.contains(target) && !children.contains(&target) {
            children.push(target);
        }
    }

    let child_prefix = if is_root {
        String::new()
    } else {
        format!("{prefix}{}", if is_last { SPACE } else { PIPE })
    };

    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        render_node(graph, child, &child_prefix, i + 1 == count, false, visited, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edge, Node};

    fn node(id: &str, targets: &[&str]) -> Node {
        Node::new(id, "").with_edges(targets.iter().map(|t| Edge::resolved(*t, "")).collect())
    }

    #[test]
    fn test_three_level_tree_layout() {
        let graph = Graph::from_nodes(vec![
            node("root", &["a", "b", "c"]),
            node("a", &["a1", "a2"]),
            node("b", &[]),
            node("c", &[]),
            node("a1", &[]),
            node("a2", &[]),
        ]);

        let expected = "root\n├── a\n│   ├── a1\n│   └── a2\n├── b\n└── c";
        assert_eq!(render_ascii_tree(&graph, None), expected);
    }

    #[test]
    fn test_deep_last_branch_uses_blank_continuation() {
        let graph = Graph::from_nodes(vec![
            node("r", &["x", "y"]),
            node("x", &[]),
            node("y", &["y1"]),
            node("y1", &["y2"]),
            node("y2", &[]),
        ]);

        let expected = "r\n├── x\n└── y\n    └── y1\n        └── y2";
        assert_eq!(render_ascii_tree(&graph, None), expected);
    }

    #[test]
    fn test_two_node_cycle_has_no_roots() {
        let graph = Graph::from_nodes(vec![node("a", &["b"]), node("b", &["a"])]);

        assert_eq!(render_ascii_tree(&graph, None), "");
        assert_eq!(render_ascii_tree(&graph, Some("a")), "a\n└── b");
        assert_eq!(render_ascii_tree(&graph, Some("b")), "b\n└── a");
    }

    #[test]
    fn test_unknown_forced_root_falls_back_to_natural_roots() {
        let graph = Graph::from_nodes(vec![node("a", &["b"]), node("b", &[])]);
        assert_eq!(render_ascii_tree(&graph, Some("missing")), "a\n└── b");
    }

    #[test]
    fn test_shared_descendant_printed_once() {
        let graph = Graph::from_nodes(vec![
            node("top", &["left", "right"]),
            node("left", &["shared"]),
            node("right", &["shared"]),
            node("shared", &[]),
        ]);

        let rendered = render_ascii_tree(&graph, None);
        assert_eq!(rendered, "top\n├── left\n│   └── shared\n└── right");
        assert_eq!(rendered.matches("shared").count(), 1);
    }

    #[test]
    fn test_disconnected_roots_each_start_at_column_zero() {
        let graph = Graph::from_nodes(vec![node("a", &["a1"]), node("a1", &[]), node("z", &[])]);
        assert_eq!(render_ascii_tree(&graph, None), "a\n└── a1\nz");
    }

    #[test]
    fn test_covering_render_includes_rootless_cycles() {
        let graph = Graph::from_nodes(vec![
            node("a", &["b"]),
            node("b", &["a"]),
            node("solo", &[]),
        ]);
        let order = vec!["b".to_string(), "a".to_string(), "solo".to_string()];

        assert_eq!(render_ascii_tree(&graph, None), "solo");
        assert_eq!(render_ascii_tree_covering(&graph, &order), "solo\nb\n└── a");
    }

    #[test]
    fn test_single_node_and_dangling_edges() {
        let graph = Graph::from_nodes(vec![node("only", &["nowhere"])]);
        assert_eq!(render_ascii_tree(&graph, None), "only");
        assert_eq!(render_ascii_tree(&Graph::new(), None), "");
    }
}
