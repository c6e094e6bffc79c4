//! Bounded context extraction
//!
//! Produces the acyclic neighbourhood of a node that an agent reads: the
//! spanning tree around the root, cut at a hop distance, rendered as an ASCII
//! tree followed by each node's text. Far nodes contribute less text than near
//! ones, according to the bundle's [`ContentLevel`].

use std::collections::{HashSet, VecDeque};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::spanning_tree;
use crate::markdown::placeholders_to_links;
use crate::models::{Edge, Graph, Node, NodeId};
use crate::utils::{first_paragraph, render_ascii_tree};

/// Nodes farther than this from the root get a summary instead of full content
pub const FULL_CONTENT_RADIUS: usize = 5;

/// Nodes farther than this from the root get only their title
pub const SUMMARY_RADIUS: usize = 12;

/// How much of each node's text a context bundle carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentLevel {
    TitlesOnly,
    /// Title plus the front matter `summary`, or the first paragraph
    TitlesAndSummaries,
    /// Full content near the root, fading to summaries and then titles
    #[default]
    FullContent,
}

impl ContentLevel {
    /// Level rendered for a node `distance` hops from the root
    pub fn at_distance(self, distance: usize) -> ContentLevel {
        match self {
            ContentLevel::FullContent if distance > SUMMARY_RADIUS => ContentLevel::TitlesOnly,
            ContentLevel::FullContent if distance > FULL_CONTENT_RADIUS => {
                ContentLevel::TitlesAndSummaries
            }
            level => level,
        }
    }
}

impl FromStr for ContentLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "titles" | "titlesonly" => Ok(ContentLevel::TitlesOnly),
            "summaries" | "titlesandsummaries" => Ok(ContentLevel::TitlesAndSummaries),
            "full" | "fullcontent" => Ok(ContentLevel::FullContent),
            other => Err(format!("unknown content level: {other}")),
        }
    }
}

/// Summary of a node: front matter `summary`, else its first paragraph
pub fn node_summary(node: &Node) -> Option<String> {
    node.ui_metadata
        .extra_properties
        .get("summary")
        .and_then(|value| value.as_str())
        .map(|summary| summary.trim().to_string())
        .filter(|summary| !summary.is_empty())
        .or_else(|| first_paragraph(&node.content))
}

fn render_section(node: &Node, level: ContentLevel) -> String {
    let title = node.display_title();
    let text = match level {
        ContentLevel::TitlesOnly => None,
        ContentLevel::TitlesAndSummaries => node_summary(node),
        ContentLevel::FullContent => Some(placeholders_to_links(node.content.trim())),
    };
    match text.filter(|text| !text.is_empty()) {
        Some(text) => format!("## {title}\n\n{text}"),
        None => format!("## {title}"),
    }
}

/// Acyclic neighbourhood of `root_id`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextBundle {
    pub root_id: NodeId,
    /// Included nodes in breadth-first order, root first
    pub node_ids: Vec<NodeId>,
    /// ASCII tree of the included nodes, rooted at `root_id`
    pub tree: String,
    /// Title and content of each included node
    pub body: String,
}

impl ContextBundle {
    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }
}

/// Extract everything within `max_distance` undirected hops of `root_id`.
///
/// Distances are measured on the spanning tree, so every node appears once and
/// cycles cannot inflate the bundle. `level` decides how much text each node
/// contributes at its distance. An absent root gives an empty bundle.
pub fn extract_context(
    graph: &Graph,
    root_id: &str,
    max_distance: usize,
    level: ContentLevel,
) -> ContextBundle {
    let tree = spanning_tree(graph, root_id);
    if tree.is_empty() {
        return ContextBundle {
            root_id: root_id.to_string(),
            ..ContextBundle::default()
        };
    }

    let incoming = tree.incoming_index();
    let mut visited: HashSet<&str> = HashSet::from([root_id]);
    let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(root_id, 0)]);
    let mut order: Vec<(&str, usize)> = vec![(root_id, 0)];
    let mut children: Vec<(&str, &str)> = Vec::new();

    while let Some((current, distance)) = queue.pop_front() {
        if distance >= max_distance {
            continue;
        }
        let Some(node) = tree.get(current) else {
            continue;
        };

        let outgoing = node.outgoing_edges.iter().map(Edge::target_id);
        let sources = incoming
            .get(current)
            .into_iter()
            .flatten()
            .map(|(source, _)| source.as_str());

        for neighbour in outgoing.chain(sources) {
            if visited.insert(neighbour) {
                order.push((neighbour, distance + 1));
                children.push((current, neighbour));
                queue.push_back((neighbour, distance + 1));
            }
        }
    }

    // Orient every kept edge parent -> child so the root is the only tree root
    let display: Graph = order
        .iter()
        .filter_map(|(id, _)| tree.get(id))
        .map(|node| {
            let edges = children
                .iter()
                .filter(|(parent, _)| *parent == node.id)
                .map(|(_, child)| Edge::resolved(*child, ""))
                .collect();
            Node {
                outgoing_edges: edges,
                ..node.clone()
            }
        })
        .collect();

    let body = order
        .iter()
        .filter_map(|(id, distance)| graph.get(id).map(|node| (node, *distance)))
        .map(|(node, distance)| render_section(node, level.at_distance(distance)))
        .collect::<Vec<_>>()
        .join("\n\n");

    ContextBundle {
        root_id: root_id.to_string(),
        node_ids: order.iter().map(|(id, _)| id.to_string()).collect(),
        tree: render_ascii_tree(&display, Some(root_id)),
        body,
    }
}
