//! Filesystem event to delta mapping
//!
//! Turns one file notification into the delta that brings the graph in line
//! with the file. Links to files that have not been seen yet are recorded as
//! unresolved edges. Whenever a node arrives, links elsewhere that could name
//! it are resolved again from their written text, so the order in which a
//! vault is scanned never changes the resulting graph.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::markdown::{parse_node_file, NODE_FILE_EXTENSION};
use crate::models::{Edge, Graph, GraphDelta, Node, NodeDelta, NodeId};
use crate::operations::{resolve_link, settle_links};

/// Kind of change reported for a node file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FsEventKind {
    Add,
    Change,
    Delete,
}

/// A change notification for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsEvent {
    pub kind: FsEventKind,
    pub absolute_path: PathBuf,
    /// File text for `Add` and `Change`, read by whoever received the notification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl FsEvent {
    pub fn new(kind: FsEventKind, absolute_path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            absolute_path: absolute_path.into(),
            content: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Whether `path` names a node file
pub fn is_node_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(NODE_FILE_EXTENSION))
}

/// NodeId of the node file at `path`: its path under `vault_root` without the
/// extension, `/`-separated. `None` outside the vault or for other files.
pub fn node_id_from_path(path: &Path, vault_root: &Path) -> Option<NodeId> {
    if !is_node_file(path) {
        return None;
    }
    let relative = path.strip_prefix(vault_root).ok()?.with_extension("");

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?.to_string()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

/// Absolute path of the file backing `node_id`
pub fn node_path(vault_root: &Path, node_id: &str) -> PathBuf {
    let mut path = vault_root.to_path_buf();
    for segment in node_id.split('/') {
        path.push(segment);
    }
    path.set_extension(NODE_FILE_EXTENSION);
    path
}

/// Build the node a file's text describes, resolving links against `graph`.
///
/// `previous` supplies the canvas position when the file carries none, since
/// a position assigned in the UI may not have been written back yet.
pub fn node_from_text(node_id: &str, text: &str, graph: &Graph, previous: Option<&Node>) -> Node {
    let parsed = parse_node_file(text);

    let edges = parsed
        .links
        .iter()
        .map(|link| {
            Edge::linked(
                link.name.clone(),
                resolve_link(&link.name, graph, node_id),
                link.label.clone(),
            )
        })
        .collect();

    let mut metadata = parsed.metadata;
    if metadata.position.is_none() {
        metadata.position = previous.and_then(|node| node.ui_metadata.position);
    }

    Node {
        id: node_id.to_string(),
        outgoing_edges: edges,
        content: parsed.content,
        ui_metadata: metadata,
    }
}

/// Map one filesystem event onto a delta against `graph`.
///
/// * `Delete` emits a single `DeleteNode` carrying the current node for undo.
/// * `Add`/`Change` emit an `UpsertNode` for the file's node, then one per
///   other node whose links now resolve differently (an unresolved name that
///   this node satisfies, a basename match that became ambiguous, or a
///   basename match replaced by an exact id).
///
/// Links retargeted by a removal are settled by the caller, which owns the
/// post-delete graph.
///
/// Events outside the vault, for non-node files, or without content give an
/// empty delta.
pub fn map_fs_event(event: &FsEvent, vault_root: &Path, graph: &Graph) -> GraphDelta {
    let Some(node_id) = node_id_from_path(&event.absolute_path, vault_root) else {
        debug!("Ignoring event for {}", event.absolute_path.display());
        return Vec::new();
    };

    match event.kind {
        FsEventKind::Delete => {
            vec![NodeDelta::delete(node_id.clone(), graph.get(&node_id).cloned())]
        }
        FsEventKind::Add | FsEventKind::Change => {
            let Some(text) = event.content.as_deref() else {
                debug!("No content for {:?} event on {}", event.kind, node_id);
                return Vec::new();
            };

            let previous = graph.get(&node_id);
            let node = node_from_text(&node_id, text, graph, previous);

            let mut delta = vec![NodeDelta::upsert(node, previous.cloned())];
            settle_links(&mut delta, graph, &[&node_id]);
            delta
        }
    }
}
