//! Vault session
//!
//! Owns the graph of one vault and serialises every change to it. Three
//! sources of change feed the session:
//!
//! 1. Filesystem notifications (`handle_fs_event`)
//! 2. Editor saves (`save_node_content`)
//! 3. Structural operations (`rename_node`, `merge_nodes`, `delete_node`)
//!
//! Each change is turned into a `GraphDelta`, applied, and broadcast as a
//! `GraphEvent`. Writes made by the session are recorded in its `EchoLedger`
//! so the notifications they cause are dropped instead of applied twice.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::echo::EchoLedger;
use super::events::{ChangeOrigin, GraphEvent};
use super::fs_events::{map_fs_event, node_id_from_path, node_path, FsEvent, FsEventKind};
use super::persistence::NodePersistence;
use super::scan::scan_vault;
use super::watcher::VaultWatcher;
use crate::config::VaultConfig;
use crate::error::{Result, VaultError};
use crate::markdown::to_markdown;
use crate::models::{Graph, GraphDelta, Node, NodeDelta, NodeId};
use crate::operations::{
    apply_graph_delta, compute_merge_delta, compute_rename_delta_with_mode, effective_delta,
    settle_links, ExternalEdgePolicy, RenameMode,
};
use crate::traversal::{extract_context, ContentLevel, ContextBundle};

/// The live graph of one vault
pub struct VaultSession {
    config: VaultConfig,
    graph: Graph,
    ledger: EchoLedger,
    writer: Arc<dyn NodePersistence>,
    events: broadcast::Sender<GraphEvent>,
}

impl VaultSession {
    /// Scan the vault at `config.vault_root` and start a session on it
    pub fn open(config: VaultConfig, writer: Arc<dyn NodePersistence>) -> Result<Self> {
        config.validate().map_err(VaultError::Config)?;
        let graph = scan_vault(&config.vault_root)?;
        Ok(Self::with_graph(config, graph, writer))
    }

    /// Start a session on an already built graph
    pub fn with_graph(config: VaultConfig, graph: Graph, writer: Arc<dyn NodePersistence>) -> Self {
        let (events, _) = broadcast::channel(config.event_channel_capacity.max(1));
        let ledger = EchoLedger::new(config.echo_ttl());
        Self {
            config,
            graph,
            ledger,
            writer,
            events,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Receive every delta applied from now on
    pub fn subscribe(&self) -> broadcast::Receiver<GraphEvent> {
        self.events.subscribe()
    }

    /// Own writes still inside the echo window whose notification has not
    /// arrived yet
    pub fn pending_echoes(&mut self) -> usize {
        self.ledger.evict_expired();
        self.ledger.pending()
    }

    /// Apply a filesystem notification.
    ///
    /// Returns the applied delta, or `None` when the event was an echo of an
    /// own write, concerned no node, or changed nothing.
    pub async fn handle_fs_event(&mut self, event: FsEvent) -> Result<Option<GraphDelta>> {
        let Some(node_id) = node_id_from_path(&event.absolute_path, &self.config.vault_root) else {
            return Ok(None);
        };

        let event = match event.kind {
            FsEventKind::Delete => event,
            FsEventKind::Add | FsEventKind::Change => {
                let text = match event.content.clone() {
                    Some(text) => text,
                    None => match tokio::fs::read_to_string(&event.absolute_path).await {
                        Ok(text) => text,
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                            debug!(node_id = %node_id, "File vanished before it could be read");
                            return Ok(None);
                        }
                        Err(e) => return Err(VaultError::io(&event.absolute_path, e)),
                    },
                };
                if self.ledger.is_echo(&node_id, &text) {
                    debug!(node_id = %node_id, "Dropping echo of own write");
                    return Ok(None);
                }
                FsEvent {
                    content: Some(text),
                    ..event
                }
            }
        };

        let mut delta = map_fs_event(&event, &self.config.vault_root, &self.graph);
        if event.kind == FsEventKind::Delete && self.graph.contains(&node_id) {
            settle_links(&mut delta, &self.graph, &[&node_id]);
        }
        let delta = effective_delta(&self.graph, &delta);
        Ok(self.commit(delta, ChangeOrigin::Filesystem))
    }

    /// Save `content` typed in an editor for `node_id`.
    ///
    /// The node is rebuilt from its serialized text, so edges always come from
    /// the content and never from the previous edge list. Creates the node if
    /// it does not exist yet.
    pub async fn save_node_content(&mut self, node_id: &str, content: &str) -> Result<GraphDelta> {
        let mut draft = self
            .graph
            .get(node_id)
            .cloned()
            .unwrap_or_else(|| Node::new(node_id, ""));
        draft.content = content.to_string();
        draft.outgoing_edges.clear();

        let text = to_markdown(&draft);
        let path = node_path(&self.config.vault_root, node_id);
        let event = FsEvent::new(FsEventKind::Change, &path).with_content(text.clone());
        let delta = effective_delta(
            &self.graph,
            &map_fs_event(&event, &self.config.vault_root, &self.graph),
        );

        self.writer.write_node(&path, &text).await?;
        self.ledger.mark_own_write(node_id, &text);

        Ok(self.commit(delta, ChangeOrigin::Editor).unwrap_or_default())
    }

    /// Rename `old_id` to `new_id`, rewriting every reference to it.
    ///
    /// A missing `old_id` or an existing `new_id` changes nothing.
    pub async fn rename_node(&mut self, old_id: &str, new_id: &str) -> Result<GraphDelta> {
        let delta = compute_rename_delta_with_mode(old_id, new_id, &self.graph, RenameMode::DeleteOld);
        self.apply_structural(delta).await
    }

    /// Merge `selection` into a new node `new_id`.
    ///
    /// `policy` defaults to `merge_edge_policy` from the session config.
    pub async fn merge_nodes(
        &mut self,
        selection: &[NodeId],
        new_id: &str,
        policy: Option<ExternalEdgePolicy>,
    ) -> Result<GraphDelta> {
        let policy = policy.unwrap_or(self.config.merge_edge_policy);
        let delta = compute_merge_delta(selection, new_id, &self.graph, policy);
        self.apply_structural(delta).await
    }

    /// Delete `node_id` and its file.
    ///
    /// Links to it are left dangling in their files. Their edges are resolved
    /// again, so a basename link can fall back to the one remaining node with
    /// that basename.
    pub async fn delete_node(&mut self, node_id: &str) -> Result<GraphDelta> {
        let Some(node) = self.graph.get(node_id) else {
            return Ok(Vec::new());
        };
        let mut delta = vec![NodeDelta::delete(node_id, Some(node.clone()))];
        settle_links(&mut delta, &self.graph, &[node_id]);
        self.apply_structural(delta).await
    }

    /// Bounded context around `node_id`, using the configured hop limit.
    ///
    /// `level` defaults to `context_content_level` from the session config.
    pub fn context(&self, node_id: &str, level: Option<ContentLevel>) -> Result<ContextBundle> {
        if !self.graph.contains(node_id) {
            return Err(VaultError::node_not_found(node_id));
        }
        Ok(extract_context(
            &self.graph,
            node_id,
            self.config.context_max_distance,
            level.unwrap_or(self.config.context_content_level),
        ))
    }

    /// Handle watcher events until the watcher stops.
    ///
    /// Errors on single events are logged and do not stop the loop. A watcher
    /// on a different root is refused, since none of its paths map to nodes.
    pub async fn follow(&mut self, watcher: &mut VaultWatcher) -> Result<()> {
        if watcher.root() != self.config.vault_root {
            return Err(VaultError::Config(format!(
                "watcher root {} is not the vault root {}",
                watcher.root().display(),
                self.config.vault_root.display()
            )));
        }

        while let Some(event) = watcher.next_event().await {
            let path = event.absolute_path.clone();
            match self.handle_fs_event(event).await {
                Ok(Some(delta)) => debug!("Applied {} operations from {}", delta.len(), path.display()),
                Ok(None) => {}
                Err(e) => warn!("Failed to handle change to {}: {}", path.display(), e),
            }
        }
        info!("Stopped watching {}", watcher.root().display());
        Ok(())
    }

    /// Apply a structural delta, then persist the final state of every node it
    /// touched. Nodes whose file text would not change are not rewritten. The
    /// graph is updated even if a write fails; the first failure is returned
    /// after all writes were attempted.
    async fn apply_structural(&mut self, delta: GraphDelta) -> Result<GraphDelta> {
        if delta.is_empty() {
            return Ok(delta);
        }

        let mut touched: Vec<NodeId> = Vec::new();
        let mut seen = HashSet::new();
        for op in &delta {
            if seen.insert(op.node_id().to_string()) {
                touched.push(op.node_id().to_string());
            }
        }

        let before = self.graph.clone();
        self.commit(delta.clone(), ChangeOrigin::Structural);

        let mut first_error = None;
        for node_id in touched {
            if let (Some(old), Some(new)) = (before.get(&node_id), self.graph.get(&node_id)) {
                if to_markdown(old) == to_markdown(new) {
                    debug!(node_id = %node_id, "File text unchanged, not rewriting");
                    continue;
                }
            }
            if let Err(e) = self.persist_node(&node_id).await {
                warn!("Failed to persist {}: {}", node_id, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(delta),
        }
    }

    async fn persist_node(&mut self, node_id: &str) -> Result<()> {
        let path: PathBuf = node_path(&self.config.vault_root, node_id);
        match self.graph.get(node_id) {
            Some(node) => {
                let text = to_markdown(node);
                self.writer.write_node(&path, &text).await?;
                self.ledger.mark_own_write(node_id, &text);
            }
            None => self.writer.remove_node(&path).await?,
        }
        Ok(())
    }

    fn commit(&mut self, delta: GraphDelta, origin: ChangeOrigin) -> Option<GraphDelta> {
        if delta.is_empty() {
            return None;
        }

        self.graph = apply_graph_delta(&self.graph, &delta);
        let event = GraphEvent::new(delta.clone(), origin);
        debug!(
            event_type = event.event_type(),
            operations = delta.len(),
            nodes = self.graph.len(),
            "Graph updated"
        );
        // No subscribers is fine
        let _ = self.events.send(event);
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edge, EdgeTarget};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryWriter {
        files: Mutex<HashMap<PathBuf, String>>,
    }

    impl MemoryWriter {
        fn read(&self, path: &Path) -> Option<String> {
            self.files.lock().unwrap().get(path).cloned()
        }
    }

    #[async_trait]
    impl NodePersistence for MemoryWriter {
        async fn write_node(&self, path: &Path, text: &str) -> Result<()> {
            self.files.lock().unwrap().insert(path.to_path_buf(), text.to_string());
            Ok(())
        }

        async fn remove_node(&self, path: &Path) -> Result<()> {
            self.files.lock().unwrap().remove(path);
            Ok(())
        }
    }

    fn session(nodes: Vec<Node>) -> (VaultSession, Arc<MemoryWriter>) {
        let writer = Arc::new(MemoryWriter::default());
        let config = VaultConfig::new("/vault");
        let session = VaultSession::with_graph(config, Graph::from_nodes(nodes), writer.clone());
        (session, writer)
    }

    #[tokio::test]
    async fn test_save_then_echo_is_dropped() {
        let (mut session, writer) = session(vec![
            Node::new("a", "see [target]*").with_edges(vec![Edge::resolved("target", "")]),
            Node::new("target", "T"),
        ]);
        let mut events = session.subscribe();

        let delta = session.save_node_content("a", "edited, see [target]*").await.unwrap();
        assert_eq!(delta.len(), 1);
        assert_eq!(events.recv().await.unwrap().origin, ChangeOrigin::Editor);

        let path = PathBuf::from("/vault/a.md");
        let text = writer.read(&path).unwrap();
        assert_eq!(text, "edited, see [[target]]");

        let echo = FsEvent::new(FsEventKind::Change, &path).with_content(text);
        assert_eq!(session.handle_fs_event(echo).await.unwrap(), None);
        assert!(events.try_recv().is_err(), "echo not broadcast");
        assert_eq!(session.graph().get("a").unwrap().outgoing_edges.len(), 1);
    }

    #[tokio::test]
    async fn test_external_edit_is_applied_and_broadcast() {
        let (mut session, _) = session(vec![Node::new("a", "old")]);
        let mut events = session.subscribe();

        let event = FsEvent::new(FsEventKind::Change, "/vault/a.md").with_content("new [[b]]");
        let delta = session.handle_fs_event(event).await.unwrap().unwrap();

        assert_eq!(delta.len(), 1);
        assert_eq!(session.graph().get("a").unwrap().content, "new [b]*");
        assert_eq!(events.recv().await.unwrap().origin, ChangeOrigin::Filesystem);
    }

    #[tokio::test]
    async fn test_unchanged_notification_is_not_rebroadcast() {
        let (mut session, _) = session(vec![Node::new("a", "same")]);
        let event = FsEvent::new(FsEventKind::Change, "/vault/a.md").with_content("same");
        assert_eq!(session.handle_fs_event(event).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rename_persists_and_removes_old_file() {
        let (mut session, writer) = session(vec![
            Node::new("old", "O"),
            Node::new("a", "- to [old]*").with_edges(vec![Edge::resolved("old", "to")]),
        ]);

        let delta = session.rename_node("old", "new").await.unwrap();
        assert_eq!(delta.len(), 3);

        assert!(!session.graph().contains("old"));
        assert_eq!(writer.read(Path::new("/vault/new.md")).as_deref(), Some("O"));
        assert_eq!(writer.read(Path::new("/vault/a.md")).as_deref(), Some("- to [[new]]"));
        assert_eq!(writer.read(Path::new("/vault/old.md")), None);
        assert_eq!(session.pending_echoes(), 2);
    }

    #[tokio::test]
    async fn test_merge_uses_configured_edge_policy_by_default() {
        let nodes = vec![
            Node::new("a", "A [b]* [ext]*")
                .with_edges(vec![Edge::resolved("b", ""), Edge::resolved("ext", "")]),
            Node::new("b", "B"),
            Node::new("ext", "E"),
        ];
        let writer = Arc::new(MemoryWriter::default());
        let mut config = VaultConfig::new("/vault");
        config.merge_edge_policy = ExternalEdgePolicy::Drop;
        let mut session = VaultSession::with_graph(config, Graph::from_nodes(nodes), writer);

        let selection = vec!["a".to_string(), "b".to_string()];
        session.merge_nodes(&selection, "ab", None).await.unwrap();
        assert!(session.graph().get("ab").unwrap().outgoing_edges.is_empty());
    }

    #[tokio::test]
    async fn test_merge_policy_argument_overrides_config() {
        let nodes = vec![
            Node::new("a", "A [ext]*").with_edges(vec![Edge::resolved("ext", "")]),
            Node::new("ext", "E"),
        ];
        let writer = Arc::new(MemoryWriter::default());
        let mut config = VaultConfig::new("/vault");
        config.merge_edge_policy = ExternalEdgePolicy::Drop;
        let mut session = VaultSession::with_graph(config, Graph::from_nodes(nodes), writer);

        let selection = vec!["a".to_string()];
        session
            .merge_nodes(&selection, "m", Some(ExternalEdgePolicy::Preserve))
            .await
            .unwrap();
        assert!(session.graph().get("m").unwrap().links_to("ext"));
    }

    fn ambiguous_vault() -> Vec<Node> {
        vec![
            Node::new("a", "[b]*").with_edges(vec![Edge::unresolved("b", "")]),
            Node::new("x/b", "X"),
            Node::new("y/b", "Y"),
        ]
    }

    #[tokio::test]
    async fn test_delete_lets_basename_link_resolve_to_remaining_node() {
        let (mut session, writer) = session(ambiguous_vault());

        let delta = session.delete_node("y/b").await.unwrap();
        let ids: Vec<&str> = delta.iter().map(NodeDelta::node_id).collect();
        assert_eq!(ids, vec!["y/b", "a"]);
        assert_eq!(
            session.graph().get("a").unwrap().outgoing_edges[0].target,
            EdgeTarget::Resolved("x/b".into())
        );
        assert_eq!(writer.read(Path::new("/vault/a.md")), None, "a.md text is unchanged");
    }

    #[tokio::test]
    async fn test_external_delete_resolves_links_again() {
        let (mut session, _) = session(ambiguous_vault());

        let event = FsEvent::new(FsEventKind::Delete, "/vault/y/b.md");
        let delta = session.handle_fs_event(event).await.unwrap().unwrap();

        assert!(delta[0].is_delete());
        assert!(session.graph().get("a").unwrap().links_to("x/b"));
    }

    #[tokio::test]
    async fn test_context_level_defaults_to_config() {
        let nodes = vec![
            Node::new("a", "# A\n\nShort.\n\nLong details.").with_edges(vec![Edge::resolved("b", "")]),
            Node::new("b", "# B\n\nAbout b."),
        ];
        let writer = Arc::new(MemoryWriter::default());
        let mut config = VaultConfig::new("/vault");
        config.context_content_level = ContentLevel::TitlesAndSummaries;
        let session = VaultSession::with_graph(config, Graph::from_nodes(nodes), writer);

        let bundle = session.context("a", None).unwrap();
        assert_eq!(bundle.body, "## A\n\nShort.\n\n## B\n\nAbout b.");

        let full = session.context("a", Some(ContentLevel::FullContent)).unwrap();
        assert!(full.body.contains("Long details."));
    }

    #[tokio::test]
    async fn test_follow_refuses_watcher_on_other_root() {
        let (mut session, _) = session(vec![]);
        let elsewhere = tempfile::TempDir::new().unwrap();
        let mut watcher = VaultWatcher::start(&VaultConfig::new(elsewhere.path())).unwrap();

        let err = session.follow(&mut watcher).await.unwrap_err();
        assert!(matches!(err, VaultError::Config(_)));
    }

    #[tokio::test]
    async fn test_delete_and_missing_nodes() {
        let (mut session, _) = session(vec![Node::new("a", "A")]);

        assert!(session.delete_node("zzz").await.unwrap().is_empty());
        assert_eq!(session.delete_node("a").await.unwrap().len(), 1);
        assert!(session.graph().is_empty());

        let err = session.context("a", None).unwrap_err();
        assert!(matches!(err, VaultError::NodeNotFound { .. }));
    }
}
