//! Filesystem watcher adapter
//!
//! Wraps a `notify` watcher on the vault root and forwards node-file changes
//! as [`FsEvent`]s over a tokio channel. Events carry no content; the session
//! reads the file when it handles the event.

use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::fs_events::{is_node_file, FsEvent, FsEventKind};
use crate::config::VaultConfig;
use crate::error::Result;

/// Recursive watcher on a vault root
pub struct VaultWatcher {
    root: PathBuf,
    // Dropping the watcher stops notifications
    _watcher: RecommendedWatcher,
    events: mpsc::UnboundedReceiver<FsEvent>,
}

impl VaultWatcher {
    /// Start watching `config.vault_root` recursively
    pub fn start(config: &VaultConfig) -> Result<Self> {
        let (tx, events) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for fs_event in translate_event(&event) {
                        if tx.send(fs_event).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => warn!("Vault watcher error: {:?}", e),
            },
            Config::default(),
        )?;
        watcher.watch(&config.vault_root, RecursiveMode::Recursive)?;

        info!("Watching vault {}", config.vault_root.display());
        Ok(Self {
            root: config.vault_root.clone(),
            _watcher: watcher,
            events,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Next node-file event, or `None` once the watcher has shut down
    pub async fn next_event(&mut self) -> Option<FsEvent> {
        self.events.recv().await
    }
}

/// Map a raw `notify` event onto node-file events.
///
/// Renames become a delete of the old path and an add of the new one. Paths
/// that are not node files are dropped.
pub fn translate_event(event: &Event) -> Vec<FsEvent> {
    let paths = &event.paths;
    let translated: Vec<FsEvent> = match &event.kind {
        EventKind::Create(_) => with_kind(paths, FsEventKind::Add),
        EventKind::Remove(_) => with_kind(paths, FsEventKind::Delete),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            with_kind(paths, FsEventKind::Delete)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => with_kind(paths, FsEventKind::Add),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() == 2 => vec![
            FsEvent::new(FsEventKind::Delete, &paths[0]),
            FsEvent::new(FsEventKind::Add, &paths[1]),
        ],
        // Platform did not say which side of the rename this path is
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .iter()
            .map(|path| {
                let kind = if path.exists() {
                    FsEventKind::Add
                } else {
                    FsEventKind::Delete
                };
                FsEvent::new(kind, path)
            })
            .collect(),
        EventKind::Modify(_) => with_kind(paths, FsEventKind::Change),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    };

    translated
        .into_iter()
        .filter(|event| is_node_file(&event.absolute_path))
        .collect()
}

fn with_kind(paths: &[PathBuf], kind: FsEventKind) -> Vec<FsEvent> {
    paths.iter().map(|path| FsEvent::new(kind, path)).collect()
}
