//! Initial vault scan

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

use super::fs_events::{is_node_file, map_fs_event, FsEvent, FsEventKind};
use crate::error::{Result, VaultError};
use crate::models::Graph;
use crate::operations::apply_graph_delta;

/// Build the graph of the vault at `vault_root`.
///
/// Every node file is fed through the event mapper as an `Add`, so links
/// resolve exactly as they would for files arriving one by one. Hidden files
/// and directories (`.git`, `.obsidian`, ...) are skipped, unreadable files are
/// logged and skipped.
pub fn scan_vault(vault_root: &Path) -> Result<Graph> {
    if !vault_root.is_dir() {
        return Err(VaultError::io(
            vault_root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "vault root is not a directory"),
        ));
    }

    let mut graph = Graph::new();
    for path in collect_node_files(vault_root) {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping unreadable file {}: {}", path.display(), e);
                continue;
            }
        };
        let event = FsEvent::new(FsEventKind::Add, &path).with_content(text);
        let delta = map_fs_event(&event, vault_root, &graph);
        graph = apply_graph_delta(&graph, &delta);
    }

    info!(
        "Scanned vault {}: {} nodes, {} edges",
        vault_root.display(),
        graph.len(),
        graph.edge_count()
    );
    Ok(graph)
}

fn collect_node_files(vault_root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(vault_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_node_file(entry.path()) => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable vault entry: {}", e),
        }
    }
    files
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EdgeTarget;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    #[test]
    fn test_scan_builds_resolved_graph() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.md", "- child [[notes/b]]\n- see [[c]]");
        write(dir.path(), "notes/b.md", "---\ntitle: Bee\n---\nback to [[a]]");
        write(dir.path(), "deep/nested/c.md", "C");
        write(dir.path(), "readme.txt", "not a node");
        write(dir.path(), ".obsidian/workspace.md", "hidden");

        let graph = scan_vault(dir.path()).unwrap();

        assert_eq!(
            graph.node_ids().cloned().collect::<Vec<_>>(),
            vec!["a", "deep/nested/c", "notes/b"]
        );
        let a = graph.get("a").unwrap();
        assert_eq!(a.outgoing_edges[0].target, EdgeTarget::Resolved("notes/b".into()));
        assert_eq!(a.outgoing_edges[1].target, EdgeTarget::Resolved("deep/nested/c".into()));
        assert_eq!(graph.get("notes/b").unwrap().display_title(), "Bee");
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let err = scan_vault(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, VaultError::Io { .. }));
    }
}
