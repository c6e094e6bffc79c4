//! Node file persistence
//!
//! The session decides what to write; a `NodePersistence` implementation
//! performs the write. Tests substitute in-memory implementations.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, VaultError};

/// Writes and removes node files
#[async_trait]
pub trait NodePersistence: Send + Sync {
    /// Replace the file at `path` with `text`, creating parent directories
    async fn write_node(&self, path: &Path, text: &str) -> Result<()>;

    /// Remove the file at `path`. Removing a missing file succeeds.
    async fn remove_node(&self, path: &Path) -> Result<()>;
}

/// [`NodePersistence`] on the local filesystem
#[derive(Debug, Clone, Default)]
pub struct MarkdownFileWriter;

impl MarkdownFileWriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NodePersistence for MarkdownFileWriter {
    async fn write_node(&self, path: &Path, text: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| VaultError::io(parent, e))?;
        }
        tokio::fs::write(path, text)
            .await
            .map_err(|e| VaultError::io(path, e))?;
        debug!("Wrote {} ({} bytes)", path.display(), text.len());
        Ok(())
    }

    async fn remove_node(&self, path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultError::io(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parents_and_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes/deep/a.md");
        let writer = MarkdownFileWriter::new();

        writer.write_node(&path, "hello").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");

        writer.remove_node(&path).await.unwrap();
        assert!(!path.exists());
        writer.remove_node(&path).await.unwrap();
    }

    #[test]
    fn test_write_into_file_parent_fails_with_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "a file, not a directory").unwrap();
        let path = blocker.join("a.md");

        let err = tokio_test::block_on(MarkdownFileWriter::new().write_node(&path, "x")).unwrap_err();
        assert!(matches!(err, VaultError::Io { .. }));
        assert!(err.to_string().contains("blocker"));
    }
}
