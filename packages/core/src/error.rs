//! Vault Error Types
//!
//! Errors from the I/O edges of the engine: reading and writing node files,
//! loading configuration and running the filesystem watcher. Graph operations
//! themselves never fail; inconsistent input produces an empty delta instead.

use std::path::PathBuf;
use thiserror::Error;

/// Vault operation errors
#[derive(Error, Debug)]
pub enum VaultError {
    /// Reading, writing or removing a file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The filesystem watcher could not be started or failed
    #[error("Watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// A structural operation named a node that is not in the graph
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },
}

impl VaultError {
    /// Create an I/O error for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }
}

/// Result type for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;
