//! VaultGraph Core
//!
//! This crate keeps a directed graph of markdown files (a "vault") in sync with
//! the files themselves, an editor UI, and structural operations on the graph.
//!
//! # Architecture
//!
//! - **Files are the source of truth**: every node is one markdown file, every
//!   edge a `[[wikilink]]` in its text
//! - **Deltas only**: the graph changes exclusively through `GraphDelta`s applied
//!   by a pure reducer, and the same deltas are broadcast to subscribers
//! - **Echo suppression**: writes made by a session are recognised when their
//!   filesystem notification comes back, so nothing is applied twice
//! - **Cycle-safe views**: spanning trees, ASCII trees and context bundles work
//!   on arbitrary cyclic, disconnected graphs
//!
//! # Modules
//!
//! - [`models`] - Node, Edge, Graph and delta types
//! - [`operations`] - Reducer, link resolution, rename and merge
//! - [`traversal`] - Spanning tree and bounded context extraction
//! - [`markdown`] - Node file parsing and serialization
//! - [`sync`] - Event mapping, scanning, watching, persistence and sessions
//! - [`config`] - Vault configuration
//! - [`utils`] - Text helpers and the ASCII tree renderer

pub mod config;
pub mod error;
pub mod markdown;
pub mod models;
pub mod operations;
pub mod sync;
pub mod traversal;
pub mod utils;

// Re-export commonly used types
pub use config::VaultConfig;
pub use error::{Result, VaultError};
pub use models::*;
pub use operations::*;
pub use sync::{
    ChangeOrigin, EchoLedger, FsEvent, FsEventKind, GraphEvent, MarkdownFileWriter,
    NodePersistence, VaultSession, VaultWatcher,
};
pub use traversal::*;
