//! Vault synchronisation
//!
//! Everything between the pure graph operations and the files on disk: event
//! mapping, the initial scan, the watcher, persistence, echo suppression and
//! the session that ties them together.

mod echo;
mod events;
mod fs_events;
mod persistence;
mod scan;
mod session;
mod watcher;

pub use echo::EchoLedger;
pub use events::{ChangeOrigin, GraphEvent};
pub use fs_events::{
    is_node_file, map_fs_event, node_from_text, node_id_from_path, node_path, FsEvent, FsEventKind,
};
pub use persistence::{MarkdownFileWriter, NodePersistence};
pub use scan::scan_vault;
pub use session::VaultSession;
pub use watcher::{translate_event, VaultWatcher};
