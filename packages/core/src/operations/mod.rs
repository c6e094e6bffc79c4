//! Graph operations
//!
//! Pure functions from a graph (plus arguments) to a [`GraphDelta`](crate::models::GraphDelta),
//! and the reducer that applies one. Nothing here touches the filesystem.

mod merge;
mod reducer;
mod rename;
mod resolve;

pub use merge::{
    compute_merge_delta, create_representative_node, find_representative_node,
    incoming_edges_to_subgraph, ExternalEdgePolicy, IncomingEdge, MERGE_SECTION_SEPARATOR,
};
pub use reducer::{apply_graph_delta, effective_delta};
pub use rename::{compute_rename_delta, compute_rename_delta_with_mode, RenameMode};
pub use resolve::{resolve_edges, resolve_incoming, resolve_link};
pub(crate) use resolve::settle_links;
