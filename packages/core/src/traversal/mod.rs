//! Derived graph views
//!
//! Acyclic views over an arbitrary, possibly cyclic, possibly disconnected graph.

mod context;
mod spanning_tree;

pub use context::{
    extract_context, node_summary, ContentLevel, ContextBundle, FULL_CONTENT_RADIUS, SUMMARY_RADIUS,
};
pub use spanning_tree::spanning_tree;
