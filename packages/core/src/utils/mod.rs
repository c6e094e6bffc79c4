//! Utility functions for VaultGraph Core
//!
//! Text helpers shared by the codec and the echo ledger, and the ASCII tree
//! renderer used for debugging and merged-node summaries.

mod ascii_tree;
mod markdown;

pub use ascii_tree::{find_roots, render_ascii_tree, render_ascii_tree_covering};
pub use markdown::{first_heading, first_paragraph, normalize_for_echo, strip_markdown};
