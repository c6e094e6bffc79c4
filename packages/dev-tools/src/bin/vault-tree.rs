//! Vault Tree Binary
//!
//! Scans a vault and prints its graph as an ASCII tree, or the bounded context
//! an agent would receive for one node.
//!
//! # Usage
//!
//! ```bash
//! # Whole vault, every root node from column zero
//! cargo run --bin vault-tree -- ~/notes
//!
//! # Tree forced to start at one node
//! cargo run --bin vault-tree -- ~/notes projects/roadmap
//!
//! # Context bundle for one node
//! VAULT_TREE_CONTEXT=1 cargo run --bin vault-tree -- ~/notes projects/roadmap
//! ```
//!
//! # Environment Variables
//!
//! - `VAULTGRAPH_VAULT`: Vault root when no argument is given (default: current directory)
//! - `VAULT_TREE_CONTEXT`: Print the context bundle instead of the tree
//! - `VAULTGRAPH_CONTEXT_DISTANCE`: Hop limit for the context bundle
//! - `VAULTGRAPH_CONTEXT_LEVEL`: Text per node in the bundle (`titles`, `summaries`, `full`)
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::env;
use std::path::PathBuf;

use vaultgraph_core::sync::scan_vault;
use vaultgraph_core::utils::render_ascii_tree;
use vaultgraph_core::{extract_context, VaultConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let vault_root: PathBuf = args
        .next()
        .or_else(|| env::var("VAULTGRAPH_VAULT").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let root_node = args.next();

    let config = VaultConfig::load(&vault_root)?;
    let graph = scan_vault(&config.vault_root)?;

    match root_node {
        Some(node_id) if env::var("VAULT_TREE_CONTEXT").is_ok() => {
            if !graph.contains(&node_id) {
                anyhow::bail!("Node not found: {}", node_id);
            }
            let bundle = extract_context(
                &graph,
                &node_id,
                config.context_max_distance,
                config.context_content_level,
            );
            println!("{}\n", bundle.tree);
            println!("{}", bundle.body);
        }
        Some(node_id) => {
            if !graph.contains(&node_id) {
                anyhow::bail!("Node not found: {}", node_id);
            }
            println!("{}", render_ascii_tree(&graph, Some(&node_id)));
        }
        None => {
            let tree = render_ascii_tree(&graph, None);
            if tree.is_empty() && !graph.is_empty() {
                tracing::warn!("Every node is part of a cycle; pass a node id to force a root");
            }
            println!("{tree}");
        }
    }

    Ok(())
}
