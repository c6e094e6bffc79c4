//! Vault Watch Binary
//!
//! Opens a vault, watches it for changes and logs every graph delta the
//! session applies. Useful for checking link resolution and echo suppression
//! against a real editor or agent writing into the vault.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin vault-watch -- ~/notes
//!
//! # Print each delta as JSON
//! VAULT_WATCH_JSON=1 RUST_LOG=debug cargo run --bin vault-watch -- ~/notes
//! ```
//!
//! # Environment Variables
//!
//! - `VAULTGRAPH_VAULT`: Vault root when no argument is given (default: current directory)
//! - `VAULT_WATCH_JSON`: Print each delta as JSON on stdout
//! - `VAULTGRAPH_ECHO_TTL_MS`: Echo suppression window
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use vaultgraph_core::{
    GraphEvent, MarkdownFileWriter, NodeDelta, VaultConfig, VaultSession, VaultWatcher,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let vault_root: PathBuf = env::args()
        .nth(1)
        .or_else(|| env::var("VAULTGRAPH_VAULT").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let print_json = env::var("VAULT_WATCH_JSON").is_ok();

    let config = VaultConfig::load(&vault_root)?;
    tracing::info!("Vault: {}", config.vault_root.display());
    tracing::info!("Echo window: {} ms", config.echo_ttl_ms);

    let mut session = VaultSession::open(config.clone(), Arc::new(MarkdownFileWriter::new()))?;
    tracing::info!(
        "Loaded {} nodes, {} edges",
        session.graph().len(),
        session.graph().edge_count()
    );

    let mut events = session.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            log_event(&event, print_json);
        }
    });

    let mut watcher = VaultWatcher::start(&config)?;
    tokio::select! {
        result = session.follow(&mut watcher) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted, shutting down"),
    }

    Ok(())
}

fn log_event(event: &GraphEvent, print_json: bool) {
    for op in &event.delta {
        match op {
            NodeDelta::UpsertNode { node, previous_node } => tracing::info!(
                "[{}] {} {} ({} links)",
                event.event_type(),
                if previous_node.is_some() { "updated" } else { "added" },
                node.id,
                node.outgoing_edges.len()
            ),
            NodeDelta::DeleteNode { node_id, .. } => {
                tracing::info!("[{}] deleted {}", event.event_type(), node_id)
            }
        }
    }

    if print_json {
        match serde_json::to_string(event) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!("Failed to serialize event: {}", e),
        }
    }
}
