//! Write-echo ledger
//!
//! Every write this process makes to a node file comes back as a filesystem
//! notification. The ledger remembers what was written, per node, for a short
//! window, so the session can recognise that notification and drop it instead
//! of re-applying (and re-broadcasting) its own change.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::models::NodeId;
use crate::utils::normalize_for_echo;

#[derive(Debug, Clone)]
struct LedgerEntry {
    normalized: String,
    written_at: Instant,
}

/// Recent own writes, keyed by node
///
/// Owned by a session rather than shared globally, so separate vaults never see
/// each other's writes.
#[derive(Debug)]
pub struct EchoLedger {
    ttl: Duration,
    entries: HashMap<NodeId, LedgerEntry>,
}

impl EchoLedger {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Remember that `content` was just written for `node_id`, replacing any
    /// earlier entry for that node.
    pub fn mark_own_write(&mut self, node_id: &str, content: &str) {
        self.mark_own_write_at(node_id, content, Instant::now());
    }

    pub fn mark_own_write_at(&mut self, node_id: &str, content: &str, now: Instant) {
        self.entries.insert(
            node_id.to_string(),
            LedgerEntry {
                normalized: normalize_for_echo(content),
                written_at: now,
            },
        );
    }

    /// Whether a notification carrying `content` for `node_id` is the echo of
    /// an own write still inside the window. A match consumes the entry.
    pub fn is_echo(&mut self, node_id: &str, content: &str) -> bool {
        self.is_echo_at(node_id, content, Instant::now())
    }

    pub fn is_echo_at(&mut self, node_id: &str, content: &str, now: Instant) -> bool {
        self.evict_expired_at(now);

        let Some(entry) = self.entries.get(node_id) else {
            return false;
        };
        if entry.normalized != normalize_for_echo(content) {
            debug!(node_id, "Content differs from own write, treating as external edit");
            return false;
        }

        self.entries.remove(node_id);
        debug!(node_id, "Recognised echo of own write");
        true
    }

    /// Drop entries older than the TTL
    pub fn evict_expired(&mut self) {
        self.evict_expired_at(Instant::now());
    }

    fn evict_expired_at(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.written_at) <= ttl);
    }

    /// Number of writes still waiting for their echo
    pub fn pending(&self) -> usize {
        self.entries.len()
    }
}
