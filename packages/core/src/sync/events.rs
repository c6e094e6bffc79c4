//! Graph Events
//!
//! Events broadcast by a `VaultSession` whenever its graph changes. Editors and
//! other views subscribe to reconcile their state with the graph without being
//! coupled to the session's internals.
//!
//! # Event Flow
//!
//! 1. A filesystem notification, an editor save or a structural operation
//!    produces a `GraphDelta`
//! 2. The session applies it to its graph
//! 3. A `GraphEvent` carrying the delta is sent on the broadcast channel
//! 4. Every subscriber receives it asynchronously
//!
//! Echoes of the session's own writes never produce an event.

use serde::{Deserialize, Serialize};

use crate::models::GraphDelta;

/// Who caused a graph change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeOrigin {
    /// A file changed on disk (external editor, agent, sync tool)
    Filesystem,
    /// A node was saved from an editor through the session
    Editor,
    /// Rename, merge or delete
    Structural,
}

/// A change applied to a session's graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEvent {
    pub delta: GraphDelta,
    pub origin: ChangeOrigin,
}

impl GraphEvent {
    pub fn new(delta: GraphDelta, origin: ChangeOrigin) -> Self {
        Self { delta, origin }
    }

    /// Short event name for logging
    pub fn event_type(&self) -> &'static str {
        match self.origin {
            ChangeOrigin::Filesystem => "graph:filesystem",
            ChangeOrigin::Editor => "graph:editor",
            ChangeOrigin::Structural => "graph:structural",
        }
    }
}
