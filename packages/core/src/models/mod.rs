//! Data Models
//!
//! This module contains the core data structures of the vault graph:
//!
//! - `Node` / `Edge` - one vault file and the links found in it
//! - `Graph` - id-keyed collection of shared nodes
//! - `NodeDelta` / `GraphDelta` - the ordered operations that change a graph

mod delta;
mod graph;
mod node;

pub use delta::{GraphDelta, NodeDelta};
pub use graph::{EdgeRef, Graph};
pub use node::{basename, Edge, EdgeTarget, Node, NodeId, NodeUiMetadata, Position};
