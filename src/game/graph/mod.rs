//! Generic undirected graph over arbitrary payloads.
//!
//! Nodes are identified by handle ([`NodeId`]), never by payload equality, so
//! two settlements with identical data stay two distinct nodes. Edges are
//! unique per unordered node pair.
//!
//! # Example
//! ```
//! use fiefdom::game::graph::Graph;
//!
//! let mut graph = Graph::new();
//! let a = graph.add_node("north");
//! let b = graph.add_node("south");
//! let edge = graph.add_edge(a, b);
//! assert_eq!(graph.add_edge(b, a), edge);
//! assert_eq!(graph.all_nodes_connected().unwrap(), true);
//! ```

mod types;
mod store;
mod connectivity;

#[cfg(test)]
mod tests;

pub use types::{Edge, EdgeId, Node, NodeId};
pub use store::Graph;
