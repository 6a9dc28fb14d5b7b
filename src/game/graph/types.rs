use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Handle of a node inside the [`Graph`](super::Graph) that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in insertion order.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle of an edge inside the graph that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A payload registered in a graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node<T> {
    pub(crate) id: NodeId,
    pub(crate) value: T,
}

impl<T> Node<T> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

/// Undirected connection between two nodes.
///
/// Equality ignores endpoint order: `(a, b) == (b, a)`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub(crate) a: NodeId,
    pub(crate) b: NodeId,
}

impl Edge {
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// Both endpoints in the order they were passed to `add_edge`.
    pub fn nodes(&self) -> (NodeId, NodeId) {
        (self.a, self.b)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }

    /// The endpoint opposite to `node`, `None` if `node` is not an endpoint.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.a == node {
            Some(self.b)
        } else if self.b == node {
            Some(self.a)
        } else {
            None
        }
    }

    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    fn ordered(&self) -> (NodeId, NodeId) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.connects(other.a, other.b)
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
    }
}
