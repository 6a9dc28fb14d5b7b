use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::types::{Edge, EdgeId, Node, NodeId};
use crate::game::error::GameError;

/// Undirected graph owning its nodes and edges.
///
/// # Invariants
///
/// - Nodes and edges keep insertion order; `NodeId(i)` is the i-th node added.
/// - At most one edge per unordered node pair.
/// - `incidence[n]` lists the edges touching node `n` in edge-insertion order,
///   so per-node queries never need to scan the full edge list.
///
/// Handles are plain indices and are not tied to the graph that issued them.
/// Passing a [`NodeId`] from another graph is a caller error: out-of-range
/// handles make [`Graph::add_edge`] panic (use [`Graph::try_add_edge`] to get
/// an error instead), in-range ones silently refer to this graph's node.
///
/// A deserialized graph is only trusted after [`Graph::validate`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Graph<T> {
    nodes: Vec<Node<T>>,
    edges: Vec<Edge>,
    incidence: Vec<SmallVec<[EdgeId; 6]>>,
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            incidence: Vec::new(),
        }
    }
}

impl<T> Graph<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new node. Payloads are never deduplicated.
    pub fn add_node(&mut self, value: T) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { id, value });
        self.incidence.push(SmallVec::new());
        id
    }

    /// Connect two nodes, returning the existing edge if they already are.
    ///
    /// # Panics
    ///
    /// If either handle does not belong to this graph. Passing the same node
    /// twice is a caller error checked in debug builds.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> EdgeId {
        assert!(
            self.contains(a) && self.contains(b),
            "edge endpoints {:?}/{:?} are not nodes of this graph",
            a,
            b
        );
        debug_assert_ne!(a, b, "self-loops are not supported");

        if let Some(existing) = self.get_edge(a, b) {
            return existing.id;
        }

        let id = EdgeId(self.edges.len());
        self.edges.push(Edge { id, a, b });
        self.incidence[a.0].push(id);
        self.incidence[b.0].push(id);
        id
    }

    /// Like [`Graph::add_edge`], but a handle from outside the graph is
    /// `NotFound` instead of a panic.
    pub fn try_add_edge(&mut self, a: NodeId, b: NodeId) -> Result<EdgeId, GameError> {
        for node in [a, b] {
            if !self.contains(node) {
                return Err(GameError::NotFound(format!(
                    "edge endpoint {:?} is not a node of this graph",
                    node
                )));
            }
        }
        if a == b {
            return Err(GameError::InvalidArgument(format!(
                "self-loop on {:?} is not supported",
                a
            )));
        }
        Ok(self.add_edge(a, b))
    }

    /// Check the store invariants, e.g. after loading a saved graph.
    ///
    /// Every handle must match its position, every edge must join two
    /// distinct nodes of this graph with no duplicate pair, and each edge must
    /// appear exactly in the incidence lists of its two endpoints.
    pub fn validate(&self) -> Result<(), GameError> {
        let corrupt = |what: String| -> Result<(), GameError> {
            Err(GameError::InvalidArgument(format!("corrupt graph: {}", what)))
        };

        if self.incidence.len() != self.nodes.len() {
            return corrupt(format!(
                "{} incidence lists for {} nodes",
                self.incidence.len(),
                self.nodes.len()
            ));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.0 != index {
                return corrupt(format!("node {} carries handle {:?}", index, node.id));
            }
        }

        let mut pairs: FxHashSet<Edge> = FxHashSet::default();
        for (index, edge) in self.edges.iter().enumerate() {
            if edge.id.0 != index {
                return corrupt(format!("edge {} carries handle {:?}", index, edge.id));
            }
            if !self.contains(edge.a) || !self.contains(edge.b) || edge.a == edge.b {
                return corrupt(format!("edge {} joins {:?} and {:?}", index, edge.a, edge.b));
            }
            if !pairs.insert(*edge) {
                return corrupt(format!("edge {} duplicates {:?}-{:?}", index, edge.a, edge.b));
            }
            for end in [edge.a, edge.b] {
                if !self.incidence[end.0].contains(&edge.id) {
                    return corrupt(format!("edge {} missing from incidence of {:?}", index, end));
                }
            }
        }

        // Each edge sits in two distinct lists, so any extra entry shows up here.
        let listed: usize = self.incidence.iter().map(|ids| ids.len()).sum();
        if listed != 2 * self.edges.len() {
            return corrupt(format!(
                "{} incidence entries for {} edges",
                listed,
                self.edges.len()
            ));
        }
        Ok(())
    }

    /// Handle of the `index`-th node, e.g. from a kingdom member list.
    pub fn node_id(&self, index: usize) -> Option<NodeId> {
        (index < self.nodes.len()).then_some(NodeId(index))
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node<T>] {
        &self.nodes
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, node: NodeId) -> Option<&Node<T>> {
        self.nodes.get(node.0)
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&Edge> {
        self.edges.get(edge.0)
    }

    pub fn value(&self, node: NodeId) -> Option<&T> {
        self.nodes.get(node.0).map(|n| &n.value)
    }

    /// Mutable access to a payload. Topology cannot be changed through it.
    pub fn value_mut(&mut self, node: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(node.0).map(|n| &mut n.value)
    }

    /// Payloads of all nodes in insertion order.
    pub fn values(&self) -> Vec<&T> {
        self.nodes.iter().map(|n| &n.value).collect()
    }

    /// Edges incident to `node`, in edge-insertion order. Empty for unknown nodes.
    pub fn edges_of(&self, node: NodeId) -> Vec<Edge> {
        self.incident(node).copied().collect()
    }

    pub(crate) fn incident(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.incidence
            .get(node.0)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .map(|id| &self.edges[id.0])
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.incidence.get(node.0).map_or(0, |ids| ids.len())
    }

    /// The edge between `a` and `b`, in either direction.
    pub fn get_edge(&self, a: NodeId, b: NodeId) -> Option<Edge> {
        // Scan the shorter incidence list.
        let (from, to) = if self.degree(a) <= self.degree(b) { (a, b) } else { (b, a) };
        self.incident(from).find(|e| e.connects(from, to)).copied()
    }

    pub fn are_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.get_edge(a, b).is_some()
    }

    /// Opposite endpoint of each incident edge, in edge order.
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.incident(node).filter_map(|e| e.other(node)).collect()
    }
}

impl<T: PartialEq> Graph<T> {
    /// First node (insertion order) whose payload equals `value`.
    pub fn get_node(&self, value: &T) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.value == *value).map(|n| n.id)
    }
}
